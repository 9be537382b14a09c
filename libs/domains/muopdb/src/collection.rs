//! Collection tuning parameters sent with CreateCollection
//!
//! Every field except the name is optional; unset fields leave the server's
//! default in place. Call [`CollectionConfig::validated`] to check the whole
//! struct at once. The error lists every offending field, keyed by name.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::MuopDbResult;

/// Rejects NaN and the infinities
fn validate_finite(value: f32) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new("not_finite"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizerType {
    #[default]
    NoQuantizer,
    ProductQuantizer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingListEncoding {
    #[default]
    PlainEncoding,
    EliasFano,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CollectionConfig {
    #[validate(length(min = 1, message = "collection name cannot be empty"))]
    pub collection_name: String,

    #[validate(range(min = 1))]
    pub num_features: Option<u32>,

    // Centroid index
    #[validate(range(min = 1))]
    pub centroids_max_neighbors: Option<u32>,
    #[validate(range(min = 1))]
    pub centroids_max_layers: Option<u32>,
    #[validate(range(min = 1))]
    pub centroids_ef_construction: Option<u32>,
    pub centroids_builder_vector_storage_memory_size: Option<u64>,
    pub centroids_builder_vector_storage_file_size: Option<u64>,

    // Quantization
    pub quantization_type: Option<QuantizerType>,
    #[validate(range(min = 1))]
    pub product_quantization_max_iteration: Option<u32>,
    #[validate(range(min = 1))]
    pub product_quantization_batch_size: Option<u32>,
    #[validate(range(min = 1))]
    pub product_quantization_subvector_dimension: Option<u32>,
    #[validate(range(min = 1))]
    pub product_quantization_num_bits: Option<u32>,
    #[validate(range(min = 1))]
    pub product_quantization_num_training_rows: Option<u32>,

    // Clustering
    #[validate(range(min = 1))]
    pub initial_num_centroids: Option<u32>,
    #[validate(range(min = 1))]
    pub num_data_points_for_clustering: Option<u32>,
    #[validate(range(min = 1))]
    pub max_clusters_per_vector: Option<u32>,
    #[validate(range(min = 0.0, max = 100.0), custom(function = "validate_finite"))]
    pub clustering_distance_threshold_pct: Option<f32>,

    // Posting lists
    pub posting_list_encoding_type: Option<PostingListEncoding>,
    pub posting_list_builder_vector_storage_memory_size: Option<u64>,
    pub posting_list_builder_vector_storage_file_size: Option<u64>,
    pub max_posting_list_size: Option<u64>,
    pub posting_list_kmeans_unbalanced_penalty: Option<f32>,

    // Write path
    pub reindex: Option<bool>,
    pub wal_file_size: Option<u64>,
    pub max_pending_ops: Option<u64>,
    pub max_time_to_flush_ms: Option<u64>,
}

impl CollectionConfig {
    /// A config that only names the collection
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            ..Default::default()
        }
    }

    /// Check every field and return the config, or all violations together
    pub fn validated(self) -> MuopDbResult<Self> {
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MuopDbError;

    #[test]
    fn test_minimal_config_is_valid() {
        let config = CollectionConfig::new("docs").validated().unwrap();
        assert_eq!(config.collection_name, "docs");
        assert!(config.num_features.is_none());
    }

    #[test]
    fn test_fully_populated_config_is_valid() {
        let config = CollectionConfig {
            num_features: Some(768),
            centroids_max_neighbors: Some(10),
            centroids_max_layers: Some(4),
            centroids_ef_construction: Some(100),
            quantization_type: Some(QuantizerType::ProductQuantizer),
            product_quantization_num_bits: Some(8),
            clustering_distance_threshold_pct: Some(100.0),
            posting_list_encoding_type: Some(PostingListEncoding::EliasFano),
            reindex: Some(true),
            max_time_to_flush_ms: Some(0),
            ..CollectionConfig::new("docs")
        };
        assert!(config.validated().is_ok());
    }

    #[test]
    fn test_all_violations_reported_together() {
        let config = CollectionConfig {
            num_features: Some(0),
            centroids_max_layers: Some(0),
            clustering_distance_threshold_pct: Some(150.0),
            ..CollectionConfig::new("")
        };

        let err = config.validated().unwrap_err();
        let MuopDbError::InvalidCollectionConfig(errors) = &err else {
            panic!("expected InvalidCollectionConfig, got {err:?}");
        };
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 4);
        assert!(fields.contains_key("collection_name"));
        assert!(fields.contains_key("num_features"));
        assert!(fields.contains_key("centroids_max_layers"));
        assert!(fields.contains_key("clustering_distance_threshold_pct"));
    }

    #[test]
    fn test_negative_percentage_rejected() {
        let config = CollectionConfig {
            clustering_distance_threshold_pct: Some(-0.5),
            ..CollectionConfig::new("docs")
        };
        assert!(matches!(
            config.validated(),
            Err(MuopDbError::InvalidCollectionConfig(_))
        ));
    }

    #[test]
    fn test_nan_percentage_rejected() {
        let config = CollectionConfig {
            clustering_distance_threshold_pct: Some(f32::NAN),
            ..CollectionConfig::new("docs")
        };
        let err = config.validated().unwrap_err();
        let MuopDbError::InvalidCollectionConfig(errors) = &err else {
            panic!("expected InvalidCollectionConfig, got {err:?}");
        };
        let fields = errors.field_errors();
        assert_eq!(fields["clustering_distance_threshold_pct"][0].code, "not_finite");
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "collection_name": "sentences",
            "num_features": 768,
            "quantization_type": "product_quantizer",
            "posting_list_encoding_type": "elias_fano",
            "clustering_distance_threshold_pct": 12.5
        }"#;
        let config: CollectionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.collection_name, "sentences");
        assert_eq!(config.num_features, Some(768));
        assert_eq!(config.quantization_type, Some(QuantizerType::ProductQuantizer));
        assert_eq!(
            config.posting_list_encoding_type,
            Some(PostingListEncoding::EliasFano)
        );
        assert!(config.validated().is_ok());
    }
}
