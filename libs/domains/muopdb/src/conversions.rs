use crate::collection::{CollectionConfig, PostingListEncoding, QuantizerType};
use crate::error::{MuopDbError, MuopDbResult};
use crate::ids::{
    DEFAULT_USER_ID, Id, exact_ids, merge_ids, pack_ids, pack_vectors, pad_ids, split_ids,
};
use crate::models::{FlushResponse, InsertRequest, SearchRequest, SearchResponse};

// Import generated proto types
use rpc::muopdb::{
    CreateCollectionRequest as ProtoCreateCollectionRequest, FlushResponse as ProtoFlushResponse,
    InsertPackedRequest as ProtoInsertPackedRequest, InsertRequest as ProtoInsertRequest,
    IntSeqEncodingType as ProtoEncoding, QuantizerType as ProtoQuantizerType,
    SearchRequest as ProtoSearchRequest, SearchResponse as ProtoSearchResponse,
};

// ===== Collection Config =====

impl From<QuantizerType> for ProtoQuantizerType {
    fn from(value: QuantizerType) -> Self {
        match value {
            QuantizerType::NoQuantizer => ProtoQuantizerType::NoQuantizer,
            QuantizerType::ProductQuantizer => ProtoQuantizerType::ProductQuantizer,
        }
    }
}

impl From<PostingListEncoding> for ProtoEncoding {
    fn from(value: PostingListEncoding) -> Self {
        match value {
            PostingListEncoding::PlainEncoding => ProtoEncoding::PlainEncoding,
            PostingListEncoding::EliasFano => ProtoEncoding::EliasFano,
        }
    }
}

impl From<CollectionConfig> for ProtoCreateCollectionRequest {
    fn from(config: CollectionConfig) -> Self {
        ProtoCreateCollectionRequest {
            collection_name: config.collection_name,
            num_features: config.num_features,
            centroids_max_neighbors: config.centroids_max_neighbors,
            centroids_max_layers: config.centroids_max_layers,
            centroids_ef_construction: config.centroids_ef_construction,
            centroids_builder_vector_storage_memory_size: config
                .centroids_builder_vector_storage_memory_size,
            centroids_builder_vector_storage_file_size: config
                .centroids_builder_vector_storage_file_size,
            quantization_type: config
                .quantization_type
                .map(|q| ProtoQuantizerType::from(q) as i32),
            product_quantization_max_iteration: config.product_quantization_max_iteration,
            product_quantization_batch_size: config.product_quantization_batch_size,
            product_quantization_subvector_dimension: config
                .product_quantization_subvector_dimension,
            product_quantization_num_bits: config.product_quantization_num_bits,
            product_quantization_num_training_rows: config.product_quantization_num_training_rows,
            initial_num_centroids: config.initial_num_centroids,
            num_data_points_for_clustering: config.num_data_points_for_clustering,
            max_clusters_per_vector: config.max_clusters_per_vector,
            clustering_distance_threshold_pct: config.clustering_distance_threshold_pct,
            posting_list_encoding_type: config
                .posting_list_encoding_type
                .map(|e| ProtoEncoding::from(e) as i32),
            posting_list_builder_vector_storage_memory_size: config
                .posting_list_builder_vector_storage_memory_size,
            posting_list_builder_vector_storage_file_size: config
                .posting_list_builder_vector_storage_file_size,
            max_posting_list_size: config.max_posting_list_size,
            posting_list_kmeans_unbalanced_penalty: config.posting_list_kmeans_unbalanced_penalty,
            reindex: config.reindex,
            wal_file_size: config.wal_file_size,
            max_pending_ops: config.max_pending_ops,
            max_time_to_flush_ms: config.max_time_to_flush_ms,
        }
    }
}

// ===== User ids =====

/// Padded user ids; no ids at all means the default user
fn user_filter(user_ids: &[Vec<u8>]) -> MuopDbResult<Vec<Id>> {
    if user_ids.is_empty() {
        return Ok(vec![DEFAULT_USER_ID]);
    }
    pad_ids(user_ids)
}

// ===== Insert =====

/// Vectors must be a non-zero multiple of the document count
fn check_payload(request: &InsertRequest) -> MuopDbResult<()> {
    if request.doc_ids.is_empty() {
        return Err(MuopDbError::Validation(
            "insert requires at least one document id".to_string(),
        ));
    }
    if request.dimensions().is_none() {
        return Err(MuopDbError::Validation(format!(
            "{} vector values cannot be split evenly across {} documents",
            request.vectors.len(),
            request.doc_ids.len()
        )));
    }
    Ok(())
}

impl TryFrom<InsertRequest> for ProtoInsertRequest {
    type Error = MuopDbError;

    fn try_from(request: InsertRequest) -> Result<Self, Self::Error> {
        check_payload(&request)?;
        let (low_ids, high_ids) = split_ids(&request.doc_ids)?;
        let (low_user_ids, high_user_ids) = split_ids(&user_filter(&request.user_ids)?)?;

        Ok(ProtoInsertRequest {
            collection_name: request.collection_name,
            low_ids,
            high_ids,
            vectors: request.vectors,
            low_user_ids,
            high_user_ids,
        })
    }
}

impl TryFrom<InsertRequest> for ProtoInsertPackedRequest {
    type Error = MuopDbError;

    fn try_from(request: InsertRequest) -> Result<Self, Self::Error> {
        check_payload(&request)?;
        let doc_ids = exact_ids(&request.doc_ids)?;
        let user_ids = user_filter(&request.user_ids)?;

        Ok(ProtoInsertPackedRequest {
            collection_name: request.collection_name,
            doc_ids: pack_ids(&doc_ids),
            vectors: pack_vectors(&request.vectors),
            user_ids: pack_ids(&user_ids),
        })
    }
}

// ===== Search =====

impl TryFrom<SearchRequest> for ProtoSearchRequest {
    type Error = MuopDbError;

    fn try_from(request: SearchRequest) -> Result<Self, Self::Error> {
        let (low_user_ids, high_user_ids) = split_ids(&user_filter(&request.user_ids)?)?;

        Ok(ProtoSearchRequest {
            collection_name: request.collection_name,
            vector: request.vector,
            top_k: request.top_k,
            ef_construction: request.ef_construction,
            record_metrics: request.record_metrics,
            low_user_ids,
            high_user_ids,
        })
    }
}

impl TryFrom<ProtoSearchResponse> for SearchResponse {
    type Error = MuopDbError;

    fn try_from(response: ProtoSearchResponse) -> Result<Self, Self::Error> {
        let doc_ids = merge_ids(&response.low_ids, &response.high_ids)?;
        if doc_ids.len() != response.scores.len() {
            return Err(MuopDbError::Protocol(format!(
                "search returned {} ids but {} scores",
                doc_ids.len(),
                response.scores.len()
            )));
        }

        Ok(SearchResponse {
            doc_ids,
            scores: response.scores,
            num_pages_accessed: response.num_pages_accessed,
        })
    }
}

// ===== Flush =====

impl From<ProtoFlushResponse> for FlushResponse {
    fn from(response: ProtoFlushResponse) -> Self {
        FlushResponse {
            flushed_segments: response.flushed_segments,
        }
    }
}
