// @generated
// This file is @generated by prost-build.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateCollectionRequest {
    #[prost(string, tag = "1")]
    pub collection_name: ::prost::alloc::string::String,
    #[prost(uint32, optional, tag = "2")]
    pub num_features: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub centroids_max_neighbors: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub centroids_max_layers: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "5")]
    pub centroids_ef_construction: ::core::option::Option<u32>,
    #[prost(uint64, optional, tag = "6")]
    pub centroids_builder_vector_storage_memory_size: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "7")]
    pub centroids_builder_vector_storage_file_size: ::core::option::Option<u64>,
    #[prost(enumeration = "QuantizerType", optional, tag = "8")]
    pub quantization_type: ::core::option::Option<i32>,
    #[prost(uint32, optional, tag = "9")]
    pub product_quantization_max_iteration: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "10")]
    pub product_quantization_batch_size: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "11")]
    pub product_quantization_subvector_dimension: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "12")]
    pub product_quantization_num_bits: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "13")]
    pub product_quantization_num_training_rows: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "14")]
    pub initial_num_centroids: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "15")]
    pub num_data_points_for_clustering: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "16")]
    pub max_clusters_per_vector: ::core::option::Option<u32>,
    #[prost(float, optional, tag = "17")]
    pub clustering_distance_threshold_pct: ::core::option::Option<f32>,
    #[prost(enumeration = "IntSeqEncodingType", optional, tag = "18")]
    pub posting_list_encoding_type: ::core::option::Option<i32>,
    #[prost(uint64, optional, tag = "19")]
    pub posting_list_builder_vector_storage_memory_size: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "20")]
    pub posting_list_builder_vector_storage_file_size: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "21")]
    pub max_posting_list_size: ::core::option::Option<u64>,
    #[prost(float, optional, tag = "22")]
    pub posting_list_kmeans_unbalanced_penalty: ::core::option::Option<f32>,
    #[prost(bool, optional, tag = "23")]
    pub reindex: ::core::option::Option<bool>,
    #[prost(uint64, optional, tag = "24")]
    pub wal_file_size: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "25")]
    pub max_pending_ops: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "26")]
    pub max_time_to_flush_ms: ::core::option::Option<u64>,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct CreateCollectionResponse {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InsertRequest {
    #[prost(string, tag = "1")]
    pub collection_name: ::prost::alloc::string::String,
    #[prost(uint64, repeated, tag = "2")]
    pub low_ids: ::prost::alloc::vec::Vec<u64>,
    #[prost(uint64, repeated, tag = "3")]
    pub high_ids: ::prost::alloc::vec::Vec<u64>,
    #[prost(float, repeated, tag = "4")]
    pub vectors: ::prost::alloc::vec::Vec<f32>,
    #[prost(uint64, repeated, tag = "5")]
    pub low_user_ids: ::prost::alloc::vec::Vec<u64>,
    #[prost(uint64, repeated, tag = "6")]
    pub high_user_ids: ::prost::alloc::vec::Vec<u64>,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct InsertResponse {
    #[prost(uint32, tag = "1")]
    pub num_docs_inserted: u32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InsertPackedRequest {
    #[prost(string, tag = "1")]
    pub collection_name: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub doc_ids: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub vectors: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub user_ids: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct InsertPackedResponse {
    #[prost(uint32, tag = "1")]
    pub num_docs_inserted: u32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchRequest {
    #[prost(string, tag = "1")]
    pub collection_name: ::prost::alloc::string::String,
    #[prost(float, repeated, tag = "2")]
    pub vector: ::prost::alloc::vec::Vec<f32>,
    #[prost(uint32, tag = "3")]
    pub top_k: u32,
    #[prost(uint32, tag = "4")]
    pub ef_construction: u32,
    #[prost(bool, tag = "5")]
    pub record_metrics: bool,
    #[prost(uint64, repeated, tag = "6")]
    pub low_user_ids: ::prost::alloc::vec::Vec<u64>,
    #[prost(uint64, repeated, tag = "7")]
    pub high_user_ids: ::prost::alloc::vec::Vec<u64>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchResponse {
    #[prost(uint64, repeated, tag = "1")]
    pub low_ids: ::prost::alloc::vec::Vec<u64>,
    #[prost(uint64, repeated, tag = "2")]
    pub high_ids: ::prost::alloc::vec::Vec<u64>,
    #[prost(float, repeated, tag = "3")]
    pub scores: ::prost::alloc::vec::Vec<f32>,
    #[prost(uint64, tag = "4")]
    pub num_pages_accessed: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FlushRequest {
    #[prost(string, tag = "1")]
    pub collection_name: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FlushResponse {
    #[prost(string, repeated, tag = "1")]
    pub flushed_segments: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum QuantizerType {
    NoQuantizer = 0,
    ProductQuantizer = 1,
}
impl QuantizerType {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::NoQuantizer => "NO_QUANTIZER",
            Self::ProductQuantizer => "PRODUCT_QUANTIZER",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "NO_QUANTIZER" => Some(Self::NoQuantizer),
            "PRODUCT_QUANTIZER" => Some(Self::ProductQuantizer),
            _ => None,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum IntSeqEncodingType {
    PlainEncoding = 0,
    EliasFano = 1,
}
impl IntSeqEncodingType {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::PlainEncoding => "PLAIN_ENCODING",
            Self::EliasFano => "ELIAS_FANO",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "PLAIN_ENCODING" => Some(Self::PlainEncoding),
            "ELIAS_FANO" => Some(Self::EliasFano),
            _ => None,
        }
    }
}
include!("muopdb.tonic.rs");
// @@protoc_insertion_point(module)
