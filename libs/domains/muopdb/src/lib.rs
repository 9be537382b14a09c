//! MuopDB Domain Library
//!
//! Typed async client for the MuopDB index server, plus the pieces a loader
//! needs around it: batched inserts, text embeddings and an embedding cache.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │  BatchInserter  │     │ EmbeddingProvider│
//! └────────┬────────┘     │    (trait)       │
//!          │              └────────┬─────────┘
//! ┌────────▼────────┐              │
//! │   IndexClient   │     ┌────────▼─────────┐
//! │    (trait)      │     │  GeminiProvider  │
//! └────────┬────────┘     └──────────────────┘
//!          │
//! ┌────────▼────────┐
//! │  MuopDbClient   │  ← gRPC over grpc-client channels
//! │  AutoFlush<C>   │  ← flush after every insert
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_muopdb::{IndexClient, InsertRequest, MuopDbClient, MuopDbConfig, SearchRequest, sequential_id};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MuopDbClient::connect(&MuopDbConfig::new("localhost", 9002)).await?;
//!
//! client.create_collection("sentences").await?;
//! client
//!     .insert(InsertRequest::new(
//!         "sentences",
//!         [sequential_id(0), sequential_id(1)],
//!         vec![1.0, 0.0, 0.0, 1.0],
//!     ))
//!     .await?;
//! client.flush("sentences").await?;
//!
//! let response = client
//!     .search(SearchRequest::new("sentences", vec![1.0, 0.0], 1))
//!     .await?;
//! for (id, score) in response.hits() {
//!     println!("{:?} {}", id, score);
//! }
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod cache;
pub mod client;
pub mod collection;
pub mod config;
pub mod conversions;
pub mod embedding;
pub mod error;
pub mod ids;
pub mod models;

// Re-exports for convenience
pub use batch::{BatchInserter, BatchReport, IdNumbering};
pub use cache::{load_embeddings, save_embeddings};
pub use client::{AutoFlush, IndexClient, MuopDbClient};
pub use collection::{CollectionConfig, PostingListEncoding, QuantizerType};
pub use config::MuopDbConfig;
pub use embedding::{EmbeddingProvider, GeminiConfig, GeminiProvider};
pub use error::{MuopDbError, MuopDbResult};
pub use ids::{
    DEFAULT_USER_ID, ID_LEN, Id, exact_ids, id_ordinal, merge_ids, pack_ids, pack_vectors, pad_ids,
    sequential_id, split_ids,
};
pub use models::{
    FlushResponse, InsertRequest, InsertResponse, SearchRequest, SearchResponse,
};
