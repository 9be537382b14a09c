mod auto_flush;
mod muopdb;

pub use auto_flush::AutoFlush;
pub use muopdb::MuopDbClient;

use async_trait::async_trait;

use crate::collection::CollectionConfig;
use crate::error::MuopDbResult;
use crate::models::{FlushResponse, InsertRequest, InsertResponse, SearchRequest, SearchResponse};

/// Operations exposed by a MuopDB index server
///
/// Inserts never flush on their own. Wrap a client in [`AutoFlush`] to get a
/// Flush after every insert.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Create a collection with server defaults
    async fn create_collection(&self, collection_name: &str) -> MuopDbResult<()>;

    /// Create a collection with explicit tuning parameters
    async fn create_collection_with_config(&self, config: CollectionConfig) -> MuopDbResult<()>;

    async fn insert(&self, request: InsertRequest) -> MuopDbResult<InsertResponse>;

    /// Same as `insert`, shipped as flat byte buffers
    async fn insert_packed(&self, request: InsertRequest) -> MuopDbResult<InsertResponse>;

    async fn search(&self, request: SearchRequest) -> MuopDbResult<SearchResponse>;

    /// Persist pending writes, returning the names of the flushed segments
    async fn flush(&self, collection_name: &str) -> MuopDbResult<FlushResponse>;

    /// Release the connection. Any call afterwards fails with `ConnectionClosed`.
    async fn close(&self) -> MuopDbResult<()>;
}
