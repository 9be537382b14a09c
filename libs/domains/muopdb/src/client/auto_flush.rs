use async_trait::async_trait;

use super::IndexClient;
use crate::collection::CollectionConfig;
use crate::error::MuopDbResult;
use crate::models::{FlushResponse, InsertRequest, InsertResponse, SearchRequest, SearchResponse};

/// Flushes the collection after every successful insert
///
/// If the Flush fails the insert call fails with the Flush error, even
/// though the documents reached the server.
pub struct AutoFlush<C> {
    inner: C,
}

impl<C: IndexClient> AutoFlush<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: IndexClient> IndexClient for AutoFlush<C> {
    async fn create_collection(&self, collection_name: &str) -> MuopDbResult<()> {
        self.inner.create_collection(collection_name).await
    }

    async fn create_collection_with_config(&self, config: CollectionConfig) -> MuopDbResult<()> {
        self.inner.create_collection_with_config(config).await
    }

    async fn insert(&self, request: InsertRequest) -> MuopDbResult<InsertResponse> {
        let collection = request.collection_name.clone();
        let response = self.inner.insert(request).await?;
        self.inner.flush(&collection).await?;
        Ok(response)
    }

    async fn insert_packed(&self, request: InsertRequest) -> MuopDbResult<InsertResponse> {
        let collection = request.collection_name.clone();
        let response = self.inner.insert_packed(request).await?;
        self.inner.flush(&collection).await?;
        Ok(response)
    }

    async fn search(&self, request: SearchRequest) -> MuopDbResult<SearchResponse> {
        self.inner.search(request).await
    }

    async fn flush(&self, collection_name: &str) -> MuopDbResult<FlushResponse> {
        self.inner.flush(collection_name).await
    }

    async fn close(&self) -> MuopDbResult<()> {
        self.inner.close().await
    }
}
