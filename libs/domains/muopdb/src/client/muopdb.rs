use async_trait::async_trait;
use grpc_client::{RequestIdInterceptor, create_channel_lazy_with_config, create_channel_with_config};
use rpc::muopdb::index_server_client::IndexServerClient;
use rpc::muopdb::{
    CreateCollectionRequest as ProtoCreateCollectionRequest, FlushRequest as ProtoFlushRequest,
    InsertPackedRequest as ProtoInsertPackedRequest, InsertRequest as ProtoInsertRequest,
    SearchRequest as ProtoSearchRequest,
};
use tokio::sync::RwLock;
use tonic::codec::CompressionEncoding;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Channel;
use tracing::instrument;

use super::IndexClient;
use crate::collection::CollectionConfig;
use crate::config::MuopDbConfig;
use crate::error::{MuopDbError, MuopDbResult};
use crate::models::{FlushResponse, InsertRequest, InsertResponse, SearchRequest, SearchResponse};

type Stub = IndexServerClient<InterceptedService<Channel, RequestIdInterceptor>>;

const SERVICE_NAME: &str = "domain-muopdb";

/// gRPC client for a MuopDB index server
///
/// Methods take `&self`; concurrent calls share one HTTP/2 channel. After
/// [`IndexClient::close`] the channel is dropped and every call fails with
/// [`MuopDbError::ConnectionClosed`].
///
/// # Example
/// ```ignore
/// use domain_muopdb::{IndexClient, MuopDbClient, MuopDbConfig, SearchRequest};
///
/// let client = MuopDbClient::connect(&MuopDbConfig::new("localhost", 9002)).await?;
/// client.create_collection("sentences").await?;
/// let hits = client.search(SearchRequest::new("sentences", query, 10)).await?;
/// client.close().await?;
/// ```
pub struct MuopDbClient {
    stub: RwLock<Option<Stub>>,
    endpoint: String,
}

impl MuopDbClient {
    /// Connect eagerly; an unreachable server fails here
    pub async fn connect(config: &MuopDbConfig) -> MuopDbResult<Self> {
        let channel = create_channel_with_config(config.endpoint(), config.channel_config()).await?;
        Ok(Self::from_channel(channel, config))
    }

    /// Build the client without touching the network; the first call connects
    pub fn connect_lazy(config: &MuopDbConfig) -> MuopDbResult<Self> {
        let channel = create_channel_lazy_with_config(config.endpoint(), config.channel_config())?;
        Ok(Self::from_channel(channel, config))
    }

    /// Wrap an existing channel, applying message limits and compression
    pub fn from_channel(channel: Channel, config: &MuopDbConfig) -> Self {
        let mut stub = IndexServerClient::with_interceptor(
            channel,
            RequestIdInterceptor::with_service_name(SERVICE_NAME),
        )
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size)
        .accept_compressed(CompressionEncoding::Zstd);

        if config.compression {
            stub = stub.send_compressed(CompressionEncoding::Zstd);
        }

        tracing::debug!(endpoint = %config.endpoint(), "MuopDB client ready");

        Self {
            stub: RwLock::new(Some(stub)),
            endpoint: config.endpoint(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn is_closed(&self) -> bool {
        self.stub.read().await.is_none()
    }

    /// Clone of the stub for one call; tonic clients are cheap handles
    async fn stub(&self) -> MuopDbResult<Stub> {
        self.stub
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or(MuopDbError::ConnectionClosed)
    }

    async fn send_create(
        &self,
        mut stub: Stub,
        request: ProtoCreateCollectionRequest,
    ) -> MuopDbResult<()> {
        if request.collection_name.is_empty() {
            return Err(MuopDbError::Validation(
                "collection name cannot be empty".to_string(),
            ));
        }
        let collection = request.collection_name.clone();

        stub.create_collection(request).await.map_err(|status| {
            tracing::warn!(collection = %collection, code = ?status.code(), "CreateCollection rejected");
            MuopDbError::rpc("CreateCollection", status)
        })?;

        tracing::info!(collection = %collection, "Collection created");
        Ok(())
    }
}

#[async_trait]
impl IndexClient for MuopDbClient {
    #[instrument(skip(self))]
    async fn create_collection(&self, collection_name: &str) -> MuopDbResult<()> {
        let stub = self.stub().await?;
        self.send_create(
            stub,
            ProtoCreateCollectionRequest {
                collection_name: collection_name.to_string(),
                ..Default::default()
            },
        )
        .await
    }

    #[instrument(skip_all, fields(collection = %config.collection_name))]
    async fn create_collection_with_config(&self, config: CollectionConfig) -> MuopDbResult<()> {
        let stub = self.stub().await?;
        let config = config.validated()?;
        self.send_create(stub, config.into()).await
    }

    #[instrument(skip_all, fields(collection = %request.collection_name, docs = request.doc_ids.len()))]
    async fn insert(&self, request: InsertRequest) -> MuopDbResult<InsertResponse> {
        let mut stub = self.stub().await?;
        let request = ProtoInsertRequest::try_from(request)?;
        let response = stub
            .insert(request)
            .await
            .map_err(|status| MuopDbError::rpc("Insert", status))?
            .into_inner();

        tracing::debug!(inserted = response.num_docs_inserted, "Insert complete");
        Ok(InsertResponse {
            num_docs_inserted: response.num_docs_inserted,
        })
    }

    #[instrument(skip_all, fields(collection = %request.collection_name, docs = request.doc_ids.len()))]
    async fn insert_packed(&self, request: InsertRequest) -> MuopDbResult<InsertResponse> {
        let mut stub = self.stub().await?;
        let request = ProtoInsertPackedRequest::try_from(request)?;
        let response = stub
            .insert_packed(request)
            .await
            .map_err(|status| MuopDbError::rpc("InsertPacked", status))?
            .into_inner();

        tracing::debug!(inserted = response.num_docs_inserted, "InsertPacked complete");
        Ok(InsertResponse {
            num_docs_inserted: response.num_docs_inserted,
        })
    }

    #[instrument(skip_all, fields(collection = %request.collection_name, top_k = request.top_k))]
    async fn search(&self, request: SearchRequest) -> MuopDbResult<SearchResponse> {
        let mut stub = self.stub().await?;
        let request = ProtoSearchRequest::try_from(request)?;
        let response = stub
            .search(request)
            .await
            .map_err(|status| MuopDbError::rpc("Search", status))?
            .into_inner();

        let response = SearchResponse::try_from(response)?;
        tracing::debug!(
            hits = response.len(),
            pages = response.num_pages_accessed,
            "Search complete"
        );
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn flush(&self, collection_name: &str) -> MuopDbResult<FlushResponse> {
        let response = self
            .stub()
            .await?
            .flush(ProtoFlushRequest {
                collection_name: collection_name.to_string(),
            })
            .await
            .map_err(|status| MuopDbError::rpc("Flush", status))?
            .into_inner();

        tracing::debug!(segments = response.flushed_segments.len(), "Flush complete");
        Ok(response.into())
    }

    async fn close(&self) -> MuopDbResult<()> {
        match self.stub.write().await.take() {
            Some(_) => {
                tracing::debug!(endpoint = %self.endpoint, "MuopDB client closed");
                Ok(())
            }
            None => Err(MuopDbError::ConnectionClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_client() -> MuopDbClient {
        // Port 1 on loopback refuses connections
        MuopDbClient::connect_lazy(&MuopDbConfig::new("127.0.0.1", 1)).unwrap()
    }

    #[tokio::test]
    async fn test_calls_after_close_fail() {
        let client = lazy_client();
        assert!(!client.is_closed().await);

        client.close().await.unwrap();
        assert!(client.is_closed().await);

        assert!(matches!(
            client.flush("docs").await,
            Err(MuopDbError::ConnectionClosed)
        ));
        assert!(matches!(
            client.create_collection("docs").await,
            Err(MuopDbError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_closed_client_reports_closed_before_checking_input() {
        let client = lazy_client();
        client.close().await.unwrap();

        assert!(matches!(
            client.create_collection("").await,
            Err(MuopDbError::ConnectionClosed)
        ));
        let config = CollectionConfig {
            num_features: Some(0),
            ..CollectionConfig::new("docs")
        };
        assert!(matches!(
            client.create_collection_with_config(config).await,
            Err(MuopDbError::ConnectionClosed)
        ));
        let malformed = InsertRequest::new("docs", [vec![0u8; 8]], vec![1.0, 2.0]);
        assert!(matches!(
            client.insert(malformed.clone()).await,
            Err(MuopDbError::ConnectionClosed)
        ));
        assert!(matches!(
            client.insert_packed(malformed).await,
            Err(MuopDbError::ConnectionClosed)
        ));
        let oversized_user = SearchRequest::new("docs", vec![1.0], 1).with_user_ids([vec![1u8; 17]]);
        assert!(matches!(
            client.search(oversized_user).await,
            Err(MuopDbError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_second_close_fails_gracefully() {
        let client = lazy_client();
        client.close().await.unwrap();
        assert!(matches!(client.close().await, Err(MuopDbError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_empty_collection_name_rejected_locally() {
        let client = lazy_client();
        assert!(matches!(
            client.create_collection("").await,
            Err(MuopDbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_rpc() {
        let client = lazy_client();
        let config = CollectionConfig {
            num_features: Some(0),
            ..CollectionConfig::new("docs")
        };
        assert!(matches!(
            client.create_collection_with_config(config).await,
            Err(MuopDbError::InvalidCollectionConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_doc_id_rejected_before_rpc() {
        let client = lazy_client();
        let request = InsertRequest::new("docs", [vec![0u8; 8]], vec![1.0, 2.0]);
        assert!(matches!(
            client.insert(request).await,
            Err(MuopDbError::InvalidIdLength { index: 0, len: 8 })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_rpc_failure() {
        let client = lazy_client();
        let err = client.flush("docs").await.unwrap_err();
        assert!(matches!(err, MuopDbError::Rpc { operation: "Flush", .. }));
        assert!(err.status().is_some());
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_server() {
        let config = MuopDbConfig {
            connect_timeout_secs: 1,
            ..MuopDbConfig::new("127.0.0.1", 1)
        };
        let result = MuopDbClient::connect(&config).await;
        assert!(matches!(result, Err(MuopDbError::Transport(_))));
    }
}
