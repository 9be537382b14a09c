//! In-process MuopDB index server
//!
//! `FakeIndexServer` keeps documents in memory and answers searches with a
//! brute-force dot product. Only flushed documents are searchable, which
//! mirrors the real server closely enough to exercise Flush ordering.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use grpc_client::MetadataExtractor;
use rpc::muopdb::index_server_server::{IndexServer, IndexServerServer};
use rpc::muopdb::{
    CreateCollectionRequest, CreateCollectionResponse, FlushRequest, FlushResponse,
    InsertPackedRequest, InsertPackedResponse, InsertRequest, InsertResponse, SearchRequest,
    SearchResponse,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

type Key = (u64, u64);

/// Number of calls served per RPC
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub create_collection: usize,
    pub insert: usize,
    pub insert_packed: usize,
    pub search: usize,
    pub flush: usize,
}

struct StoredDoc {
    id: Key,
    users: Vec<Key>,
    vector: Vec<f32>,
}

struct FakeCollection {
    config: CreateCollectionRequest,
    dimensions: Option<usize>,
    docs: Vec<StoredDoc>,
    flushed: usize,
    segments: usize,
}

impl FakeCollection {
    fn append(&mut self, ids: Vec<Key>, users: Vec<Key>, vectors: Vec<f32>) -> Result<u32, Status> {
        if ids.is_empty() || vectors.len() % ids.len() != 0 || vectors.is_empty() {
            return Err(Status::invalid_argument(format!(
                "{} vector values for {} documents",
                vectors.len(),
                ids.len()
            )));
        }
        let dimensions = vectors.len() / ids.len();
        if let Some(expected) = self.dimensions.filter(|d| *d != dimensions) {
            return Err(Status::invalid_argument(format!(
                "collection has {} dimensions, got {}",
                expected, dimensions
            )));
        }
        if let Some(expected) = self.config.num_features.filter(|d| *d as usize != dimensions) {
            return Err(Status::invalid_argument(format!(
                "collection has {} features, got {}",
                expected, dimensions
            )));
        }
        self.dimensions = Some(dimensions);

        let count = ids.len();
        for (id, vector) in ids.into_iter().zip(vectors.chunks_exact(dimensions)) {
            self.docs.push(StoredDoc {
                id,
                users: users.clone(),
                vector: vector.to_vec(),
            });
        }
        Ok(count as u32)
    }
}

#[derive(Default)]
struct State {
    collections: HashMap<String, FakeCollection>,
    calls: CallCounts,
    request_ids: Vec<String>,
    source_services: Vec<String>,
    fail_insert_at: Option<usize>,
}

impl State {
    fn collection(&mut self, name: &str) -> Result<&mut FakeCollection, Status> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| Status::not_found(format!("collection {} not found", name)))
    }

    /// Whether the insert call just counted was scheduled to fail
    fn insert_should_fail(&self) -> bool {
        let served = self.calls.insert + self.calls.insert_packed;
        self.fail_insert_at == Some(served)
    }
}

/// Shared handle to the fake server's state
#[derive(Clone, Default)]
pub struct FakeIndexServer {
    state: Arc<Mutex<State>>,
}

impl FakeIndexServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record<T>(&self, request: &Request<T>) {
        let metadata = MetadataExtractor(request.metadata());
        let mut state = self.lock();
        state.request_ids.extend(metadata.request_id());
        state.source_services.extend(metadata.source_service());
    }

    /// Make the `n`th insert call (1-based, Insert and InsertPacked together) fail
    pub fn fail_insert_at(&self, n: usize) {
        self.lock().fail_insert_at = Some(n);
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    /// `x-request-id` values seen so far, in arrival order
    pub fn request_ids(&self) -> Vec<String> {
        self.lock().request_ids.clone()
    }

    /// `x-source-service` values seen so far, in arrival order
    pub fn source_services(&self) -> Vec<String> {
        self.lock().source_services.clone()
    }

    /// Documents stored in a collection, flushed or not
    pub fn document_count(&self, collection: &str) -> Option<usize> {
        self.lock().collections.get(collection).map(|c| c.docs.len())
    }

    /// Documents inserted but not yet flushed
    pub fn pending_count(&self, collection: &str) -> Option<usize> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.docs.len() - c.flushed)
    }

    /// The CreateCollection request a collection was made with
    pub fn collection_config(&self, collection: &str) -> Option<CreateCollectionRequest> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.config.clone())
    }

    /// Ids stored for a collection as (low, high) pairs, in insert order
    pub fn document_ids(&self, collection: &str) -> Vec<(u64, u64)> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.docs.iter().map(|d| d.id).collect())
            .unwrap_or_default()
    }
}

fn zip_keys(lows: &[u64], highs: &[u64], what: &str) -> Result<Vec<Key>, Status> {
    if lows.len() != highs.len() {
        return Err(Status::invalid_argument(format!(
            "{} low/high lengths differ: {} vs {}",
            what,
            lows.len(),
            highs.len()
        )));
    }
    Ok(lows.iter().copied().zip(highs.iter().copied()).collect())
}

fn unpack_keys(bytes: &[u8], what: &str) -> Result<Vec<Key>, Status> {
    if bytes.len() % 16 != 0 {
        return Err(Status::invalid_argument(format!(
            "{} buffer of {} bytes is not a multiple of 16",
            what,
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(16)
        .map(|chunk| {
            let mut low = [0u8; 8];
            let mut high = [0u8; 8];
            low.copy_from_slice(&chunk[..8]);
            high.copy_from_slice(&chunk[8..]);
            (u64::from_le_bytes(low), u64::from_le_bytes(high))
        })
        .collect())
}

fn unpack_vectors(bytes: &[u8]) -> Result<Vec<f32>, Status> {
    if bytes.len() % 4 != 0 {
        return Err(Status::invalid_argument("vector buffer is not f32 aligned"));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[tonic::async_trait]
impl IndexServer for FakeIndexServer {
    async fn create_collection(
        &self,
        request: Request<CreateCollectionRequest>,
    ) -> Result<Response<CreateCollectionResponse>, Status> {
        self.record(&request);
        let config = request.into_inner();
        let mut state = self.lock();
        state.calls.create_collection += 1;

        if config.collection_name.is_empty() {
            return Err(Status::invalid_argument("collection name is empty"));
        }
        if state.collections.contains_key(&config.collection_name) {
            return Err(Status::already_exists(format!(
                "collection {} already exists",
                config.collection_name
            )));
        }

        tracing::debug!(collection = %config.collection_name, "Fake collection created");
        state.collections.insert(
            config.collection_name.clone(),
            FakeCollection {
                config,
                dimensions: None,
                docs: Vec::new(),
                flushed: 0,
                segments: 0,
            },
        );
        Ok(Response::new(CreateCollectionResponse {}))
    }

    async fn search(
        &self,
        request: Request<SearchRequest>,
    ) -> Result<Response<SearchResponse>, Status> {
        self.record(&request);
        let request = request.into_inner();
        let mut state = self.lock();
        state.calls.search += 1;

        let users = zip_keys(&request.low_user_ids, &request.high_user_ids, "user id")?;
        let collection = state.collection(&request.collection_name)?;
        if let Some(dimensions) = collection.dimensions.filter(|d| *d != request.vector.len()) {
            return Err(Status::invalid_argument(format!(
                "query has {} dimensions, collection has {}",
                request.vector.len(),
                dimensions
            )));
        }

        let searchable = &collection.docs[..collection.flushed];
        let mut hits: Vec<(Key, f32)> = searchable
            .iter()
            .filter(|doc| users.iter().any(|user| doc.users.contains(user)))
            .map(|doc| {
                let score: f32 = doc
                    .vector
                    .iter()
                    .zip(&request.vector)
                    .map(|(a, b)| a * b)
                    .sum();
                (doc.id, score)
            })
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1));
        hits.truncate(request.top_k as usize);

        let num_pages_accessed = if request.record_metrics {
            searchable.len() as u64
        } else {
            0
        };

        Ok(Response::new(SearchResponse {
            low_ids: hits.iter().map(|((low, _), _)| *low).collect(),
            high_ids: hits.iter().map(|((_, high), _)| *high).collect(),
            scores: hits.iter().map(|(_, score)| *score).collect(),
            num_pages_accessed,
        }))
    }

    async fn insert(
        &self,
        request: Request<InsertRequest>,
    ) -> Result<Response<InsertResponse>, Status> {
        self.record(&request);
        let request = request.into_inner();
        let mut state = self.lock();
        state.calls.insert += 1;
        if state.insert_should_fail() {
            return Err(Status::unavailable("injected insert failure"));
        }

        let ids = zip_keys(&request.low_ids, &request.high_ids, "doc id")?;
        let users = zip_keys(&request.low_user_ids, &request.high_user_ids, "user id")?;
        let num_docs_inserted = state
            .collection(&request.collection_name)?
            .append(ids, users, request.vectors)?;

        Ok(Response::new(InsertResponse { num_docs_inserted }))
    }

    async fn insert_packed(
        &self,
        request: Request<InsertPackedRequest>,
    ) -> Result<Response<InsertPackedResponse>, Status> {
        self.record(&request);
        let request = request.into_inner();
        let mut state = self.lock();
        state.calls.insert_packed += 1;
        if state.insert_should_fail() {
            return Err(Status::unavailable("injected insert failure"));
        }

        let ids = unpack_keys(&request.doc_ids, "doc id")?;
        let users = unpack_keys(&request.user_ids, "user id")?;
        let vectors = unpack_vectors(&request.vectors)?;
        let num_docs_inserted = state
            .collection(&request.collection_name)?
            .append(ids, users, vectors)?;

        Ok(Response::new(InsertPackedResponse { num_docs_inserted }))
    }

    async fn flush(
        &self,
        request: Request<FlushRequest>,
    ) -> Result<Response<FlushResponse>, Status> {
        self.record(&request);
        let request = request.into_inner();
        let mut state = self.lock();
        state.calls.flush += 1;

        let collection = state.collection(&request.collection_name)?;
        let mut flushed_segments = Vec::new();
        if collection.flushed < collection.docs.len() {
            flushed_segments.push(format!("segment_{}", collection.segments));
            collection.segments += 1;
            collection.flushed = collection.docs.len();
        }

        Ok(Response::new(FlushResponse { flushed_segments }))
    }
}

/// A fake index server listening on an ephemeral loopback port
///
/// The server stops when this value is dropped.
///
/// # Example
///
/// ```rust,no_run
/// use test_utils::TestMuopDb;
///
/// # async fn example() {
/// let muopdb = TestMuopDb::start().await;
/// let endpoint = muopdb.endpoint();
/// // connect a client to `muopdb.host()`:`muopdb.port()`
/// assert_eq!(muopdb.server().calls().insert, 0);
/// # }
/// ```
pub struct TestMuopDb {
    server: FakeIndexServer,
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestMuopDb {
    pub async fn start() -> Self {
        Self::start_with(FakeIndexServer::new()).await
    }

    pub async fn start_with(server: FakeIndexServer) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake MuopDB listener");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake MuopDB address");

        let (shutdown, signal) = oneshot::channel::<()>();
        let service = IndexServerServer::new(server.clone())
            .accept_compressed(CompressionEncoding::Zstd)
            .send_compressed(CompressionEncoding::Zstd);

        tokio::spawn(async move {
            let result = Server::builder()
                .add_service(service)
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                    signal.await.ok();
                })
                .await;
            if let Err(err) = result {
                tracing::error!(error = %err, "Fake MuopDB server failed");
            }
        });

        tracing::info!(%addr, "Fake MuopDB ready");

        Self {
            server,
            addr,
            shutdown: Some(shutdown),
        }
    }

    pub fn server(&self) -> &FakeIndexServer {
        &self.server
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestMuopDb {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
