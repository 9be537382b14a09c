//! Client-side request correlation
//!
//! Stamps every outgoing call with a request id and a W3C `traceparent`
//! so server logs can be matched against client logs.

use tonic::{Request, Status};

/// Interceptor that tags outgoing gRPC requests with correlation headers
///
/// Headers injected:
/// - `x-request-id`: UUID v4, fresh for every call
/// - `traceparent`: W3C Trace Context format (version-trace_id-span_id-flags)
/// - `x-source-service`: caller name, when configured
///
/// # Example
/// ```ignore
/// use grpc_client::{create_channel_lazy_with_config, ChannelConfig, RequestIdInterceptor};
/// use rpc::muopdb::index_server_client::IndexServerClient;
///
/// let channel = create_channel_lazy_with_config("http://127.0.0.1:9002", ChannelConfig::default())?;
/// let client = IndexServerClient::with_interceptor(
///     channel,
///     RequestIdInterceptor::with_service_name("muopdb-demo"),
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestIdInterceptor {
    service_name: Option<String>,
}

impl RequestIdInterceptor {
    pub fn new() -> Self {
        Self { service_name: None }
    }

    /// Also send `x-source-service` with every request
    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: Some(service_name.into()),
        }
    }

    /// Format: {version}-{trace_id}-{parent_id}-{trace_flags}
    fn generate_traceparent() -> String {
        let trace_id = uuid::Uuid::new_v4().as_simple().to_string();
        let span_id = &uuid::Uuid::new_v4().as_simple().to_string()[..16];
        format!("00-{trace_id}-{span_id}-01")
    }
}

impl tonic::service::Interceptor for RequestIdInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        if let Some(ref name) = self.service_name {
            if let Ok(value) = name.parse() {
                request.metadata_mut().insert("x-source-service", value);
            }
        }

        let request_id = uuid::Uuid::new_v4().to_string();
        let traceparent = Self::generate_traceparent();

        request.metadata_mut().insert(
            "traceparent",
            traceparent
                .parse()
                .map_err(|_| Status::internal("Failed to create traceparent header"))?,
        );
        request.metadata_mut().insert(
            "x-request-id",
            request_id
                .parse()
                .map_err(|_| Status::internal("Failed to create request ID"))?,
        );

        tracing::debug!(
            target: "grpc_client",
            request_id = %request_id,
            traceparent = %traceparent,
            "Outgoing gRPC request"
        );

        Ok(request)
    }
}

/// Read correlation headers back out of gRPC metadata
pub struct MetadataExtractor<'a>(pub &'a tonic::metadata::MetadataMap);

impl MetadataExtractor<'_> {
    fn traceparent_part(&self, index: usize) -> Option<String> {
        self.0
            .get("traceparent")
            .and_then(|v| v.to_str().ok())
            .and_then(|tp| tp.split('-').nth(index).map(String::from))
    }

    /// Trace ID from the traceparent header
    pub fn trace_id(&self) -> Option<String> {
        self.traceparent_part(1)
    }

    /// Span ID from the traceparent header
    pub fn span_id(&self) -> Option<String> {
        self.traceparent_part(2)
    }

    pub fn request_id(&self) -> Option<String> {
        self.0
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    pub fn source_service(&self) -> Option<String> {
        self.0
            .get("x-source-service")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }
}
