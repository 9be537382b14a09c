//! # gRPC Client Library
//!
//! Channel creation with HTTP/2 tuning and a request-id interceptor for the
//! clients that talk to remote index servers.
//!
//! There is no retry layer. Every call is attempted once and failures are
//! handed back to the caller.
//!
//! ## Quick Start
//!
//! ```ignore
//! use grpc_client::{create_channel_with_config, ChannelConfig, RequestIdInterceptor};
//! use rpc::muopdb::index_server_client::IndexServerClient;
//!
//! let channel = create_channel_with_config("http://127.0.0.1:9002", ChannelConfig::default()).await?;
//! let client = IndexServerClient::with_interceptor(
//!     channel,
//!     RequestIdInterceptor::with_service_name("muopdb-demo"),
//! );
//! ```
//!
//! ### With Custom Configuration
//! ```ignore
//! use grpc_client::{create_channel_with_config, ChannelConfig};
//! use std::time::Duration;
//!
//! let config = ChannelConfig::default()
//!     .with_connect_timeout(Duration::from_secs(10))
//!     .with_request_timeout(Duration::from_secs(120));
//!
//! let channel = create_channel_with_config("http://127.0.0.1:9002", config).await?;
//! ```

pub mod channel;
pub mod error;
pub mod interceptors;

// Re-export main types and functions for convenience
pub use channel::{ChannelConfig, create_channel_lazy_with_config, create_channel_with_config};
pub use error::{GrpcError, GrpcResult};
pub use interceptors::{Interceptor, MetadataExtractor, RequestIdInterceptor};
