//! Client-side gRPC interceptors
//!
//! Interceptors run on every outgoing request before it hits the channel.

/// Re-export tonic's Interceptor trait for convenience
pub use tonic::service::Interceptor;

pub mod request_id;

pub use request_id::{MetadataExtractor, RequestIdInterceptor};
