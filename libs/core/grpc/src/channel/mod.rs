pub mod config;

pub use config::ChannelConfig;

use crate::error::{GrpcError, GrpcResult};
use tonic::transport::{Channel, Endpoint};

/// Creates a lazy gRPC channel that connects on first request
///
/// Returns immediately without touching the network. Connection errors
/// surface on the first RPC instead.
pub fn create_channel_lazy_with_config(
  addr: impl Into<String>,
  config: ChannelConfig,
) -> GrpcResult<Channel> {
  let addr = addr.into();
  let endpoint = build_endpoint(&addr, config)?;

  tracing::debug!(
    target: "grpc_client",
    addr = %addr,
    "Creating lazy gRPC channel (connects on first request)"
  );

  Ok(endpoint.connect_lazy())
}

/// Creates a gRPC channel with custom configuration
///
/// The connection is established before this returns, so an unreachable
/// server is reported here rather than on the first RPC.
///
/// ## Example
/// ```ignore
/// use grpc_client::{create_channel_with_config, ChannelConfig};
/// use std::time::Duration;
///
/// let config = ChannelConfig::default()
///     .with_connect_timeout(Duration::from_secs(10))
///     .with_request_timeout(Duration::from_secs(120));
///
/// let channel = create_channel_with_config("http://127.0.0.1:9002", config).await?;
/// ```
pub async fn create_channel_with_config(
  addr: impl Into<String>,
  config: ChannelConfig,
) -> GrpcResult<Channel> {
  let addr = addr.into();
  let endpoint = build_endpoint(&addr, config)?;

  tracing::debug!(
    target: "grpc_client",
    addr = %addr,
    "Creating gRPC channel"
  );

  endpoint.connect().await.map_err(|e| {
    tracing::error!(
      target: "grpc_client",
      addr = %addr,
      error = ?e,
      "Failed to connect to gRPC service"
    );
    GrpcError::ConnectionFailed { addr, source: e }
  })
}

fn build_endpoint(addr: &str, config: ChannelConfig) -> GrpcResult<Endpoint> {
  config.validate()?;

  let endpoint = Endpoint::from_shared(addr.to_string()).map_err(|e| {
    tracing::error!(target: "grpc_client", addr = %addr, error = ?e, "Invalid URI");
    GrpcError::InvalidUri {
      addr: addr.to_string(),
      source: e,
    }
  })?;

  Ok(config.apply_to_endpoint(endpoint))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn test_invalid_uri() {
    let result = create_channel_with_config("not a valid uri", ChannelConfig::default()).await;
    let err = result.unwrap_err();
    assert!(matches!(err, GrpcError::InvalidUri { .. }));
    assert_eq!(err.addr(), Some("not a valid uri"));
  }

  #[tokio::test]
  async fn test_connection_failed() {
    // Nothing listens on port 1 on loopback
    let config = ChannelConfig::new().with_connect_timeout(Duration::from_millis(500));
    let result = create_channel_with_config("http://127.0.0.1:1", config).await;
    assert!(matches!(result, Err(GrpcError::ConnectionFailed { .. })));
  }

  #[tokio::test]
  async fn test_lazy_channel_does_not_connect() {
    let result = create_channel_lazy_with_config("http://127.0.0.1:1", ChannelConfig::default());
    assert!(result.is_ok());
  }

  #[tokio::test]
  async fn test_invalid_config_rejected_before_connecting() {
    let config = ChannelConfig::new().with_request_timeout(Duration::ZERO);
    let result = create_channel_lazy_with_config("http://127.0.0.1:1", config);
    assert!(matches!(result, Err(GrpcError::InvalidConfig(_))));
  }
}
