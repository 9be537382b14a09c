use std::time::Duration;
use tonic::transport::Endpoint;

use crate::error::{GrpcError, GrpcResult};

/// Configuration for gRPC channel creation
///
/// Builder-style knobs over tonic's `Endpoint`. The defaults suit a single
/// long-lived connection to an index server that receives large insert
/// batches: generous windows, keep-alive while idle, and a request timeout
/// long enough for a flush.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
  // HTTP/2 Keep-Alive
  pub http2_keep_alive_interval: Option<Duration>,
  pub keep_alive_timeout: Duration,
  pub keep_alive_while_idle: bool,

  // Connection settings
  pub connect_timeout: Duration,
  pub timeout: Duration,

  // Window sizes (HTTP/2 flow control)
  pub initial_connection_window_size: Option<u32>,
  pub initial_stream_window_size: Option<u32>,
  pub http2_adaptive_window: bool,

  // TCP settings
  pub tcp_nodelay: bool,
  pub tcp_keepalive: Option<Duration>,
}

impl Default for ChannelConfig {
  fn default() -> Self {
    Self {
      http2_keep_alive_interval: Some(Duration::from_secs(30)),
      keep_alive_timeout: Duration::from_secs(10),
      keep_alive_while_idle: true,
      connect_timeout: Duration::from_secs(5),
      timeout: Duration::from_secs(60),
      initial_connection_window_size: Some(4 * 1024 * 1024), // 4MB
      initial_stream_window_size: Some(2 * 1024 * 1024),     // 2MB
      http2_adaptive_window: true,
      tcp_nodelay: true,
      tcp_keepalive: Some(Duration::from_secs(30)),
    }
  }
}

impl ChannelConfig {
  /// Create a new configuration with the defaults
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the connection timeout
  ///
  /// # Example
  /// ```ignore
  /// let config = ChannelConfig::new()
  ///     .with_connect_timeout(Duration::from_secs(10));
  /// ```
  pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
    self.connect_timeout = timeout;
    self
  }

  /// Set the request timeout for individual RPCs
  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Reject settings tonic would accept but that make every call fail
  pub fn validate(&self) -> GrpcResult<()> {
    if self.connect_timeout.is_zero() {
      return Err(GrpcError::InvalidConfig(
        "connect_timeout must be greater than zero".to_string(),
      ));
    }
    if self.timeout.is_zero() {
      return Err(GrpcError::InvalidConfig(
        "request timeout must be greater than zero".to_string(),
      ));
    }
    Ok(())
  }

  /// Apply this configuration to a tonic Endpoint
  pub(crate) fn apply_to_endpoint(self, mut endpoint: Endpoint) -> Endpoint {
    // HTTP/2 keep-alive
    if let Some(interval) = self.http2_keep_alive_interval {
      endpoint = endpoint.http2_keep_alive_interval(interval);
    }
    endpoint = endpoint
      .keep_alive_timeout(self.keep_alive_timeout)
      .keep_alive_while_idle(self.keep_alive_while_idle);

    // Connection settings
    endpoint = endpoint
      .connect_timeout(self.connect_timeout)
      .timeout(self.timeout);

    // Window sizes
    if let Some(size) = self.initial_connection_window_size {
      endpoint = endpoint.initial_connection_window_size(size);
    }
    if let Some(size) = self.initial_stream_window_size {
      endpoint = endpoint.initial_stream_window_size(size);
    }
    endpoint = endpoint.http2_adaptive_window(self.http2_adaptive_window);

    // TCP settings
    endpoint = endpoint.tcp_nodelay(self.tcp_nodelay);
    if let Some(keepalive) = self.tcp_keepalive {
      endpoint = endpoint.tcp_keepalive(Some(keepalive));
    }

    endpoint
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_config() {
    let config = ChannelConfig::default();
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.initial_connection_window_size, Some(4 * 1024 * 1024));
    assert_eq!(config.initial_stream_window_size, Some(2 * 1024 * 1024));
    assert!(config.tcp_nodelay);
    assert!(config.http2_adaptive_window);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_builder_pattern() {
    let config = ChannelConfig::new()
      .with_connect_timeout(Duration::from_secs(10))
      .with_request_timeout(Duration::from_secs(120));

    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.timeout, Duration::from_secs(120));
    assert_eq!(config.http2_keep_alive_interval, Some(Duration::from_secs(30)));
  }

  #[test]
  fn test_zero_timeouts_rejected() {
    let config = ChannelConfig::new().with_request_timeout(Duration::ZERO);
    assert!(matches!(config.validate(), Err(GrpcError::InvalidConfig(_))));

    let config = ChannelConfig::new().with_connect_timeout(Duration::ZERO);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("connect_timeout"));
  }
}
