use thiserror::Error;

pub type GrpcResult<T> = Result<T, GrpcError>;

/// Errors that can occur while building or connecting a gRPC channel
#[derive(Error, Debug)]
pub enum GrpcError {
  /// Invalid URI provided for connection
  #[error("Invalid URI '{addr}': {source}")]
  InvalidUri {
    addr: String,
    #[source]
    source: tonic::transport::Error,
  },

  /// Failed to establish connection
  #[error("Connection to '{addr}' failed: {source}")]
  ConnectionFailed {
    addr: String,
    #[source]
    source: tonic::transport::Error,
  },

  /// Invalid configuration
  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),
}

impl GrpcError {
  /// Address the failing channel was pointed at, if any
  pub fn addr(&self) -> Option<&str> {
    match self {
      GrpcError::InvalidUri { addr, .. } | GrpcError::ConnectionFailed { addr, .. } => Some(addr),
      GrpcError::InvalidConfig(_) => None,
    }
  }
}

impl From<GrpcError> for tonic::Status {
  fn from(err: GrpcError) -> Self {
    match err {
      GrpcError::InvalidUri { .. } | GrpcError::InvalidConfig(_) => {
        tonic::Status::invalid_argument(err.to_string())
      }
      GrpcError::ConnectionFailed { .. } => tonic::Status::unavailable(err.to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_invalid_config_maps_to_invalid_argument() {
    let status: tonic::Status = GrpcError::InvalidConfig("zero timeout".to_string()).into();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);
    assert!(status.message().contains("zero timeout"));
  }

  #[test]
  fn test_invalid_config_has_no_addr() {
    assert!(GrpcError::InvalidConfig("x".to_string()).addr().is_none());
  }
}
