use core_config::ConfigError;
use grpc_client::GrpcError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MuopDbError {
    #[error(transparent)]
    Transport(#[from] GrpcError),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("{operation} failed: {status}")]
    Rpc {
        operation: &'static str,
        #[source]
        status: tonic::Status,
    },

    #[error("Identifier at index {index} has length {len}, expected 16 bytes")]
    InvalidIdLength { index: usize, len: usize },

    #[error("Identifier halves differ in length: {lows} low, {highs} high")]
    IdCountMismatch { lows: usize, highs: usize },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid collection config: {0}")]
    InvalidCollectionConfig(#[from] validator::ValidationErrors),

    #[error("Batch {batch} [{start}:{end}) failed: {source}")]
    BatchFailed {
        batch: usize,
        start: usize,
        end: usize,
        #[source]
        source: Box<MuopDbError>,
    },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type MuopDbResult<T> = Result<T, MuopDbError>;

impl MuopDbError {
    pub(crate) fn rpc(operation: &'static str, status: tonic::Status) -> Self {
        MuopDbError::Rpc { operation, status }
    }

    /// The server status behind this error, looking through batch failures
    pub fn status(&self) -> Option<&tonic::Status> {
        match self {
            MuopDbError::Rpc { status, .. } => Some(status),
            MuopDbError::BatchFailed { source, .. } => source.status(),
            _ => None,
        }
    }

    /// True when the server rejected a CreateCollection for an existing name
    pub fn is_already_exists(&self) -> bool {
        self.status()
            .is_some_and(|status| status.code() == tonic::Code::AlreadyExists)
    }
}

impl From<reqwest::Error> for MuopDbError {
    fn from(err: reqwest::Error) -> Self {
        MuopDbError::Embedding(err.to_string())
    }
}

impl From<ConfigError> for MuopDbError {
    fn from(err: ConfigError) -> Self {
        MuopDbError::Config(err.to_string())
    }
}

impl From<bincode::Error> for MuopDbError {
    fn from(err: bincode::Error) -> Self {
        MuopDbError::Cache(err.to_string())
    }
}
