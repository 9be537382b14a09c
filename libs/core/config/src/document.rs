//! YAML configuration documents
//!
//! Applications ship a default document compiled into the binary and let the
//! operator point at a replacement file on disk.

use crate::ConfigError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Parse a YAML document from `path`, or from `embedded_default` when no path is given
///
/// # Example
/// ```ignore
/// const DEFAULT: &str = include_str!("../config/default.yaml");
/// let config: AppConfig = load_yaml_document(args.config.as_deref(), DEFAULT)?;
/// ```
pub fn load_yaml_document<T: DeserializeOwned>(
    path: Option<&Path>,
    embedded_default: &str,
) -> Result<T, ConfigError> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "Loaded config file");
            parse_yaml(&raw, &path.display().to_string())
        }
        None => parse_yaml(embedded_default, "embedded default"),
    }
}

fn parse_yaml<T: DeserializeOwned>(raw: &str, origin: &str) -> Result<T, ConfigError> {
    serde_yaml_ng::from_str(raw).map_err(|e| ConfigError::Parse {
        origin: origin.to_string(),
        details: e.to_string(),
    })
}
