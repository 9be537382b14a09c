//! Configuration for the demo
//!
//! One YAML document with `muopdb`, `gemini` and `demo` sections. The default
//! document is compiled in; `--config` points at a replacement.

use std::path::{Path, PathBuf};

use core_config::{ConfigError, load_yaml_document};
use domain_muopdb::{GeminiConfig, MuopDbConfig};
use serde::Deserialize;
use validator::Validate;

const DEFAULT_CONFIG: &str = include_str!("../config/default.yaml");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub muopdb: MuopDbConfig,
    pub gemini: GeminiConfig,
    pub demo: DemoConfig,
}

/// Documents are numbered by their line in the sentences file, which is
/// what lets search results map back to sentences.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// One sentence per line
    pub sentences_path: PathBuf,
    pub embeddings_path: PathBuf,
    #[validate(length(min = 1))]
    pub collection: String,
    #[validate(range(min = 1))]
    pub batch_size: usize,
    pub query: String,
    #[validate(range(min = 1))]
    pub top_k: u32,
    #[validate(range(min = 1))]
    pub ef_construction: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            sentences_path: PathBuf::from("samples/sentences.txt"),
            embeddings_path: PathBuf::from("samples/sentences_embedding.bin"),
            collection: "test-collection".to_string(),
            batch_size: 5,
            query: "Space Science Fiction".to_string(),
            top_k: 10,
            ef_construction: 100,
        }
    }
}

impl AppConfig {
    /// Load the document at `path` (or the built-in one) and apply env overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config: AppConfig = load_yaml_document(path, DEFAULT_CONFIG)?;

        if let Some(api_key) = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()) {
            config.gemini.api_key = api_key;
        }

        config.demo.validate().map_err(|e| ConfigError::Parse {
            origin: "demo".to_string(),
            details: e.to_string(),
        })?;

        Ok(config)
    }
}
