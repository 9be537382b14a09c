//! Google Gemini embedding provider
//!
//! Talks to the Generative Language REST API with an API key:
//! `models/{model}:embedContent` for one text and
//! `models/{model}:batchEmbedContents` for many.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_required};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::EmbeddingProvider;
use crate::error::{MuopDbError, MuopDbResult};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "text-embedding-004";

/// Most texts one `batchEmbedContents` call accepts
const MAX_BATCH_SIZE: usize = 100;

/// Gemini provider configuration
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.base_url.trim_end_matches('/'),
            self.model,
            method
        )
    }

    fn model_path(&self) -> String {
        format!("models/{}", self.model)
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

// The key never goes to logs
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl FromEnv for GeminiConfig {
    /// GEMINI_API_KEY is required; GEMINI_MODEL and GEMINI_BASE_URL are optional
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_required("GEMINI_API_KEY")?,
            model: env_or_default("GEMINI_MODEL", DEFAULT_MODEL),
            base_url: env_or_default("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            ..Default::default()
        })
    }
}

// Gemini request/response types

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
}

impl<'a> EmbedContentRequest<'a> {
    fn new(model: String, text: &'a str) -> Self {
        Self {
            model,
            content: Content {
                parts: [Part { text }],
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchEmbedContentsRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedContentsResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

/// Gemini embeddings provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> MuopDbResult<Self> {
        if config.api_key.is_empty() {
            return Err(MuopDbError::Config("Gemini API key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> MuopDbResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: &B,
    ) -> MuopDbResult<R> {
        let response = self
            .client
            .post(self.config.endpoint_url(method))
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MuopDbError::Embedding(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response.json().await?)
    }
}

fn non_empty(values: Vec<f32>, index: usize) -> MuopDbResult<Vec<f32>> {
    if values.is_empty() {
        return Err(MuopDbError::Embedding(format!(
            "empty embedding returned for input {}",
            index
        )));
    }
    Ok(values)
}

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
    #[instrument(skip_all, fields(model = %self.config.model, chars = text.len()))]
    async fn embed(&self, text: &str) -> MuopDbResult<Vec<f32>> {
        let request = EmbedContentRequest::new(self.config.model_path(), text);
        let response: EmbedContentResponse = self.post("embedContent", &request).await?;
        non_empty(response.embedding.values, 0)
    }

    #[instrument(skip_all, fields(model = %self.config.model, texts = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> MuopDbResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for (chunk_index, chunk) in texts.chunks(MAX_BATCH_SIZE).enumerate() {
            let offset = chunk_index * MAX_BATCH_SIZE;
            let request = BatchEmbedContentsRequest {
                requests: chunk
                    .iter()
                    .map(|text| EmbedContentRequest::new(self.config.model_path(), text))
                    .collect(),
            };
            let response: BatchEmbedContentsResponse =
                self.post("batchEmbedContents", &request).await?;

            if response.embeddings.len() != chunk.len() {
                return Err(MuopDbError::Embedding(format!(
                    "requested {} embeddings, received {} (texts {}..{})",
                    chunk.len(),
                    response.embeddings.len(),
                    offset,
                    offset + chunk.len()
                )));
            }

            for (index, embedding) in response.embeddings.into_iter().enumerate() {
                embeddings.push(non_empty(embedding.values, offset + index)?);
            }
        }

        tracing::debug!(
            count = embeddings.len(),
            dimensions = embeddings.first().map_or(0, Vec::len),
            "Generated embeddings"
        );
        Ok(embeddings)
    }
}
