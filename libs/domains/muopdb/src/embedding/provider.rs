use async_trait::async_trait;

use crate::error::MuopDbResult;

/// Trait for text embedding providers
///
/// Batch results come back in the same order as the input texts.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> MuopDbResult<Vec<f32>>;

    /// Embed many texts in one request
    async fn embed_batch(&self, texts: &[String]) -> MuopDbResult<Vec<Vec<f32>>>;
}
