mod gemini;
mod provider;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use provider::EmbeddingProvider;
