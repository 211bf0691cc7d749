//! The two model contracts the pipeline depends on: text → vector and prompt → text.

use async_trait::async_trait;

/// Maps text to a fixed-length vector. Catalog records and queries must go through
/// the same embedder so their distances are comparable.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Embed several texts, one vector per input, in order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Options for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
}

/// Produces a single text completion for a prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("embedding backend unavailable: {0}")]
    Backend(String),
    #[error("embedding backend returned no vector")]
    Empty,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generation backend unavailable: {0}")]
    Backend(String),
}
