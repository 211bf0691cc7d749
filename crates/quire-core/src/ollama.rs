//! Ollama client for embeddings and completion. Wraps ollama-rs behind the
//! [`Embedder`] and [`Generator`] contracts.

use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest as OllamaGenerationRequest;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
use ollama_rs::models::ModelOptions;
use ollama_rs::Ollama;
use thiserror::Error;

use crate::config::OllamaConfig;
use crate::embedder::{EmbedError, Embedder, GenerateError, GenerationRequest, Generator};

pub const DEFAULT_EMBED_MODEL: &str = "all-minilm";
pub const DEFAULT_GENERATE_MODEL: &str = "llama3.2";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
/// Inputs are cut to this many tokens before embedding.
pub const DEFAULT_MAX_INPUT_TOKENS: u32 = 512;

/// Thin wrapper around Ollama for embedding and completion.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    inner: Ollama,
    embed_model: String,
    generate_model: String,
    max_input_tokens: u32,
}

impl OllamaClient {
    /// Create from URL string. Default: http://localhost:11434.
    pub fn from_url(url: &str) -> Result<Self, OllamaError> {
        let inner = Ollama::try_new(url).map_err(OllamaError::ParseUrl)?;
        Ok(Self {
            inner,
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            generate_model: DEFAULT_GENERATE_MODEL.to_string(),
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
        })
    }

    /// Create from the `[ollama]` config section.
    pub fn from_config(config: &OllamaConfig) -> Result<Self, OllamaError> {
        Ok(Self::from_url(&config.base_url)?
            .with_embed_model(&config.embed_model)
            .with_generate_model(&config.generate_model)
            .with_max_input_tokens(config.max_input_tokens))
    }

    /// Set the embedding model (e.g. `all-minilm`, `nomic-embed-text`).
    pub fn with_embed_model(mut self, model: impl Into<String>) -> Self {
        self.embed_model = model.into();
        self
    }

    /// Set the completion model (e.g. `llama3.2`).
    pub fn with_generate_model(mut self, model: impl Into<String>) -> Self {
        self.generate_model = model.into();
        self
    }

    pub fn with_max_input_tokens(mut self, tokens: u32) -> Self {
        self.max_input_tokens = tokens;
        self
    }

    fn embeddings_request(&self, input: EmbeddingsInput) -> GenerateEmbeddingsRequest {
        GenerateEmbeddingsRequest::new(self.embed_model.clone(), input)
            .truncate(true)
            .options(ModelOptions::default().num_ctx(self.max_input_tokens as _))
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    /// Embed a single string. Returns the embedding vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let req = self.embeddings_request(EmbeddingsInput::Single(text.to_string()));
        let res = self
            .inner
            .generate_embeddings(req)
            .await
            .map_err(|e| EmbedError::Backend(e.to_string()))?;
        res.embeddings.into_iter().next().ok_or(EmbedError::Empty)
    }

    /// Embed multiple strings in one call. Returns one embedding per input.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let req = self.embeddings_request(EmbeddingsInput::Multiple(texts.to_vec()));
        let res = self
            .inner
            .generate_embeddings(req)
            .await
            .map_err(|e| EmbedError::Backend(e.to_string()))?;
        Ok(res.embeddings)
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        let options = ModelOptions::default()
            .num_predict(request.max_new_tokens as _)
            .temperature(request.temperature);
        let req = OllamaGenerationRequest::new(self.generate_model.clone(), request.prompt.clone())
            .options(options);
        let res = self
            .inner
            .generate(req)
            .await
            .map_err(|e| GenerateError::Backend(e.to_string()))?;
        Ok(res.response)
    }
}

#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("invalid Ollama URL: {0}")]
    ParseUrl(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_applies_models() {
        let config = OllamaConfig {
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "mistral".to_string(),
            max_input_tokens: 256,
            ..OllamaConfig::default()
        };
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.embed_model, "nomic-embed-text");
        assert_eq!(client.generate_model, "mistral");
        assert_eq!(client.max_input_tokens, 256);
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(matches!(
            OllamaClient::from_url("not a url"),
            Err(OllamaError::ParseUrl(_))
        ));
    }
}
