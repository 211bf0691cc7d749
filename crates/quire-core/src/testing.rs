//! Deterministic stand-ins for the model backends, used by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::catalog::CatalogRecord;
use crate::embedder::{EmbedError, Embedder, GenerateError, GenerationRequest, Generator};

/// Embeds a text as the vector of the first rule whose key occurs in it,
/// or the fallback vector when none does.
pub struct FakeEmbedder {
    rules: Vec<(String, Vec<f32>)>,
    fallback: Vec<f32>,
    extra: Option<Vec<f32>>,
    unavailable: bool,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            rules: Vec::new(),
            fallback: vec![0.0; dimension],
            extra: None,
            unavailable: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rule(mut self, key: &str, vector: Vec<f32>) -> Self {
        self.rules.push((key.to_string(), vector));
        self
    }

    /// Every batch returns one vector more than it was asked for.
    pub fn with_extra_vector(mut self, vector: Vec<f32>) -> Self {
        self.extra = Some(vector);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Number of `embed`/`embed_batch` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        self.rules
            .iter()
            .find(|(key, _)| text.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(EmbedError::Backend("connection refused".to_string()));
        }
        Ok(self.vector_for(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(EmbedError::Backend("connection refused".to_string()));
        }
        let mut out: Vec<Vec<f32>> = texts.iter().map(|t| self.vector_for(t)).collect();
        out.extend(self.extra.clone());
        Ok(out)
    }
}

/// Returns a canned completion and remembers what it was asked.
pub struct FakeGenerator {
    output: String,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl FakeGenerator {
    pub fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(self.output.clone())
    }
}

pub fn record(id: &str, name: &str, price: f64) -> CatalogRecord {
    CatalogRecord {
        id: id.to_string(),
        name: name.to_string(),
        price,
        description: format!("{name} description"),
        category: "Fiction".to_string(),
    }
}
