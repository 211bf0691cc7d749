//! The per-question pipeline and the context object that carries everything it needs.
//!
//! ```text
//! Idle → Analyzing → Rejected
//!                  → Retrieving → Empty
//!                               → Synthesizing → Done
//! ```
//!
//! [`Assistant`] is built once (index included) and is read-only afterwards, so
//! it can be shared between concurrent questions.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::answer::{Synthesis, Synthesizer};
use crate::config::{AnswerConfig, Config, MessagesConfig, RetrievalConfig};
use crate::embedder::{Embedder, GenerateError, Generator};
use crate::index::{build_index, BuildError, Catalog};
use crate::query::{QueryAnalyzer, QueryConfigError};
use crate::retriever::{retrieve, RetrieveError};

/// Why a relevant question produced no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Nothing passed the distance filter.
    NoMatches,
    /// Matches existed but all cost more than the ceiling.
    OverCeiling(u64),
}

/// Terminal state of one question.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rejected,
    Empty(EmptyReason),
    Done(String),
}

pub struct Assistant {
    catalog: Catalog,
    analyzer: QueryAnalyzer,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    retrieval: RetrievalConfig,
    answer: AnswerConfig,
    messages: MessagesConfig,
}

impl Assistant {
    pub fn new(
        catalog: Catalog,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        config: &Config,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            catalog,
            analyzer: QueryAnalyzer::new(&config.query)?,
            embedder,
            generator,
            retrieval: config.retrieval.clone(),
            answer: config.answer.clone(),
            messages: config.messages.clone(),
        })
    }

    /// Builds the index from `catalog_path`, then the assistant around it.
    pub async fn start(
        catalog_path: &Path,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        config: &Config,
    ) -> Result<Self, PipelineError> {
        let catalog = build_index(catalog_path, embedder.as_ref(), config.index.dimension).await?;
        info!(records = catalog.len(), "assistant ready");
        Self::new(catalog, embedder, generator, config)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Runs one question to its terminal state.
    pub async fn answer(&self, query: &str) -> Result<Outcome, PipelineError> {
        if !self.analyzer.is_relevant_query(query) {
            debug!("query rejected as off-domain");
            return Ok(Outcome::Rejected);
        }
        let ceiling = self.analyzer.extract_price_threshold(query);
        debug!(?ceiling, "query accepted");

        let retrieval = retrieve(
            query,
            &self.catalog,
            self.embedder.as_ref(),
            &self.retrieval,
            ceiling,
        )
        .await?;
        if retrieval.is_empty() {
            let reason = match ceiling {
                Some(c) if retrieval.price_rejected > 0 => EmptyReason::OverCeiling(c),
                _ => EmptyReason::NoMatches,
            };
            return Ok(Outcome::Empty(reason));
        }

        let synthesizer = Synthesizer::new(self.generator.as_ref(), &self.answer);
        match synthesizer.synthesize(query, &retrieval.records()).await? {
            Synthesis::NoDocuments => Ok(Outcome::Empty(EmptyReason::NoMatches)),
            Synthesis::Answer(text) => Ok(Outcome::Done(text)),
        }
    }

    /// User-facing text for an outcome.
    pub fn render(&self, outcome: &Outcome) -> String {
        match outcome {
            Outcome::Rejected => self.messages.not_relevant.clone(),
            Outcome::Empty(EmptyReason::NoMatches) => self.messages.no_documents.clone(),
            Outcome::Empty(EmptyReason::OverCeiling(c)) => self
                .messages
                .no_price_matches
                .replace("{ceiling}", &c.to_string()),
            Outcome::Done(text) => text.clone(),
        }
    }

    /// Question in, text out. Model failures are errors, never an empty answer.
    pub async fn generate_answer(&self, query: &str) -> Result<String, PipelineError> {
        let outcome = self.answer(query).await?;
        Ok(self.render(&outcome))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("query config: {0}")]
    QueryConfig(#[from] QueryConfigError),
    #[error("index build failed: {0}")]
    Build(#[from] BuildError),
    #[error("retrieval failed: {0}")]
    Retrieve(#[from] RetrieveError),
    #[error("answer generation failed: {0}")]
    Generate(#[from] GenerateError),
}
