//! Turns retrieved records into a prompt, asks the generator, and keeps only
//! the structured `Name:` lines of the generated text.
//!
//! The generated text is the context block followed by the model's
//! continuation, so the context lines are always echoed back and any `Name:`
//! lines the model adds come after them.

use tracing::debug;

use crate::catalog::CatalogRecord;
use crate::config::AnswerConfig;
use crate::embedder::{GenerateError, GenerationRequest, Generator};

/// Lines of the model output that survive post-processing start with this.
pub const LINE_MARKER: &str = "Name:";
const ELLIPSIS: &str = "...";

/// Result of synthesis: either no records to talk about, or the cleaned model output.
#[derive(Debug, Clone, PartialEq)]
pub enum Synthesis {
    NoDocuments,
    Answer(String),
}

pub struct Synthesizer<'a> {
    generator: &'a dyn Generator,
    config: &'a AnswerConfig,
}

impl<'a> Synthesizer<'a> {
    pub fn new(generator: &'a dyn Generator, config: &'a AnswerConfig) -> Self {
        Self { generator, config }
    }

    /// Generates an answer grounded in `records`. No model call when there are none.
    pub async fn synthesize(
        &self,
        query: &str,
        records: &[&CatalogRecord],
    ) -> Result<Synthesis, GenerateError> {
        if records.is_empty() {
            return Ok(Synthesis::NoDocuments);
        }
        let context = build_context(records, self.config.description_limit);
        let request = GenerationRequest {
            prompt: build_prompt(&context, query),
            max_new_tokens: self.config.max_new_tokens,
            temperature: self.config.temperature,
        };
        debug!(records = records.len(), "generating answer");
        let completion = self.generator.generate(&request).await?;
        let generated = format!("{context}\n{completion}");
        Ok(Synthesis::Answer(format_output(&generated)))
    }
}

/// One `Name: .. | Price: .. | Description: ..` line per record.
pub fn build_context(records: &[&CatalogRecord], description_limit: usize) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "{LINE_MARKER} {} | Price: {} | Description: {}",
                r.name,
                r.price_label(),
                shorten_input(&r.description, description_limit)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "Answer the following question based on the following context: {context}. Question: {query}"
    )
}

/// Cuts `text` to `max_length` characters and appends `...` if anything was cut.
pub fn shorten_input(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Keeps only lines that start with [`LINE_MARKER`], trimmed, one per line.
pub fn format_output(output: &str) -> String {
    output
        .lines()
        .filter(|line| line.starts_with(LINE_MARKER))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
