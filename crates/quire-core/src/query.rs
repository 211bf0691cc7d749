//! Cheap checks run on a question before any model is touched: is it about the
//! catalog at all, and does it ask for a maximum price.

use regex::Regex;

use crate::config::QueryConfig;

#[derive(Debug, Clone)]
pub struct QueryAnalyzer {
    keywords: Vec<String>,
    price_pattern: Regex,
}

impl QueryAnalyzer {
    pub fn new(config: &QueryConfig) -> Result<Self, QueryConfigError> {
        let price_pattern = Regex::new(&config.price_pattern)?;
        if price_pattern.captures_len() < 2 {
            return Err(QueryConfigError::NoCaptureGroup(config.price_pattern.clone()));
        }
        let keywords = config
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Ok(Self {
            keywords,
            price_pattern,
        })
    }

    /// True if the query mentions any domain keyword (case-insensitive substring).
    pub fn is_relevant_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.keywords.iter().any(|k| query.contains(k.as_str()))
    }

    /// Inclusive price ceiling from phrases like "under $50" or "below 20".
    /// Only the first match counts.
    pub fn extract_price_threshold(&self, query: &str) -> Option<u64> {
        let caps = self.price_pattern.captures(query)?;
        let digits = caps.iter().skip(1).flatten().next()?.as_str();
        digits.parse().ok()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueryConfigError {
    #[error("invalid price pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("price pattern {0:?} has no capture group")]
    NoCaptureGroup(String),
}
