//! Persisted config (catalog path, model endpoints, retrieval knobs) in the app data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app_data;

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the catalog CSV produced by the crawler.
    pub catalog_path: Option<String>,
    /// Deadline for one question, applied by front-ends around the whole pipeline.
    pub query_timeout_secs: u64,
    pub ollama: OllamaConfig,
    pub index: IndexConfig,
    pub retrieval: RetrievalConfig,
    pub query: QueryConfig,
    pub answer: AnswerConfig,
    pub messages: MessagesConfig,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            query_timeout_secs: 120,
            ollama: OllamaConfig::default(),
            index: IndexConfig::default(),
            retrieval: RetrievalConfig::default(),
            query: QueryConfig::default(),
            answer: AnswerConfig::default(),
            messages: MessagesConfig::default(),
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    /// Model used for both catalog and query embeddings.
    pub embed_model: String,
    /// Model used to phrase the final answer.
    pub generate_model: String,
    /// Inputs longer than this many tokens are truncated by the server.
    pub max_input_tokens: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "all-minilm".to_string(),
            generate_model: "llama3.2".to_string(),
            max_input_tokens: 512,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Embedding dimension; must match the embed model (384 for all-minilm).
    pub dimension: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { dimension: 384 }
    }
}

/// Which side of the threshold a candidate's distance must fall on to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceFilter {
    /// Keep candidates with `distance >= threshold`.
    #[default]
    AtLeast,
    /// Keep candidates with `distance <= threshold`.
    AtMost,
}

impl DistanceFilter {
    pub fn accepts(self, distance: f32, threshold: f32) -> bool {
        match self {
            DistanceFilter::AtLeast => distance >= threshold,
            DistanceFilter::AtMost => distance <= threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of nearest neighbours fetched per query.
    pub top_k: usize,
    pub similarity_threshold: f32,
    pub distance_filter: DistanceFilter,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.5,
            distance_filter: DistanceFilter::AtLeast,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// A query must mention at least one of these (case-insensitive) to be answered.
    pub keywords: Vec<String>,
    /// Regex whose first matching capture group is the price ceiling.
    pub price_pattern: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            keywords: ["book", "price", "category", "description"]
                .into_iter()
                .map(String::from)
                .collect(),
            price_pattern: r"(?i)under\s*\$?([0-9]+)|below\s*\$?([0-9]+)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    pub max_new_tokens: u32,
    pub temperature: f32,
    /// Descriptions longer than this many characters are cut in the prompt context.
    pub description_limit: usize,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 70,
            temperature: 0.7,
            description_limit: 100,
        }
    }
}

/// Fixed user-facing replies for the non-answer outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub not_relevant: String,
    pub no_documents: String,
    /// `{ceiling}` is replaced with the requested price ceiling.
    pub no_price_matches: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            not_relevant: "Your query doesn't seem related to the domain. Please ask about books, prices, or categories.".to_string(),
            no_documents: "No relevant documents found for your query.".to_string(),
            no_price_matches: "No books found under ${ceiling}.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level filter (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Load config from the app data directory. Returns default config if missing or invalid.
pub fn load_config() -> Config {
    try_load_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "using default config");
        Config::default()
    })
}

/// Like [`load_config`], but an unreadable or invalid file is an error so the
/// caller can report it once logging is up.
pub fn try_load_config() -> Result<Config, ConfigError> {
    let Some(data_dir) = app_data::app_data_dir() else {
        return Ok(Config::default());
    };
    try_load_config_from(&data_dir.join(CONFIG_FILENAME))
}

/// Load config from an explicit file. Missing file gives the defaults.
pub fn try_load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let s = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(ConfigError::Read(path.to_path_buf(), e)),
    };
    toml::from_str(&s).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

/// Save config to the app data directory.
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    let data_dir = app_data::app_data_dir().ok_or(ConfigError::NoDataDir)?;
    let path = data_dir.join(CONFIG_FILENAME);
    let s = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;
    std::fs::write(&path, s).map_err(ConfigError::Write)
}

/// Get the configured catalog path, if any.
pub fn get_catalog_path() -> Option<PathBuf> {
    load_config()
        .catalog_path
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Set and persist the catalog path.
pub fn set_catalog_path(path: &Path) -> Result<(), ConfigError> {
    let path = path.canonicalize().map_err(ConfigError::Canonicalize)?;
    if !path.is_file() {
        return Err(ConfigError::NotAFile(path));
    }
    let mut config = load_config();
    config.catalog_path = Some(path.to_string_lossy().into_owned());
    save_config(&config)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine app data directory")]
    NoDataDir,
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("invalid config {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("failed to write config: {0}")]
    Write(std::io::Error),
    #[error("failed to resolve path: {0}")]
    Canonicalize(std::io::Error),
    #[error("not a file: {0}")]
    NotAFile(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            catalog_path = "/tmp/products.csv"

            [retrieval]
            distance_filter = "at-most"
            "#,
        )
        .unwrap();
        assert_eq!(config.catalog_path.as_deref(), Some("/tmp/products.csv"));
        assert_eq!(config.retrieval.distance_filter, DistanceFilter::AtMost);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.answer.max_new_tokens, 70);
        assert_eq!(config.index.dimension, 384);
    }

    #[test]
    fn messages_are_their_own_table() {
        let config: Config = toml::from_str(
            r#"
            [answer]
            max_new_tokens = 40

            [messages]
            no_documents = "Nothing matched."
            "#,
        )
        .unwrap();
        assert_eq!(config.answer.max_new_tokens, 40);
        assert_eq!(config.messages.no_documents, "Nothing matched.");
        assert_eq!(
            config.messages.not_relevant,
            MessagesConfig::default().not_relevant
        );
    }

    #[test]
    fn config_survives_toml_round_trip() {
        let config = Config::default();
        let s = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "retrieval = 3\n[[[").unwrap();
        match try_load_config_from(&path) {
            Err(ConfigError::Parse(p, _)) => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = try_load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn distance_filter_directions() {
        assert!(DistanceFilter::AtLeast.accepts(0.5, 0.5));
        assert!(!DistanceFilter::AtLeast.accepts(0.4, 0.5));
        assert!(DistanceFilter::AtMost.accepts(0.4, 0.5));
        assert!(!DistanceFilter::AtMost.accepts(0.6, 0.5));
    }
}
