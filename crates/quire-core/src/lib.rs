//! All backend logic independent of how questions arrive (CLI or any other front-end).
//!
//! The catalog CSV lives wherever the crawler wrote it. Quire stores only its
//! config in its own app data directory (see [app_data]); the vector index is
//! rebuilt in memory on every start.

pub mod answer;
pub mod app_data;
pub mod catalog;
pub mod config;
pub mod doc_store;
pub mod embedder;
pub mod index;
pub mod logging;
pub mod ollama;
pub mod pipeline;
pub mod query;
pub mod retriever;
pub mod vector_index;

#[cfg(test)]
mod testing;

pub use answer::{format_output, shorten_input, Synthesis, Synthesizer};
pub use app_data::app_data_dir;
pub use catalog::{read_catalog, CatalogError, CatalogRecord};
pub use config::{
    get_catalog_path, load_config, save_config, set_catalog_path, try_load_config,
    try_load_config_from, Config, ConfigError, DistanceFilter,
};
pub use doc_store::{DocumentStore, Lookup};
pub use embedder::{EmbedError, Embedder, GenerateError, GenerationRequest, Generator};
pub use index::{build_catalog, build_index, BuildError, BuildStats, Catalog};
pub use logging::{init_logging, LogError};
pub use ollama::{OllamaClient, OllamaError};
pub use pipeline::{Assistant, EmptyReason, Outcome, PipelineError};
pub use query::{QueryAnalyzer, QueryConfigError};
pub use retriever::{retrieve, Hit, Retrieval, RetrieveError};
pub use vector_index::{FlatIndex, Neighbor, VectorIndexError};

/// Returns a short status string. Used to verify the backend is wired up.
pub fn status() -> &'static str {
    "quire-core ready"
}
