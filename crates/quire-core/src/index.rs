//! Index pipeline: read → dedup → normalize price → embed → commit.
//! Builds the vector index and the document store together, in lockstep.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{
    dedup_rows, normalize_price, read_catalog, CatalogError, CatalogRecord, PriceError, RawRow,
};
use crate::doc_store::DocumentStore;
use crate::embedder::{EmbedError, Embedder};
use crate::vector_index::{FlatIndex, VectorIndexError};

/// Texts sent to the embedder per request.
pub const EMBED_BATCH_SIZE: usize = 64;

/// Counts reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub rows_read: usize,
    pub duplicates_dropped: usize,
    pub missing_description: usize,
    pub indexed: usize,
}

/// The searchable catalog: vector index plus document store, joined by record id.
/// Read-only once built; a rebuild produces a new value.
#[derive(Debug, Clone)]
pub struct Catalog {
    index: FlatIndex,
    store: DocumentStore,
    /// Record id for each index position.
    ids: Vec<String>,
    stats: BuildStats,
}

impl Catalog {
    /// A catalog with nothing indexed. Every search comes back empty.
    pub fn empty(dimension: usize) -> Self {
        Self {
            index: FlatIndex::new(dimension),
            store: DocumentStore::default(),
            ids: Vec::new(),
            stats: BuildStats::default(),
        }
    }

    /// Assembles a catalog without the lockstep checks a build enforces.
    #[cfg(test)]
    pub(crate) fn from_parts(index: FlatIndex, store: DocumentStore, ids: Vec<String>) -> Self {
        Self {
            index,
            store,
            ids,
            stats: BuildStats::default(),
        }
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Record id stored at an index position.
    pub fn id_at(&self, position: usize) -> Option<&str> {
        self.ids.get(position).map(String::as_str)
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Runs the full pipeline on a catalog file.
pub async fn build_index(
    path: &Path,
    embedder: &dyn Embedder,
    dimension: usize,
) -> Result<Catalog, BuildError> {
    let rows = read_catalog(path)?;
    info!(path = %path.display(), rows = rows.len(), "read catalog");
    build_catalog(rows, embedder, dimension).await
}

/// Builds a catalog from already-read rows. Nothing is returned unless every
/// step succeeds.
pub async fn build_catalog(
    rows: Vec<RawRow>,
    embedder: &dyn Embedder,
    dimension: usize,
) -> Result<Catalog, BuildError> {
    let rows_read = rows.len();
    let rows = dedup_rows(rows);
    let duplicates_dropped = rows_read - rows.len();

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let price = normalize_price(&row.price).map_err(|source| BuildError::Price {
            row: row.row,
            name: row.name.clone(),
            source,
        })?;
        records.push(CatalogRecord {
            id: row.row.to_string(),
            name: row.name,
            price,
            description: row.description,
            category: row.category,
        });
    }

    let mut metadata = Vec::with_capacity(records.len());
    let mut texts = Vec::with_capacity(records.len());
    let mut missing_description = 0;
    for record in records {
        if record.description.trim().is_empty() {
            warn!(id = %record.id, name = %record.name, "description missing, skipping");
            missing_description += 1;
            continue;
        }
        texts.push(composite_text(&record));
        metadata.push(record);
    }

    let mut embeddings = Vec::with_capacity(texts.len());
    for (i, batch) in texts.chunks(EMBED_BATCH_SIZE).enumerate() {
        debug!(batch = i, size = batch.len(), "embedding batch");
        embeddings.extend(embedder.embed_batch(batch).await?);
    }

    if embeddings.len() != metadata.len() {
        return Err(BuildError::LengthMismatch {
            embeddings: embeddings.len(),
            records: metadata.len(),
        });
    }

    let mut index = FlatIndex::new(dimension);
    index.add(embeddings)?;
    let ids = metadata.iter().map(|r| r.id.clone()).collect();
    let stats = BuildStats {
        rows_read,
        duplicates_dropped,
        missing_description,
        indexed: metadata.len(),
    };
    info!(
        indexed = stats.indexed,
        duplicates = stats.duplicates_dropped,
        missing_description = stats.missing_description,
        "catalog index built"
    );
    Ok(Catalog {
        index,
        store: DocumentStore::new(metadata),
        ids,
        stats,
    })
}

/// Text embedded for a record: name, category, description and price.
pub fn composite_text(record: &CatalogRecord) -> String {
    format!(
        "{} {} {} {}",
        record.name,
        record.category,
        record.description,
        record.price_label()
    )
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("row {row} ({name}): {source}")]
    Price {
        row: usize,
        name: String,
        #[source]
        source: PriceError,
    },
    #[error("embedding error: {0}")]
    Embed(#[from] EmbedError),
    #[error("got {embeddings} embeddings for {records} records")]
    LengthMismatch { embeddings: usize, records: usize },
    #[error("index error: {0}")]
    Index(#[from] VectorIndexError),
}
