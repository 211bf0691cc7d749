//! Query-time retrieval: embed the question, take the nearest catalog entries,
//! apply the distance threshold, resolve records, then apply the price ceiling.

use tracing::{debug, warn};

use crate::catalog::CatalogRecord;
use crate::config::RetrievalConfig;
use crate::doc_store::Lookup;
use crate::embedder::{EmbedError, Embedder};
use crate::index::Catalog;
use crate::vector_index::VectorIndexError;

/// A retrieved record and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit<'a> {
    pub record: &'a CatalogRecord,
    pub distance: f32,
}

/// Records that survived every filter, closest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieval<'a> {
    pub hits: Vec<Hit<'a>>,
    /// Candidates that matched semantically but cost more than the ceiling.
    pub price_rejected: usize,
}

impl Retrieval<'_> {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn records(&self) -> Vec<&CatalogRecord> {
        self.hits.iter().map(|h| h.record).collect()
    }
}

/// 1. Embed the query text
/// 2. Search the index for the `top_k` nearest entries
/// 3. Keep the ones the distance filter accepts, resolve them, apply the ceiling
pub async fn retrieve<'c>(
    query: &str,
    catalog: &'c Catalog,
    embedder: &dyn Embedder,
    config: &RetrievalConfig,
    ceiling: Option<u64>,
) -> Result<Retrieval<'c>, RetrieveError> {
    let query_embedding = embedder.embed(query).await?;
    let neighbors = catalog.index().search(&query_embedding, config.top_k)?;
    debug!(candidates = neighbors.len(), "nearest neighbours");

    let mut hits = Vec::with_capacity(neighbors.len());
    for n in neighbors {
        if !config
            .distance_filter
            .accepts(n.distance, config.similarity_threshold)
        {
            continue;
        }
        let Some(id) = catalog.id_at(n.position) else {
            warn!(position = n.position, "index position has no record id, skipping");
            continue;
        };
        match catalog.store().search(id) {
            Lookup::Found(record) => hits.push(Hit {
                record,
                distance: n.distance,
            }),
            Lookup::NotFound => warn!(%id, "record missing from document store, skipping"),
        }
    }

    let before = hits.len();
    let hits = match ceiling {
        Some(ceiling) => filter_by_price(hits, ceiling),
        None => hits,
    };
    let price_rejected = before - hits.len();
    debug!(kept = hits.len(), price_rejected, "retrieval done");
    Ok(Retrieval {
        hits,
        price_rejected,
    })
}

/// Drops hits priced above `ceiling`. Order is preserved.
pub fn filter_by_price(hits: Vec<Hit<'_>>, ceiling: u64) -> Vec<Hit<'_>> {
    let ceiling = ceiling as f64;
    hits.into_iter()
        .filter(|h| h.record.price <= ceiling)
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum RetrieveError {
    #[error("embedding error: {0}")]
    Embed(#[from] EmbedError),
    #[error("search error: {0}")]
    Index(#[from] VectorIndexError),
}
