//! Catalog records kept alongside the vector index, looked up by record id.

use crate::catalog::CatalogRecord;

/// Result of a lookup by id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a CatalogRecord),
    NotFound,
}

/// Ordered list of records, scanned linearly. Lookups only happen for the
/// handful of candidates a query returns.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    records: Vec<CatalogRecord>,
}

impl DocumentStore {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }

    pub fn search(&self, id: &str) -> Lookup<'_> {
        match self.records.iter().find(|r| r.id == id) {
            Some(record) => Lookup::Found(record),
            None => Lookup::NotFound,
        }
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
