//! Catalog records as read from the crawler's CSV, plus the cleanup applied before indexing.
//!
//! Only `name`, `price`, `description` and `category` are read; any other
//! columns (`stock`, `url`, ...) are ignored.

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One catalog item after cleanup. `id` is assigned by the index builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRecord {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: String,
}

impl CatalogRecord {
    /// Price as shown to embedders and in answers: `20.0`, `51.77`.
    pub fn price_label(&self) -> String {
        if self.price.fract() == 0.0 {
            format!("{:.1}", self.price)
        } else {
            self.price.to_string()
        }
    }
}

/// A row as it appears in the catalog file. Price is still raw text (e.g. `£51.77`).
#[derive(Debug, Clone, Deserialize)]
pub struct RawRow {
    /// 0-based data row number in the source file.
    #[serde(skip)]
    pub row: usize,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

/// Reads every data row of a catalog CSV file.
pub fn read_catalog(path: &Path) -> Result<Vec<RawRow>, CatalogError> {
    let file =
        std::fs::File::open(path).map_err(|e| CatalogError::Open(path.to_path_buf(), e))?;
    read_rows(file)
}

/// Reads catalog rows from any CSV source with a header line.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, CatalogError> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let mut rows = Vec::new();
    for (i, result) in csv.deserialize::<RawRow>().enumerate() {
        let mut row = result.map_err(|source| CatalogError::Row { row: i, source })?;
        row.row = i;
        rows.push(row);
    }
    Ok(rows)
}

/// Drops rows whose `(name, description)` pair already appeared. First occurrence wins.
pub fn dedup_rows(rows: Vec<RawRow>) -> Vec<RawRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|r| seen.insert((r.name.clone(), r.description.clone())))
        .collect()
}

/// Strips everything but digits and `.` then parses. `£51.77` → `51.77`.
pub fn normalize_price(raw: &str) -> Result<f64, PriceError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(PriceError {
            raw: raw.to_string(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unparseable price {raw:?}")]
pub struct PriceError {
    pub raw: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to open catalog {0}: {1}")]
    Open(PathBuf, std::io::Error),
    #[error("malformed catalog row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
name,price,description,category,stock,url
Sapiens,£54.23,A brief history of humankind,History,In stock,http://x/1
Dune,£20.00,Desert planet,Fiction,In stock,http://x/2
Sapiens,£60.00,A brief history of humankind,History,In stock,http://x/3
Sapiens,£54.23,Another edition,History,In stock,http://x/4
";

    #[test]
    fn reads_used_columns_and_ignores_the_rest() {
        let rows = read_rows(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].name, "Dune");
        assert_eq!(rows[1].price, "£20.00");
        assert_eq!(rows[1].category, "Fiction");
        assert_eq!(rows[3].row, 3);
    }

    #[test]
    fn dedup_keeps_first_of_each_name_description_pair() {
        let rows = dedup_rows(read_rows(SAMPLE.as_bytes()).unwrap());
        let kept: Vec<usize> = rows.iter().map(|r| r.row).collect();
        assert_eq!(kept, vec![0, 1, 3]);
        assert_eq!(rows[0].price, "£54.23");
    }

    #[test]
    fn missing_optional_columns_default_to_empty() {
        let rows = read_rows("name,price\nDune,3\n".as_bytes()).unwrap();
        assert_eq!(rows[0].description, "");
        assert_eq!(rows[0].category, "");
    }

    #[test]
    fn price_label_keeps_a_decimal() {
        let mut record = CatalogRecord {
            id: "0".to_string(),
            name: "Dune".to_string(),
            price: 20.0,
            description: String::new(),
            category: String::new(),
        };
        assert_eq!(record.price_label(), "20.0");
        record.price = 51.77;
        assert_eq!(record.price_label(), "51.77");
    }

    #[test]
    fn normalize_price_strips_currency() {
        assert_eq!(normalize_price("£51.77").unwrap(), 51.77);
        assert_eq!(normalize_price("$ 1,200").unwrap(), 1200.0);
        assert_eq!(normalize_price("12").unwrap(), 12.0);
    }

    #[test]
    fn normalize_price_rejects_garbage() {
        assert!(normalize_price("free").is_err());
        assert!(normalize_price("").is_err());
        assert!(normalize_price("1.2.3").is_err());
        assert_eq!(normalize_price("n/a").unwrap_err().raw, "n/a");
    }
}
