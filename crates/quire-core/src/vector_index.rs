//! Exact (flat) nearest-neighbour index over embeddings using L2 distance.
//! Entries are addressed by insertion position. No delete or update: rebuild instead.

/// One search hit: the entry's insertion position and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    /// Squared Euclidean distance. Smaller is more similar.
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Append vectors. Either all of them are added or, on a dimension mismatch, none.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), VectorIndexError> {
        if let Some((offset, v)) = vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != self.dimension)
        {
            return Err(VectorIndexError::Dimension {
                position: self.vectors.len() + offset,
                expected: self.dimension,
                actual: v.len(),
            });
        }
        self.vectors.extend(vectors);
        Ok(())
    }

    /// Returns up to `k` nearest entries, closest first. Ties keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, VectorIndexError> {
        if query.len() != self.dimension {
            return Err(VectorIndexError::QueryDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        let mut scored: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, v)| Neighbor {
                position,
                distance: squared_l2(query, v),
            })
            .collect();
        scored.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        scored.truncate(k);
        Ok(scored)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VectorIndexError {
    #[error("vector {position} has dimension {actual}, index expects {expected}")]
    Dimension {
        position: usize,
        expected: usize,
        actual: usize,
    },
    #[error("query has dimension {actual}, index expects {expected}")]
    QueryDimension { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FlatIndex {
        let mut idx = FlatIndex::new(2);
        idx.add(vec![
            vec![0.0, 0.0],
            vec![3.0, 4.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
        ])
        .unwrap();
        idx
    }

    #[test]
    fn search_orders_by_distance_then_position() {
        let hits = index().search(&[0.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 2, 3]);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[1].distance, 1.0);
    }

    #[test]
    fn distance_is_squared_euclidean() {
        let hits = index().search(&[0.0, 0.0], 4).unwrap();
        assert_eq!(hits[3].position, 1);
        assert_eq!(hits[3].distance, 25.0);
    }

    #[test]
    fn k_larger_than_index_returns_everything() {
        assert_eq!(index().search(&[1.0, 1.0], 10).unwrap().len(), 4);
        assert!(FlatIndex::new(2).search(&[1.0, 1.0], 5).unwrap().is_empty());
    }

    #[test]
    fn wrong_dimension_adds_nothing() {
        let mut idx = index();
        let err = idx.add(vec![vec![1.0, 1.0], vec![1.0]]).unwrap_err();
        assert_eq!(
            err,
            VectorIndexError::Dimension {
                position: 5,
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(idx.len(), 4);
        assert!(idx.search(&[1.0], 1).is_err());
    }
}
