//! Brute-force in-memory index for demos and tests

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::CrediRagError;
use crate::errors::Result;
use crate::vector_store::IndexHit;
use crate::vector_store::VectorIndex;

struct StoredChunk {
    document: String,
    metadata: HashMap<String, String>,
    embedding: Vec<f32>,
}

/// In-memory cosine-distance index over a fixed set of complaint chunks.
///
/// Query cost is linear in the corpus size; intended for small corpora,
/// smoke tests, and offline demos, not production retrieval.
#[derive(Default)]
pub struct InMemoryIndex {
    chunks: Vec<StoredChunk>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one document chunk with its embedding and metadata
    pub fn add(
        &mut self,
        document: impl Into<String>,
        metadata: HashMap<String, String>,
        embedding: Vec<f32>,
    ) {
        self.chunks.push(StoredChunk {
            document: document.into(),
            metadata,
            embedding,
        });
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn query(&self, embedding: &[f32], n_results: usize) -> Result<Vec<IndexHit>> {
        if embedding.is_empty() {
            return Err(CrediRagError::Embedding(
                "Empty query embedding".to_string(),
            ));
        }

        let mut hits: Vec<IndexHit> = self
            .chunks
            .iter()
            .map(|chunk| IndexHit {
                document: chunk.document.clone(),
                metadata: chunk.metadata.clone(),
                distance: cosine_distance(embedding, &chunk.embedding),
            })
            .collect();

        // Ascending distance = most similar first; ties keep insertion order
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(n_results);

        Ok(hits)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.chunks.len() as u64)
    }
}

/// Cosine distance `1 - cos(a, b)`; orthogonal or degenerate vectors get
/// the maximum distance of 1.0
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 1.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x64 = f64::from(x);
        let y64 = f64::from(y);
        dot += x64 * y64;
        norm_a += x64 * x64;
        norm_b += y64 * y64;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return 1.0;
    }

    (1.0 - dot / denom) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(product: &str) -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("product".to_string(), product.to_string());
        m
    }

    #[tokio::test]
    async fn test_query_orders_by_distance() {
        let mut index = InMemoryIndex::new();
        index.add("far", meta("a"), vec![0.0, 1.0]);
        index.add("near", meta("b"), vec![1.0, 0.1]);

        let hits = index.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document, "near");
        assert!(hits[0].distance < hits[1].distance);
    }

    #[tokio::test]
    async fn test_query_respects_n_results() {
        let mut index = InMemoryIndex::new();
        for i in 0..5 {
            index.add(format!("doc{i}"), HashMap::new(), vec![1.0, i as f32]);
        }

        let hits = index.query(&[1.0, 0.0], 3).await.unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_index_returns_no_hits() {
        let index = InMemoryIndex::new();
        let hits = index.query(&[1.0, 0.0], 3).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(index.count().await.unwrap(), 0);
    }

    #[test]
    fn test_cosine_distance_bounds() {
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]) < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_distance(&[0.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
