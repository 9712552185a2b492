//! Top-k complaint retrieval against the vector index

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::embeddings::Embedder;
use crate::errors::CrediRagError;
use crate::errors::Result;
use crate::models::ComplaintRecord;
use crate::models::UNKNOWN;
use crate::vector_store::IndexHit;
use crate::vector_store::VectorIndex;

/// Retriever for complaint excerpts
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    /// Retrieve up to `k` complaints relevant to a question, most similar
    /// first. An empty index yields an empty list, not an error.
    ///
    /// # Errors
    /// - `Validation` when the question is empty after trimming or `k == 0`
    /// - `Embedding` when query embedding fails
    /// - `IndexUnavailable` when the index query fails
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<ComplaintRecord>> {
        let question = question.trim();
        if question.is_empty() {
            return Err(CrediRagError::Validation(
                "Question cannot be empty".to_string(),
            ));
        }
        if k == 0 {
            return Err(CrediRagError::Validation(
                "k must be at least 1".to_string(),
            ));
        }

        debug!("Searching for: '{}'", question);

        let embedding = self.embedder.embed(question).await?;
        let hits = self.index.query(&embedding, k).await?;

        let complaints: Vec<ComplaintRecord> = hits
            .into_iter()
            .enumerate()
            .map(|(i, hit)| to_record(i + 1, hit))
            .collect();

        debug!("Found {} relevant complaints", complaints.len());

        Ok(complaints)
    }

    /// Retrieve under a bounded execution budget.
    ///
    /// The budget is enforced with a cancellable future, so work abandoned
    /// at the deadline actually stops.
    ///
    /// # Errors
    /// - `RetrievalTimeout` when the budget elapses before completion
    /// - Everything [`Retriever::retrieve`] can fail with
    pub async fn retrieve_within(
        &self,
        question: &str,
        k: usize,
        budget: Duration,
    ) -> Result<Vec<ComplaintRecord>> {
        match tokio::time::timeout(budget, self.retrieve(question, k)).await {
            Ok(result) => result,
            Err(_) => Err(CrediRagError::RetrievalTimeout(budget.as_secs())),
        }
    }

    /// Retrieve with graceful degradation: a timed-out retrieval yields a
    /// single synthetic fallback record, any other failure yields an empty
    /// list. Never errors.
    pub async fn safe_retrieve(
        &self,
        question: &str,
        k: usize,
        budget: Duration,
    ) -> Vec<ComplaintRecord> {
        match self.retrieve_within(question, k, budget).await {
            Ok(complaints) => complaints,
            Err(e @ CrediRagError::RetrievalTimeout(_)) => {
                warn!("{}; using fallback complaint", e);
                vec![ComplaintRecord::fallback()]
            }
            Err(e) => {
                error!("Retrieval failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Document count of the backing index
    pub async fn index_count(&self) -> Result<u64> {
        self.index.count().await
    }
}

/// Map a raw index hit to a complaint record at the given 1-based rank
fn to_record(rank: usize, hit: IndexHit) -> ComplaintRecord {
    let meta = |key: &str| {
        hit.metadata
            .get(key)
            .cloned()
            .unwrap_or_else(|| UNKNOWN.to_string())
    };

    ComplaintRecord {
        id: rank,
        product: meta("product"),
        category: meta("product_category"),
        issue: meta("issue"),
        company: meta("company"),
        similarity: 1.0 - hit.distance,
        text: hit.document,
    }
}
