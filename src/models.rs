use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for missing categorical metadata
pub const UNKNOWN: &str = "Unknown";

/// One retrieved complaint excerpt.
///
/// `id` is the 1-based rank position within a single retrieval call, not a
/// stable global identifier. `similarity` is derived as `1 - distance` from
/// the index's cosine distance and is a relative ranking score, not a
/// probability. Records are constructed fresh on every retrieval call and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub id: usize,
    pub text: String,
    pub product: String,
    pub category: String,
    pub issue: String,
    pub company: String,
    pub similarity: f32,
}

impl ComplaintRecord {
    /// Synthetic record used when retrieval times out and the pipeline
    /// continues on the degraded path.
    pub fn fallback() -> Self {
        Self {
            id: 1,
            text: "Customer reported issues with financial services.".to_string(),
            product: "General".to_string(),
            category: "General".to_string(),
            issue: "Service issue".to_string(),
            company: UNKNOWN.to_string(),
            similarity: 0.5,
        }
    }

    /// Whether the company field carries real metadata
    pub fn has_known_company(&self) -> bool {
        !self.company.is_empty() && self.company != UNKNOWN
    }
}

/// One question/answer exchange in a session's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}
