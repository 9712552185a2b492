//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::models::ComplaintRecord;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Ask request
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Ask response: the analysis plus its sources and the session to continue on
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub sources: Vec<SourceResponse>,
    pub session_id: String,
}

/// One retrieval source; the excerpt text stays server-side
#[derive(Debug, Serialize)]
pub struct SourceResponse {
    pub product: String,
    pub company: String,
    pub issue: String,
    pub similarity: f32,
}

impl From<&ComplaintRecord> for SourceResponse {
    fn from(record: &ComplaintRecord) -> Self {
        Self {
            product: record.product.clone(),
            company: record.company.clone(),
            issue: record.issue.clone(),
            similarity: record.similarity,
        }
    }
}

/// Simple probe response
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: String,
}
