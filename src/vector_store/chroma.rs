//! Chroma HTTP client for the pre-built complaint collection

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing::info;

use crate::errors::CrediRagError;
use crate::errors::Result;
use crate::vector_store::IndexHit;
use crate::vector_store::VectorIndex;

/// Client for a Chroma collection over its REST API
pub struct ChromaIndex {
    endpoint: String,
    collection_id: String,
    client: Client,
}

#[derive(Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query_embeddings: Vec<&'a [f32]>,
    n_results: usize,
    include: [&'a str; 3],
}

#[derive(Deserialize)]
struct QueryResponse {
    documents: Option<Vec<Vec<String>>>,
    metadatas: Option<Vec<Vec<HashMap<String, Value>>>>,
    distances: Option<Vec<Vec<f32>>>,
}

impl ChromaIndex {
    /// Connect to a Chroma server and resolve the collection by name
    ///
    /// # Errors
    /// - HTTP client build errors
    /// - Collection lookup failures (server unreachable, unknown collection)
    pub async fn connect(
        endpoint: &str,
        collection: &str,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| CrediRagError::Http(e.to_string()))?;

        let url = format!("{endpoint}/api/v1/collections/{collection}");
        debug!("Resolving Chroma collection: {}", url);

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| CrediRagError::IndexUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(CrediRagError::IndexUnavailable(format!(
                "Collection '{collection}' lookup failed ({status})"
            )));
        }

        let info: CollectionInfo = response
            .json()
            .await
            .map_err(|e| CrediRagError::IndexUnavailable(format!("Bad collection info: {e}")))?;

        let index = Self {
            endpoint: endpoint.to_string(),
            collection_id: info.id,
            client,
        };

        info!(
            "Connected to complaint index '{}' with {} chunks",
            collection,
            index.count().await?
        );

        Ok(index)
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!(
            "{}/api/v1/collections/{}/{suffix}",
            self.endpoint, self.collection_id
        )
    }
}

#[async_trait]
impl VectorIndex for ChromaIndex {
    async fn query(&self, embedding: &[f32], n_results: usize) -> Result<Vec<IndexHit>> {
        let request = QueryRequest {
            query_embeddings: vec![embedding],
            n_results,
            include: ["documents", "metadatas", "distances"],
        };

        let response = self
            .client
            .post(self.collection_url("query"))
            .json(&request)
            .send()
            .await
            .map_err(|e| CrediRagError::IndexUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CrediRagError::IndexUnavailable(format!(
                "Index query failed ({status}): {error_text}"
            )));
        }

        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| CrediRagError::IndexUnavailable(format!("Bad query response: {e}")))?;

        // Chroma nests results one level per query embedding; we always send one
        let documents = result
            .documents
            .and_then(|mut d| (!d.is_empty()).then(|| d.remove(0)))
            .unwrap_or_default();
        let metadatas = result
            .metadatas
            .and_then(|mut m| (!m.is_empty()).then(|| m.remove(0)))
            .unwrap_or_default();
        let distances = result
            .distances
            .and_then(|mut d| (!d.is_empty()).then(|| d.remove(0)))
            .unwrap_or_default();

        let hits = documents
            .into_iter()
            .enumerate()
            .map(|(i, document)| IndexHit {
                document,
                metadata: metadatas
                    .get(i)
                    .map(|m| m.iter().map(|(k, v)| (k.clone(), stringify(v))).collect())
                    .unwrap_or_default(),
                distance: distances.get(i).copied().unwrap_or(1.0),
            })
            .collect();

        Ok(hits)
    }

    async fn count(&self) -> Result<u64> {
        let response = self
            .client
            .get(self.collection_url("count"))
            .send()
            .await
            .map_err(|e| CrediRagError::IndexUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(CrediRagError::IndexUnavailable(format!(
                "Index count failed ({status})"
            )));
        }

        response
            .json::<u64>()
            .await
            .map_err(|e| CrediRagError::IndexUnavailable(format!("Bad count response: {e}")))
    }
}

/// Chroma metadata values are scalar JSON; flatten them to strings
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stringify_scalars() {
        assert_eq!(stringify(&Value::String("Credit card".into())), "Credit card");
        assert_eq!(stringify(&serde_json::json!(42)), "42");
        assert_eq!(stringify(&serde_json::json!(true)), "true");
    }
}
