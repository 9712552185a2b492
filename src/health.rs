//! Health checks for monitoring

use std::sync::Arc;
use std::time::Instant;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::rag::RagSystem;

/// Overall system status with per-component detail
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub components: Components,
}

#[derive(Debug, Serialize)]
pub struct Components {
    pub vector_store: ComponentHealth,
    pub retrieval: ComponentHealth,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    fn healthy(document_count: Option<u64>) -> Self {
        Self {
            status: "healthy".to_string(),
            document_count,
            error: None,
        }
    }

    fn unhealthy(error: String) -> Self {
        Self {
            status: "unhealthy".to_string(),
            document_count: None,
            error: Some(error),
        }
    }
}

/// System health checker over the RAG pipeline
pub struct HealthChecker {
    rag: Arc<RagSystem>,
    started_at: Instant,
}

impl HealthChecker {
    pub fn new(rag: Arc<RagSystem>) -> Self {
        Self {
            rag,
            started_at: Instant::now(),
        }
    }

    /// Comprehensive status: index reachability plus a one-result smoke
    /// retrieval. Any failing component degrades the overall status.
    pub async fn status(&self) -> HealthStatus {
        let mut overall = "healthy";

        let vector_store = match self.rag.index_count().await {
            Ok(count) => ComponentHealth::healthy(Some(count)),
            Err(e) => {
                warn!("Vector store health check failed: {}", e);
                overall = "degraded";
                ComponentHealth::unhealthy(e.to_string())
            }
        };

        let retrieval = match self.rag.retriever().retrieve("test", 1).await {
            Ok(_) => ComponentHealth::healthy(None),
            Err(e) => {
                warn!("Retrieval health check failed: {}", e);
                overall = "degraded";
                ComponentHealth::unhealthy(e.to_string())
            }
        };

        HealthStatus {
            status: overall.to_string(),
            timestamp: Utc::now(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
            components: Components {
                vector_store,
                retrieval,
            },
        }
    }

    /// Ready to serve: the index answers a count probe
    pub async fn readiness(&self) -> bool {
        self.rag.index_count().await.is_ok()
    }

    /// Process is alive
    pub fn liveness(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::config::AppConfig;
    use crate::embeddings::Embedder;
    use crate::errors::CrediRagError;
    use crate::errors::Result;
    use crate::rag::PromptComposer;
    use crate::rag::Retriever;
    use crate::rag::RuleBasedSynthesizer;
    use crate::vector_store::IndexHit;
    use crate::vector_store::InMemoryIndex;
    use crate::vector_store::VectorIndex;

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct BrokenIndex;

    #[async_trait]
    impl VectorIndex for BrokenIndex {
        async fn query(&self, _embedding: &[f32], _n: usize) -> Result<Vec<IndexHit>> {
            Err(CrediRagError::IndexUnavailable("down".into()))
        }

        async fn count(&self) -> Result<u64> {
            Err(CrediRagError::IndexUnavailable("down".into()))
        }
    }

    fn checker_with_index(index: Arc<dyn VectorIndex>) -> HealthChecker {
        let rag = RagSystem::from_components(
            Retriever::new(index, Arc::new(StubEmbedder)),
            PromptComposer::default(),
            Arc::new(RuleBasedSynthesizer::new()),
            &AppConfig::default(),
        );
        HealthChecker::new(Arc::new(rag))
    }

    #[tokio::test]
    async fn test_healthy_with_reachable_index() {
        let mut index = InMemoryIndex::new();
        index.add("doc", std::collections::HashMap::new(), vec![1.0, 0.0]);

        let checker = checker_with_index(Arc::new(index));
        let status = checker.status().await;
        assert_eq!(status.status, "healthy");
        assert_eq!(status.components.vector_store.document_count, Some(1));
        assert!(checker.readiness().await);
        assert!(checker.liveness());
    }

    #[tokio::test]
    async fn test_degraded_with_broken_index() {
        let checker = checker_with_index(Arc::new(BrokenIndex));
        let status = checker.status().await;
        assert_eq!(status.status, "degraded");
        assert_eq!(status.components.vector_store.status, "unhealthy");
        assert!(!checker.readiness().await);
        assert!(checker.liveness());
    }
}
