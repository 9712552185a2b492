//! Complete RAG pipeline: Validate -> Retrieve -> Compose -> Synthesize

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::info;

use crate::config::AppConfig;
use crate::embeddings::EmbeddingClient;
use crate::embeddings::EmbeddingConfig;
use crate::errors::CrediRagError;
use crate::errors::Result;
use crate::models::ComplaintRecord;
use crate::rag::AnswerSynthesizer;
use crate::rag::LlmSynthesizer;
use crate::rag::PromptComposer;
use crate::rag::Retriever;
use crate::rag::RuleBasedSynthesizer;
use crate::validation;
use crate::vector_store::ChromaIndex;

/// Complete RAG service for complaint analysis
pub struct RagSystem {
    retriever: Retriever,
    composer: PromptComposer,
    synthesizer: Arc<dyn AnswerSynthesizer>,
    default_k: usize,
    retrieval_timeout: Duration,
    pipeline_timeout: Duration,
}

impl RagSystem {
    /// Create a new RAG system from configuration
    ///
    /// # Errors
    /// - Vector index connection errors (server unreachable, unknown collection)
    /// - Embedding client configuration errors
    /// - LLM synthesizer configuration errors (when an `[llm]` section is set)
    pub async fn new(config: &AppConfig) -> Result<Self> {
        info!("Initializing RAG system...");

        let index = Arc::new(
            ChromaIndex::connect(
                config.vector_store_endpoint(),
                config.vector_store_collection(),
                Duration::from_secs(config.vector_store.connect_timeout_secs),
            )
            .await?,
        );
        let embedder = Arc::new(EmbeddingClient::new(EmbeddingConfig::from_app_config(
            config,
        ))?);

        let synthesizer: Arc<dyn AnswerSynthesizer> = match &config.llm {
            Some(llm) => Arc::new(LlmSynthesizer::new(llm.clone())?),
            None => Arc::new(RuleBasedSynthesizer::new()),
        };

        Ok(Self {
            retriever: Retriever::new(index, embedder),
            composer: PromptComposer::new(config.excerpt_chars()),
            synthesizer,
            default_k: config.retrieval_k(),
            retrieval_timeout: config.retrieval_timeout(),
            pipeline_timeout: config.pipeline_timeout(),
        })
    }

    /// Create from existing components; used when the index, embedder, or
    /// synthesizer are built elsewhere
    pub fn from_components(
        retriever: Retriever,
        composer: PromptComposer,
        synthesizer: Arc<dyn AnswerSynthesizer>,
        config: &AppConfig,
    ) -> Self {
        Self {
            retriever,
            composer,
            synthesizer,
            default_k: config.retrieval_k(),
            retrieval_timeout: config.retrieval_timeout(),
            pipeline_timeout: config.pipeline_timeout(),
        }
    }

    /// Answer one question against the complaint corpus.
    ///
    /// Retrieval failures are absorbed: a timed-out retrieval degrades to a
    /// single fallback record and any other retrieval error degrades to an
    /// empty record list, in both cases continuing to synthesis. The whole
    /// call runs under the end-to-end budget as a backstop against a hung
    /// synthesizer; exceeding it fails the request.
    ///
    /// # Errors
    /// - `Validation` when the question is empty after sanitization
    /// - `PipelineTimeout` when the end-to-end budget is exceeded
    /// - Synthesizer backend errors (LLM-backed deployments only)
    pub async fn answer_question(&self, question: &str) -> Result<RagAnswer> {
        let question = validation::validate_question(question)?;
        info!("QUESTION: {}", question);

        let pipeline = async {
            debug!("Step 1: Retrieving complaints");
            let sources = self
                .retriever
                .safe_retrieve(&question, self.default_k, self.retrieval_timeout)
                .await;

            debug!("Step 2: Composing prompt from {} complaints", sources.len());
            let prompt = self.composer.compose(&question, &sources);

            debug!("Step 3: Generating analysis");
            let answer = self.synthesizer.synthesize(&prompt, &sources).await?;

            Ok::<_, CrediRagError>(RagAnswer {
                question: question.clone(),
                answer,
                sources,
            })
        };

        match tokio::time::timeout(self.pipeline_timeout, pipeline).await {
            Ok(result) => {
                if result.is_ok() {
                    info!("RAG query completed");
                }
                result
            }
            Err(_) => Err(CrediRagError::PipelineTimeout(
                self.pipeline_timeout.as_secs(),
            )),
        }
    }

    /// Get retriever reference
    pub const fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Document count of the backing index, for health probes
    pub async fn index_count(&self) -> Result<u64> {
        self.retriever.index_count().await
    }
}

/// Result of one answered question
#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<ComplaintRecord>,
}

impl RagAnswer {
    /// Get a formatted string representation for CLI output
    pub fn format(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Question: {}\n\n", self.question));
        output.push_str(&format!("Answer:\n{}\n", self.answer));

        if !self.sources.is_empty() {
            output.push_str(&format!("\nSources ({} complaints):\n", self.sources.len()));
            for source in &self.sources {
                let preview: String = source.text.chars().take(80).collect();
                output.push_str(&format!(
                    "  {}. [{}] {} - Similarity: {:.2}\n     {}...\n",
                    source.id, source.product, source.company, source.similarity, preview
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::embeddings::Embedder;
    use crate::vector_store::IndexHit;
    use crate::vector_store::InMemoryIndex;
    use crate::vector_store::VectorIndex;

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = [0.0f32; 8];
            for (i, c) in text.chars().enumerate() {
                v[i % 8] += (c as u32 % 97) as f32;
            }
            Ok(v.to_vec())
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    struct StalledIndex;

    #[async_trait]
    impl VectorIndex for StalledIndex {
        async fn query(&self, _embedding: &[f32], _n: usize) -> Result<Vec<IndexHit>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }

        async fn count(&self) -> Result<u64> {
            Ok(1)
        }
    }

    /// Synthesizer that never returns, to exercise the outer backstop
    struct HungSynthesizer;

    #[async_trait]
    impl AnswerSynthesizer for HungSynthesizer {
        async fn synthesize(&self, _prompt: &str, _records: &[ComplaintRecord]) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    fn seeded_index() -> InMemoryIndex {
        let mut index = InMemoryIndex::new();
        for (text, product, company) in [
            ("Unauthorized credit card charges after fraud", "Credit card", "Citibank"),
            ("Money transfer confirmed but never completed", "Money transfer", "Wells Fargo"),
            ("Checking account charged unexplained fees", "Checking account", "Bank of America"),
            ("Credit card rewards transfer stuck for weeks", "Credit card", "Citibank"),
        ] {
            let mut meta = HashMap::new();
            meta.insert("product".to_string(), product.to_string());
            meta.insert("product_category".to_string(), product.to_string());
            meta.insert("issue".to_string(), "Service issue".to_string());
            meta.insert("company".to_string(), company.to_string());

            // Embed synchronously through the stub's deterministic math
            let mut v = [0.0f32; 8];
            for (i, c) in text.chars().enumerate() {
                v[i % 8] += (c as u32 % 97) as f32;
            }
            index.add(text, meta, v.to_vec());
        }
        index
    }

    fn test_config() -> AppConfig {
        AppConfig::default()
    }

    fn system_with_index(index: Arc<dyn VectorIndex>) -> RagSystem {
        RagSystem::from_components(
            Retriever::new(index, Arc::new(StubEmbedder)),
            PromptComposer::default(),
            Arc::new(RuleBasedSynthesizer::new()),
            &test_config(),
        )
    }

    #[tokio::test]
    async fn test_answer_question_end_to_end() {
        let rag = system_with_index(Arc::new(seeded_index()));
        let result = rag
            .answer_question("What are the most common credit card complaints?")
            .await
            .unwrap();

        assert!(!result.answer.is_empty());
        assert!(result.sources.len() <= 3);
        for source in &result.sources {
            assert!(source.similarity.is_finite());
        }
    }

    #[tokio::test]
    async fn test_empty_question_fails_validation() {
        let rag = system_with_index(Arc::new(seeded_index()));
        assert!(matches!(
            rag.answer_question("   ").await,
            Err(CrediRagError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_retrieval_timeout_degrades_to_fallback() {
        let mut config = test_config();
        config.retrieval.retrieval_timeout_secs = 0;

        let rag = RagSystem::from_components(
            Retriever::new(Arc::new(StalledIndex), Arc::new(StubEmbedder)),
            PromptComposer::default(),
            Arc::new(RuleBasedSynthesizer::new()),
            &config,
        );

        let result = rag.answer_question("any question at all").await.unwrap();
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].product, "General");
        assert!(!result.answer.is_empty());
    }

    #[tokio::test]
    async fn test_hung_synthesizer_hits_pipeline_timeout() {
        let mut config = test_config();
        config.retrieval.pipeline_timeout_secs = 1;

        let rag = RagSystem::from_components(
            Retriever::new(Arc::new(seeded_index()), Arc::new(StubEmbedder)),
            PromptComposer::default(),
            Arc::new(HungSynthesizer),
            &config,
        );

        assert!(matches!(
            rag.answer_question("credit card fraud").await,
            Err(CrediRagError::PipelineTimeout(_))
        ));
    }

    #[tokio::test]
    async fn test_idempotent_products_and_companies() {
        let rag = system_with_index(Arc::new(seeded_index()));
        let question = "credit card complaints";

        let first = rag.answer_question(question).await.unwrap();
        let second = rag.answer_question(question).await.unwrap();

        let sets = |answer: &RagAnswer| {
            answer
                .sources
                .iter()
                .map(|s| (s.product.clone(), s.company.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(sets(&first), sets(&second));
    }

    #[tokio::test]
    async fn test_format_lists_sources() {
        let rag = system_with_index(Arc::new(seeded_index()));
        let result = rag.answer_question("credit card fraud").await.unwrap();
        let formatted = result.format();
        assert!(formatted.contains("Answer:"));
        assert!(formatted.contains("Sources"));
    }
}
