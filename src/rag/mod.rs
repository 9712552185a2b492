//! RAG (Retrieval-Augmented Generation) module
//!
//! End-to-end question answering over the complaint corpus:
//! - Top-k semantic retrieval against the vector index
//! - Prompt assembly from retrieved complaints
//! - Answer synthesis (rule-based or LLM-backed)
//! - Timeout/fallback orchestration
//!
//! # Examples
//!
//! ```rust,no_run
//! use credirag::rag::RagSystem;
//! use credirag::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let rag = RagSystem::new(&config).await?;
//!
//!     let result = rag.answer_question("What are common credit card complaints?").await?;
//!     println!("Answer: {}", result.answer);
//!     println!("Sources: {} complaints", result.sources.len());
//!
//!     Ok(())
//! }
//! ```

pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod synthesizer;

pub use pipeline::RagAnswer;
pub use pipeline::RagSystem;
pub use prompt::PromptComposer;
pub use retriever::Retriever;
pub use synthesizer::AnswerSynthesizer;
pub use synthesizer::LlmSynthesizer;
pub use synthesizer::RuleBasedSynthesizer;
