//! Query embedding module
//!
//! Maps question text to fixed-dimension vectors using the same model that
//! was used to build the complaint index. Supports OpenAI-compatible and
//! Ollama embedding endpoints.
//!
//! # Examples
//!
//! ```rust,no_run
//! use credirag::embeddings::{EmbeddingClient, EmbeddingConfig, Embedder};
//! use credirag::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let client = EmbeddingClient::new(EmbeddingConfig::from_app_config(&config))?;
//!
//!     let embedding = client.embed("credit card fraud").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;

pub use client::EmbeddingClient;
pub use client::EmbeddingConfig;
pub use client::EmbeddingProvider;

use async_trait::async_trait;

use crate::errors::Result;

/// Capability boundary for query embedding.
///
/// Implementations must be deterministic: embedding the same string twice
/// yields the same vector bit-for-bit.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate the embedding vector for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimension of the vectors this embedder produces
    fn dimension(&self) -> usize;
}
