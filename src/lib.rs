//! Retrieval-augmented question answering over a customer complaint corpus.
//!
//! A question is embedded, matched against a pre-built vector index of
//! complaint excerpts, assembled into a prompt, and answered by a pluggable
//! synthesizer, all under a timeout/fallback policy. Per-session chat
//! history and per-client rate limiting support the serving layer.

pub mod api;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod health;
pub mod logging;
pub mod models;
pub mod rag;
pub mod rate_limit;
pub mod session;
pub mod validation;
pub mod vector_store;

pub use config::AppConfig;
pub use errors::*;
