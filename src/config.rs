use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    pub endpoint: String,
    pub collection: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_retrieval_timeout")]
    pub retrieval_timeout_secs: u64,
    #[serde(default = "default_pipeline_timeout")]
    pub pipeline_timeout_secs: u64,
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

fn default_k() -> usize {
    3
}

fn default_retrieval_timeout() -> u64 {
    15
}

fn default_pipeline_timeout() -> u64 {
    30
}

fn default_excerpt_chars() -> usize {
    300
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            retrieval_timeout_secs: default_retrieval_timeout(),
            pipeline_timeout_secs: default_pipeline_timeout(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_ttl_hours() -> u64 {
    24
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

fn default_max_requests() -> usize {
    30
}

fn default_window_seconds() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_seconds: default_window_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

/// Optional generative backend for answer synthesis. When absent the
/// rule-based synthesizer is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_llm_model() -> String {
    "gemma3:27b".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7860,
            enable_cors: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub vector_store: VectorStoreConfig,
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    #[serde(default)]
    pub api: ApiConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(crate::CrediRagError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Get vector store endpoint
    pub fn vector_store_endpoint(&self) -> &str {
        &self.vector_store.endpoint
    }

    /// Get vector store collection name
    pub fn vector_store_collection(&self) -> &str {
        &self.vector_store.collection
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Get default number of complaints to retrieve per question
    pub fn retrieval_k(&self) -> usize {
        self.retrieval.k
    }

    /// Get retrieval execution budget
    pub fn retrieval_timeout(&self) -> Duration {
        Duration::from_secs(self.retrieval.retrieval_timeout_secs)
    }

    /// Get end-to-end pipeline budget
    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.retrieval.pipeline_timeout_secs)
    }

    /// Get prompt excerpt truncation length in characters
    pub fn excerpt_chars(&self) -> usize {
        self.retrieval.excerpt_chars
    }

    /// Get session time-to-live
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session.ttl_hours as i64)
    }

    /// Get interval between expired-session sweeps
    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session.sweep_interval_secs)
    }

    /// Get rate limit window
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit.window_seconds)
    }

    /// Get maximum requests per rate limit window
    pub fn rate_limit_max_requests(&self) -> usize {
        self.rate_limit.max_requests
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vector_store: VectorStoreConfig {
                endpoint: "http://localhost:8000".to_string(),
                collection: "complaints_final".to_string(),
                connect_timeout_secs: default_connect_timeout(),
            },
            embeddings: EmbeddingsConfig {
                model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
                dimension: 384,
                endpoint: "http://localhost:11434".to_string(),
                api_key: None,
            },
            retrieval: RetrievalConfig::default(),
            session: SessionConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
            llm: None,
            api: ApiConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_values() {
        let config = AppConfig::default();
        assert_eq!(config.retrieval_k(), 3);
        assert_eq!(config.retrieval_timeout(), Duration::from_secs(15));
        assert_eq!(config.pipeline_timeout(), Duration::from_secs(30));
        assert_eq!(config.excerpt_chars(), 300);
        assert_eq!(config.rate_limit_max_requests(), 30);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
        assert_eq!(config.session.ttl_hours, 24);
        assert_eq!(config.embedding_dimension(), 384);
    }

    #[test]
    fn test_from_file_round_trip() {
        let config = AppConfig::default();
        let serialized = toml::to_string(&config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, serialized).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded.vector_store.collection, "complaints_final");
        assert_eq!(loaded.retrieval_k(), 3);
    }

    #[test]
    fn test_minimal_config_uses_section_defaults() {
        let minimal = r#"
            [vector_store]
            endpoint = "http://localhost:8000"
            collection = "complaints_final"

            [embeddings]
            model = "sentence-transformers/all-MiniLM-L6-v2"
            dimension = 384
            endpoint = "http://localhost:11434"

            [logging]
            level = "info"
            backtrace = false
        "#;
        let config: AppConfig = toml::from_str(minimal).unwrap();
        assert_eq!(config.retrieval_k(), 3);
        assert_eq!(config.rate_limit_max_requests(), 30);
        assert!(config.llm.is_none());
    }
}
