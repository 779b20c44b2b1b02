//! Configuration loaded once at startup

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Filesystem layout
    pub storage: StorageConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// OpenAI-style API configuration
    pub openai: OpenAiConfig,
    /// Query configuration
    pub query: QueryConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read config file '{}': {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("invalid config file '{}': {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.query.top_k == 0 {
            return Err(Error::config("query top_k must be at least 1"));
        }
        Ok(())
    }
}

/// Filesystem layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Folder holding files awaiting ingestion
    pub knowledge_base_dir: PathBuf,
    /// Folder that ingested files are moved into
    pub processed_dir: PathBuf,
    /// Directory holding the persisted vector index
    pub index_dir: PathBuf,
    /// Path of the flat CSV ledger
    pub ledger_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            knowledge_base_dir: PathBuf::from("knowledge_base"),
            processed_dir: PathBuf::from("processed_documents"),
            index_dir: PathBuf::from("vector_db"),
            ledger_path: PathBuf::from("db_details.csv"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_overlap: 200,
        }
    }
}

/// OpenAI-style API configuration
///
/// The API key is not part of the config file. It is read from the
/// `OPENAI_API_KEY` environment variable when the client is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Embedding dimensions
    pub dimensions: usize,
    /// Default (smaller-context) chat model
    pub default_model: String,
    /// Large-context chat model
    pub large_context_model: String,
    /// Temperature for completions
    pub temperature: f32,
    /// Default maximum output tokens for generic completions
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            embed_model: "text-embedding-ada-002".to_string(),
            dimensions: 1536,
            default_model: "gpt-3.5-turbo".to_string(),
            large_context_model: "gpt-3.5-turbo-16k".to_string(),
            temperature: 0.5,
            max_tokens: 1750,
            timeout_secs: 120,
        }
    }
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Number of chunks retrieved as context
    pub top_k: usize,
    /// Maximum output tokens for answers
    pub answer_max_tokens: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: 6,
            answer_max_tokens: 512,
        }
    }
}
