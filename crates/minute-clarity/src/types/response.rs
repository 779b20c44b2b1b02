//! Query response types

use serde::{Deserialize, Serialize};

/// A source chunk returned alongside a generated answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceChunk {
    /// Name of the originating document
    pub document: String,
    /// Chunk text used as context
    pub content: String,
}

/// Answer to a query, with the source chunks used as context when requested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnswer {
    /// Generated answer text
    pub answer: String,
    /// Source chunks, present only when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceChunk>>,
}
