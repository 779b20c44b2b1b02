//! Provider abstractions for embeddings and chat completions
//!
//! Trait seams keep the pipelines independent of the concrete service; the
//! OpenAI-style client implements both.

pub mod completion;
pub mod embedding;
pub mod openai;

pub use completion::{ChatMessage, CompletionProvider, Role};
pub use embedding::EmbeddingProvider;
pub use openai::OpenAiClient;
