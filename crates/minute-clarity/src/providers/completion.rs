//! Chat completion provider trait and model selection policy

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Combined token estimate below which the default model is selected
pub const MODEL_SELECT_THRESHOLD: usize = 3750;

/// Message role in a chat exchange
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A role-tagged turn in a completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Estimate the token count of a message sequence
///
/// A character-count heuristic (roughly four characters per token). The
/// estimate only routes requests between the two configured models, so the
/// tolerance is acceptable; a misrouted oversized request surfaces as a
/// service error.
pub fn estimate_tokens(messages: &[ChatMessage]) -> usize {
    let chars: usize = messages
        .iter()
        .map(|m| m.content.chars().count() + m.role.as_str().len())
        .sum();
    chars.div_ceil(4)
}

/// Trait for chat-completion generation
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request a single completion from the given model
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String>;

    /// Identifier of the default (smaller-context) model
    fn default_model(&self) -> &str;

    /// Identifier of the large-context model
    fn large_context_model(&self) -> &str;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Request a completion, selecting the model by estimated token count
    ///
    /// When the prompt estimate plus `max_tokens` stays below
    /// [`MODEL_SELECT_THRESHOLD`] the default model is used, otherwise the
    /// large-context variant. No automatic retry on misestimation.
    async fn complete_auto(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let total = estimate_tokens(messages) + max_tokens as usize;
        let model = if total < MODEL_SELECT_THRESHOLD {
            self.default_model()
        } else {
            self.large_context_model()
        };
        tracing::debug!("Selected model '{}' for ~{} tokens", model, total);
        self.complete(model, messages, temperature, max_tokens).await
    }
}
