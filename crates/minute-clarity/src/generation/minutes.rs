//! Meeting-minutes generation from transcripts

use crate::providers::{ChatMessage, CompletionProvider};

use super::prompt::{
    MINUTES_ACTION_ITEMS_INSTRUCTION, MINUTES_KEY_POINTS_INSTRUCTION, MINUTES_SUMMARY_INSTRUCTION,
};

/// Outcome of one minutes section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionResult {
    /// Generated section text
    Generated(String),
    /// The completion call for this section failed; holds the error message
    Failed(String),
}

impl SectionResult {
    /// Generated text, if the section succeeded
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Generated(text) => Some(text),
            Self::Failed(_) => None,
        }
    }

    /// Check if the section was generated
    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }
}

/// Structured meeting minutes; every section is always present, holding
/// either generated text or the error that prevented it
#[derive(Debug, Clone)]
pub struct MeetingMinutes {
    pub summary: SectionResult,
    pub key_points: SectionResult,
    pub action_items: SectionResult,
}

impl MeetingMinutes {
    /// Render the minutes as a markdown document
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for (heading, section) in [
            ("Summary", &self.summary),
            ("Key Points", &self.key_points),
            ("Action Items", &self.action_items),
        ] {
            out.push_str(&format!("# {}\n\n", heading));
            match section {
                SectionResult::Generated(text) => out.push_str(text.trim()),
                SectionResult::Failed(message) => {
                    out.push_str(&format!("(section unavailable: {})", message));
                }
            }
            out.push_str("\n\n");
        }
        out
    }
}

/// Generates meeting minutes with three independent completion calls
///
/// Each section is best-effort; a failed call surfaces its error in that
/// section without blocking the other two. The large-context model is used
/// for every call since transcripts routinely exceed the default model's
/// window.
pub struct MinutesGenerator<'a> {
    completions: &'a dyn CompletionProvider,
    max_tokens: u32,
}

impl<'a> MinutesGenerator<'a> {
    /// Create a generator over the given completion provider
    pub fn new(completions: &'a dyn CompletionProvider, max_tokens: u32) -> Self {
        Self {
            completions,
            max_tokens,
        }
    }

    /// Generate minutes from a transcript's full text
    pub async fn generate(&self, transcript: &str) -> MeetingMinutes {
        MeetingMinutes {
            summary: self.section("summary", MINUTES_SUMMARY_INSTRUCTION, transcript).await,
            key_points: self
                .section("key points", MINUTES_KEY_POINTS_INSTRUCTION, transcript)
                .await,
            action_items: self
                .section("action items", MINUTES_ACTION_ITEMS_INSTRUCTION, transcript)
                .await,
        }
    }

    async fn section(&self, name: &str, instruction: &str, transcript: &str) -> SectionResult {
        let messages = [
            ChatMessage::system(instruction),
            ChatMessage::user(transcript),
        ];
        match self
            .completions
            .complete(
                self.completions.large_context_model(),
                &messages,
                0.0,
                self.max_tokens,
            )
            .await
        {
            Ok(text) => SectionResult::Generated(text),
            Err(e) => {
                tracing::warn!("Minutes section '{}' failed: {}", name, e);
                SectionResult::Failed(e.to_string())
            }
        }
    }
}
