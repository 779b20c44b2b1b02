//! Prompt templates for question answering, summarization and minutes

use crate::index::SearchResult;
use crate::providers::ChatMessage;

/// System instruction for the minutes summary section
pub const MINUTES_SUMMARY_INSTRUCTION: &str = "You are a highly skilled AI trained in language comprehension and summarization. \
Read the following text and summarize it into a concise abstract paragraph. \
Aim to retain the most important points, providing a coherent and readable summary \
that could help a person understand the main points of the discussion without needing \
to read the entire text. Avoid unnecessary details or tangential points.";

/// System instruction for the minutes key-points section
pub const MINUTES_KEY_POINTS_INSTRUCTION: &str = "You are a proficient AI with a specialty in distilling information into key points. \
Based on the following text, identify and list the main points that were discussed or \
brought up. These should be the most important ideas, findings, or topics that are \
crucial to the essence of the discussion. Provide a list that someone could read to \
quickly understand what was talked about.";

/// System instruction for the minutes action-items section
pub const MINUTES_ACTION_ITEMS_INSTRUCTION: &str = "You are an AI expert in analyzing conversations and extracting action items. \
Review the text and identify any tasks, assignments, or actions that were agreed upon \
or mentioned as needing to be done. These could be tasks assigned to specific \
individuals, or general actions that the group has decided to take. List these action \
items clearly and concisely.";

/// Prompt builder for the fixed templates
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the context block from retrieved chunks
    pub fn build_context(results: &[SearchResult]) -> String {
        let mut context = String::new();
        for (i, result) in results.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {}\n{}\n\n",
                i + 1,
                result.chunk.document,
                result.chunk.content
            ));
        }
        context
    }

    /// Build the document QA messages from retrieved context and a question
    ///
    /// The template instructs the model to say it does not know rather than
    /// fabricate when the context is insufficient.
    pub fn doc_qa_messages(results: &[SearchResult], question: &str) -> Vec<ChatMessage> {
        let system = "Use the provided pieces of context and answer the question at the end. \
If you don't know the answer, just say you don't know. Do not try to make up an answer. \
Follow the query instructions carefully while answering the query. \
Use a maximum of ten to fifteen sentences if the user does not limit the completion length. \
Keep the answer as concise as possible and helpful. \
The answer should not contain any harmful language.";

        let user = format!(
            "Context:\n{}\nQuestion: {}\n\nHelpful Answer:",
            Self::build_context(results),
            question
        );

        vec![ChatMessage::system(system), ChatMessage::user(user)]
    }

    /// Build the summarize messages for a text with a word limit
    pub fn summarize_messages(text: &str, word_limit: usize) -> Vec<ChatMessage> {
        let delimiter = "####";
        let system = format!(
            "You are a helpful assistant and follow given instructions. \
Summarize the text content provided in between {delimiter} characters. \
Summarized content should be not more than {word_limit} words. \
Summarized content must have the key points present in the provided text."
        );

        vec![
            ChatMessage::system(system),
            ChatMessage::user(format!("{delimiter}{text}{delimiter}")),
            ChatMessage::assistant("Helpful Summarized content:\n"),
        ]
    }
}
