//! Question answering against the persisted index

use crate::config::AppConfig;
use crate::error::Result;
use crate::generation::PromptBuilder;
use crate::index::VectorIndex;
use crate::providers::{CompletionProvider, EmbeddingProvider};
use crate::types::{QueryAnswer, SourceChunk};

/// Answers questions by retrieving context from the persisted index and
/// requesting a single completion
pub struct QueryEngine<'a> {
    config: &'a AppConfig,
    embedder: &'a dyn EmbeddingProvider,
    completions: &'a dyn CompletionProvider,
}

impl<'a> QueryEngine<'a> {
    /// Create a query engine over the given configuration and providers
    pub fn new(
        config: &'a AppConfig,
        embedder: &'a dyn EmbeddingProvider,
        completions: &'a dyn CompletionProvider,
    ) -> Self {
        Self {
            config,
            embedder,
            completions,
        }
    }

    /// Answer a question from the persisted index
    ///
    /// Loads the index wholesale, retrieves `top_k` chunks with
    /// diversity-aware search and asks the default model for an answer
    /// grounded in them. Reports [`crate::Error::IndexNotFound`] when no
    /// index has been built yet.
    pub async fn query(
        &self,
        question: &str,
        top_k: usize,
        with_sources: bool,
    ) -> Result<QueryAnswer> {
        let index = VectorIndex::load(&self.config.storage.index_dir)?;
        tracing::info!("Loaded index with {} entries", index.len());

        let query_embedding = self.embedder.embed(question).await?;
        let results = index.search_diverse(&query_embedding, top_k);
        tracing::info!("Retrieved {} chunks for question", results.len());

        let messages = PromptBuilder::doc_qa_messages(&results, question);
        let answer = self
            .completions
            .complete(
                self.completions.default_model(),
                &messages,
                self.config.openai.temperature,
                self.config.query.answer_max_tokens,
            )
            .await?;

        let sources = with_sources.then(|| {
            results
                .iter()
                .map(|r| SourceChunk {
                    document: r.chunk.document.clone(),
                    content: r.chunk.content.clone(),
                })
                .collect()
        });

        Ok(QueryAnswer { answer, sources })
    }
}
