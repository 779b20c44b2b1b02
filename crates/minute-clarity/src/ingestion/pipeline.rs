//! Ingestion pipeline: load, chunk, embed, persist

use crate::config::AppConfig;
use crate::error::Result;
use crate::index::{Ledger, VectorIndex};
use crate::ingestion::chunker::TextChunker;
use crate::ingestion::loader::DocumentLoader;
use crate::providers::EmbeddingProvider;

/// How a freshly built index relates to the persisted one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Merge the new index into the existing one
    Merge,
    /// Replace the existing index
    Overwrite,
}

/// Result of an ingestion run
#[derive(Debug)]
pub enum IngestOutcome {
    /// The knowledge-base folder was missing or empty
    NothingToIngest,
    /// Documents were ingested and the index persisted
    Completed {
        files: usize,
        chunks: usize,
        merged_into_existing: bool,
    },
}

/// Result of removing uploaded files
#[derive(Debug)]
pub struct RemovalReport {
    /// Files actually deleted from the processed folder
    pub deleted_files: Vec<String>,
    /// Ledger rows removed
    pub removed_rows: usize,
}

/// Drives one ingestion batch through load, chunk, embed and persist
pub struct IngestPipeline<'a> {
    config: &'a AppConfig,
    embedder: &'a dyn EmbeddingProvider,
}

impl<'a> IngestPipeline<'a> {
    /// Create a pipeline over the given configuration and embedder
    pub fn new(config: &'a AppConfig, embedder: &'a dyn EmbeddingProvider) -> Self {
        Self { config, embedder }
    }

    /// Run one ingestion batch
    ///
    /// The new index is built fully in memory before the persisted files are
    /// touched; a failure during extraction or embedding leaves the prior
    /// index and ledger as they were.
    pub async fn run(&self, mode: IngestMode) -> Result<IngestOutcome> {
        let storage = &self.config.storage;
        let loader = DocumentLoader::new(
            storage.knowledge_base_dir.clone(),
            storage.processed_dir.clone(),
        );

        let Some(batch) = loader.load_batch()? else {
            tracing::info!("No new documents to process");
            return Ok(IngestOutcome::NothingToIngest);
        };

        let chunker = TextChunker::new(
            self.config.chunking.chunk_size,
            self.config.chunking.chunk_overlap,
        )?;
        let chunks = chunker.chunk_documents(&batch.documents);
        let chunk_count = chunks.len();
        tracing::info!(
            "Chunked {} documents into {} chunks",
            batch.documents.len(),
            chunk_count
        );

        let new_index = VectorIndex::build(chunks, self.embedder).await?;

        let existing = VectorIndex::exists(&storage.index_dir);
        let (final_index, merged_into_existing) = match (mode, existing) {
            (IngestMode::Merge, true) => {
                tracing::info!("Merging new index into existing");
                let prior = VectorIndex::load(&storage.index_dir)?;
                (VectorIndex::merge(prior, new_index)?, true)
            }
            (IngestMode::Merge, false) => {
                tracing::info!("No existing index, persisting new index");
                (new_index, false)
            }
            (IngestMode::Overwrite, true) => {
                tracing::info!("Overwriting existing index");
                (new_index, false)
            }
            (IngestMode::Overwrite, false) => (new_index, false),
        };

        final_index.save(&storage.index_dir)?;

        let ledger = Ledger::new(storage.ledger_path.clone());
        match mode {
            // Overwrite replaces the ledger along with the index
            IngestMode::Overwrite => ledger.replace(&batch.rows)?,
            IngestMode::Merge => ledger.append(&batch.rows)?,
        }

        Ok(IngestOutcome::Completed {
            files: batch.documents.len(),
            chunks: chunk_count,
            merged_into_existing,
        })
    }

    /// Delete uploaded files from the processed folder and drop their ledger
    /// rows
    ///
    /// Needs no embedder, so it is callable without a provider.
    pub fn remove_files(config: &AppConfig, file_names: &[String]) -> Result<RemovalReport> {
        let storage = &config.storage;
        let loader = DocumentLoader::new(
            storage.knowledge_base_dir.clone(),
            storage.processed_dir.clone(),
        );
        let deleted_files = loader.delete_processed(file_names)?;

        let ledger = Ledger::new(storage.ledger_path.clone());
        let removed_rows = ledger.remove_rows(file_names)?;

        Ok(RemovalReport {
            deleted_files,
            removed_rows,
        })
    }

    /// Drop the persisted index and ledger
    ///
    /// Cleanup is best-effort; failures are logged and do not abort.
    pub fn reset(config: &AppConfig) {
        let storage = &config.storage;
        if storage.index_dir.is_dir() {
            if let Err(e) = std::fs::remove_dir_all(&storage.index_dir) {
                tracing::warn!("Failed to remove index directory: {}", e);
            }
        }
        if storage.ledger_path.is_file() {
            if let Err(e) = std::fs::remove_file(&storage.ledger_path) {
                tracing::warn!("Failed to remove ledger: {}", e);
            }
        }
    }
}
