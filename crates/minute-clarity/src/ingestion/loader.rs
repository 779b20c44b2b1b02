//! Document loading from the knowledge-base folder

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::index::LedgerRow;
use crate::ingestion::parser::FileParser;
use crate::types::{Document, FileType};

/// A batch of documents extracted from the knowledge-base folder, with the
/// ledger rows describing them
#[derive(Debug)]
pub struct LoadedBatch {
    pub documents: Vec<Document>,
    pub rows: Vec<LedgerRow>,
}

/// Loads files from the knowledge-base folder and moves them into the
/// processed folder as they are extracted
///
/// File moves happen per file, so a failure mid-batch leaves earlier files
/// already moved; there is no atomicity across the batch.
pub struct DocumentLoader {
    knowledge_base_dir: PathBuf,
    processed_dir: PathBuf,
}

impl DocumentLoader {
    /// Create a loader for the given folders
    pub fn new(knowledge_base_dir: PathBuf, processed_dir: PathBuf) -> Self {
        Self {
            knowledge_base_dir,
            processed_dir,
        }
    }

    /// Load every file awaiting ingestion
    ///
    /// Returns `None` when the knowledge-base folder is missing or holds no
    /// files (nothing to ingest). An unrecognized extension fails the whole
    /// batch with an unsupported-format error.
    pub fn load_batch(&self) -> Result<Option<LoadedBatch>> {
        if !self.knowledge_base_dir.is_dir() {
            return Ok(None);
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.knowledge_base_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        if paths.is_empty() {
            return Ok(None);
        }
        paths.sort();

        std::fs::create_dir_all(&self.processed_dir)?;

        let mut documents = Vec::new();
        let mut rows = Vec::new();

        for path in paths {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();

            let file_type = FileType::from_extension(&ext);
            if !file_type.is_supported() {
                return Err(Error::UnsupportedFileType(format!(".{}", ext)));
            }

            let data = std::fs::read(&path)?;
            let content = FileParser::extract(file_type, &filename, &data)?;

            tracing::info!("Extracted {} ({})", filename, file_type.display_name());

            documents.push(Document::new(filename.clone(), file_type, content));
            rows.push(LedgerRow::document(filename.clone(), file_type));

            // Move the file out of the input folder so it is never
            // re-ingested
            std::fs::rename(&path, self.processed_dir.join(&filename))?;
        }

        Ok(Some(LoadedBatch { documents, rows }))
    }

    /// Delete previously processed files by name
    ///
    /// Missing files are reported in the result rather than treated as
    /// errors.
    pub fn delete_processed(&self, file_names: &[String]) -> Result<Vec<String>> {
        let mut deleted = Vec::new();
        for name in file_names {
            let path = self.processed_dir.join(name);
            if path.is_file() {
                std::fs::remove_file(&path)?;
                deleted.push(name.clone());
            } else {
                tracing::warn!("File '{}' does not exist in the processed folder", name);
            }
        }
        Ok(deleted)
    }
}
