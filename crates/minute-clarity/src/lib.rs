//! minute-clarity: document Q&A and meeting-minutes generation
//!
//! Documents dropped into a knowledge-base folder are parsed, chunked,
//! embedded through an external embedding service and merged into a
//! persisted nearest-neighbor index; questions are answered from the index
//! with a single chat completion, and meeting minutes are produced by three
//! independent completion calls over a transcript.

pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use index::{Ledger, LedgerRow, SearchResult, VectorIndex};
pub use ingestion::{IngestMode, IngestOutcome, IngestPipeline};
pub use retrieval::QueryEngine;
pub use types::{
    document::{Chunk, Document, FileType},
    response::{QueryAnswer, SourceChunk},
};
