//! Document ingestion: loading, parsing, chunking, index building

mod chunker;
mod loader;
mod parser;
mod pipeline;

pub use chunker::TextChunker;
pub use loader::{DocumentLoader, LoadedBatch};
pub use parser::FileParser;
pub use pipeline::{IngestMode, IngestOutcome, IngestPipeline, RemovalReport};
