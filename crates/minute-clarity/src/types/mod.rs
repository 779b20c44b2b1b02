//! Core domain types

pub mod document;
pub mod response;

pub use document::{Chunk, Document, FileType};
pub use response::{QueryAnswer, SourceChunk};
