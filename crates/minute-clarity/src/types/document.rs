//! Document and chunk types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Plain text file
    Txt,
    /// Excel spreadsheet (.xlsx)
    Xlsx,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "txt" | "text" => Self::Txt,
            "xlsx" => Self::Xlsx,
            _ => Self::Unknown,
        }
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Dotted extension as recorded in the ledger `File_Type` column
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
            Self::Txt => ".txt",
            Self::Xlsx => ".xlsx",
            Self::Unknown => "",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Txt => "Text File",
            Self::Xlsx => "Excel Spreadsheet (.xlsx)",
            Self::Unknown => "Unknown",
        }
    }
}

/// A document extracted from the knowledge-base folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// File name as uploaded
    pub filename: String,
    /// File type
    pub file_type: FileType,
    /// Extracted text content
    pub content: String,
}

impl Document {
    /// Create a new document
    pub fn new(filename: String, file_type: FileType, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            file_type,
            content,
        }
    }
}

/// A chunk of text from a document, the unit of embedding and retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Name of the source document
    pub document: String,
    /// Text content
    pub content: String,
    /// Chunk index within its document
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(document_id: Uuid, document: String, content: String, chunk_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            document,
            content,
            chunk_index,
        }
    }
}
