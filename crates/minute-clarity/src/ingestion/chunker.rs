//! Fixed-width text chunking with overlap

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

/// Text chunker producing fixed-width character windows
pub struct TextChunker {
    /// Chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; the overlap must be smaller than the chunk size
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk_size must be at least 1"));
        }
        if overlap >= chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Chunk a sequence of documents; no documents produce no chunks
    pub fn chunk_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for doc in documents {
            for (i, window) in self.split(&doc.content).into_iter().enumerate() {
                chunks.push(Chunk::new(doc.id, doc.filename.clone(), window, i as u32));
            }
        }
        chunks
    }

    /// Split text into windows of `chunk_size` characters, each overlapping
    /// its predecessor by `overlap` characters
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let step = self.chunk_size - self.overlap;
        let mut windows = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(chars.len());
            windows.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }

        windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileType;

    fn doc(content: &str) -> Document {
        Document::new("doc.txt".to_string(), FileType::Txt, content.to_string())
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunker = TextChunker::new(100, 10).unwrap();
        let windows = chunker.split("short text");
        assert_eq!(windows, vec!["short text".to_string()]);
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunker = TextChunker::new(100, 10).unwrap();
        assert!(chunker.split("").is_empty());
        assert!(chunker.chunk_documents(&[]).is_empty());
    }

    #[test]
    fn test_windows_respect_size_and_overlap() {
        let chunker = TextChunker::new(10, 3).unwrap();
        let text: String = ('a'..='z').collect();
        let windows = chunker.split(&text);

        for window in &windows {
            assert!(window.chars().count() <= 10);
        }
        for pair in windows.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            let tail: String = prev[prev.len() - 3..].iter().collect();
            let head: String = next[..3.min(next.len())].iter().collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_deoverlapped_concatenation_reconstructs_text() {
        let chunker = TextChunker::new(10, 3).unwrap();
        let text = "The team agreed to cut the budget by ten percent next quarter.";
        let windows = chunker.split(text);

        let mut reconstructed = windows[0].clone();
        for window in &windows[1..] {
            let chars: Vec<char> = window.chars().collect();
            reconstructed.extend(chars[3.min(chars.len())..].iter());
        }
        assert_eq!(reconstructed, text);
    }

    #[test]
    fn test_multibyte_text_chunks_on_char_boundaries() {
        let chunker = TextChunker::new(4, 1).unwrap();
        let windows = chunker.split("héllö wörld ünïcode");
        for window in &windows {
            assert!(window.chars().count() <= 4);
        }
    }

    #[test]
    fn test_chunk_documents_tags_source_and_index() {
        let chunker = TextChunker::new(10, 2).unwrap();
        let chunks = chunker.chunk_documents(&[doc("abcdefghijklmnop")]);
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.document, "doc.txt");
            assert_eq!(chunk.chunk_index, i as u32);
        }
    }

    #[test]
    fn test_invalid_overlap_is_rejected() {
        assert!(TextChunker::new(10, 10).is_err());
        assert!(TextChunker::new(0, 0).is_err());
    }
}
