//! Persisted nearest-neighbor index over chunk embeddings

pub mod ledger;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

pub use ledger::{Ledger, LedgerRow};

/// File name of the persisted index inside the index directory
const INDEX_FILE: &str = "index.bin";

/// Candidate pool multiplier for diversity-aware search
const DIVERSITY_POOL_FACTOR: usize = 4;

/// Relevance weight for diversity-aware re-ranking
const DIVERSITY_LAMBDA: f32 = 0.5;

/// Search result with chunk and similarity
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is better)
    pub similarity: f32,
}

/// One indexed entry, an embedding vector paired with its chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    vector: Vec<f32>,
    chunk: Chunk,
}

/// Flat nearest-neighbor index, persisted and loaded wholesale
///
/// The index is always built fully in memory before the persisted file is
/// touched, so a failure mid-operation leaves the prior file intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Create an empty index with the given dimensionality
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            entries: Vec::new(),
        }
    }

    /// Build an index by embedding every chunk
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        let dimensions = embedder.dimensions();
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();

        tracing::info!(
            "Embedding {} chunks with provider '{}'",
            chunks.len(),
            embedder.name()
        );
        let vectors = embedder.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "provider returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let mut entries = Vec::with_capacity(chunks.len());
        for (vector, chunk) in vectors.into_iter().zip(chunks) {
            if vector.len() != dimensions {
                return Err(Error::DimensionMismatch {
                    expected: dimensions,
                    found: vector.len(),
                });
            }
            entries.push(IndexEntry { vector, chunk });
        }

        Ok(Self {
            dimensions,
            entries,
        })
    }

    /// Merge two indices into one
    ///
    /// Commutative in content; retrievability does not depend on merge
    /// order. Indices built with different embedding dimensionality do not
    /// merge and return a [`Error::DimensionMismatch`].
    pub fn merge(mut existing: VectorIndex, new: VectorIndex) -> Result<VectorIndex> {
        if existing.dimensions != new.dimensions {
            return Err(Error::DimensionMismatch {
                expected: existing.dimensions,
                found: new.dimensions,
            });
        }
        existing.entries.extend(new.entries);
        Ok(existing)
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensionality of this index
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// All entries ranked by similarity to the query, best first
    fn ranked_entries(&self, query: &[f32]) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.vector)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Retrieve the `k` most similar chunks
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchResult> {
        self.ranked_entries(query)
            .into_iter()
            .take(k)
            .map(|(i, similarity)| SearchResult {
                chunk: self.entries[i].chunk.clone(),
                similarity,
            })
            .collect()
    }

    /// Retrieve `k` chunks with diversity-aware (maximal marginal relevance)
    /// re-ranking so near-duplicate chunks don't dominate the result
    ///
    /// A candidate pool of `k * DIVERSITY_POOL_FACTOR` nearest entries is
    /// re-ranked by relevance minus redundancy against already-selected
    /// results.
    pub fn search_diverse(&self, query: &[f32], k: usize) -> Vec<SearchResult> {
        let mut candidates = self.ranked_entries(query);
        candidates.truncate(k * DIVERSITY_POOL_FACTOR);

        let mut selected: Vec<(usize, f32)> = Vec::with_capacity(k);
        while selected.len() < k && !candidates.is_empty() {
            let mut best_pos = 0;
            let mut best_score = f32::NEG_INFINITY;

            for (pos, &(i, relevance)) in candidates.iter().enumerate() {
                let redundancy = selected
                    .iter()
                    .map(|&(j, _)| {
                        cosine_similarity(&self.entries[i].vector, &self.entries[j].vector)
                    })
                    .fold(0.0_f32, f32::max);
                let score = DIVERSITY_LAMBDA * relevance - (1.0 - DIVERSITY_LAMBDA) * redundancy;
                if score > best_score {
                    best_score = score;
                    best_pos = pos;
                }
            }

            selected.push(candidates.remove(best_pos));
        }

        selected
            .into_iter()
            .map(|(i, similarity)| SearchResult {
                chunk: self.entries[i].chunk.clone(),
                similarity,
            })
            .collect()
    }

    /// Check whether a persisted index exists in the given directory
    pub fn exists(dir: &Path) -> bool {
        dir.join(INDEX_FILE).is_file()
    }

    /// Persist the index into the given directory
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let bytes = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| Error::Index(format!("failed to encode index: {}", e)))?;
        std::fs::write(dir.join(INDEX_FILE), bytes)?;
        tracing::info!("Saved index with {} entries to {}", self.len(), dir.display());
        Ok(())
    }

    /// Load the persisted index wholesale from the given directory
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(INDEX_FILE);
        if !path.is_file() {
            return Err(Error::IndexNotFound);
        }
        let bytes = std::fs::read(&path)?;
        let (index, _) = bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
            .map_err(|e| Error::Index(format!("failed to decode index: {}", e)))?;
        Ok(index)
    }
}

/// Cosine similarity between two vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
