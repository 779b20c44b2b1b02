//! End-to-end pipeline tests with in-process providers
//!
//! A deterministic bag-of-words embedder stands in for the embedding
//! service and an echoing completion provider stands in for the chat model,
//! so ingest, merge, query and removal run end-to-end against real
//! filesystem state.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use minute_clarity::providers::{ChatMessage, CompletionProvider, EmbeddingProvider};
use minute_clarity::{
    AppConfig, Chunk, Error, IngestMode, IngestOutcome, IngestPipeline, Ledger, QueryEngine,
    Result, VectorIndex,
};

const DIMENSIONS: usize = 16;

/// Deterministic embedder hashing words into a fixed-size bag-of-words
/// vector; texts sharing words get similar vectors
struct HashEmbedder;

fn hash_embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; DIMENSIONS];
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut hasher = DefaultHasher::new();
        word.hash(&mut hasher);
        vector[(hasher.finish() % DIMENSIONS as u64) as usize] += 1.0;
    }
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(hash_embed(text))
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// Completion provider that echoes the final user message, so answers
/// contain whatever context was retrieved
struct EchoCompletion;

#[async_trait]
impl CompletionProvider for EchoCompletion {
    async fn complete(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String> {
        messages
            .last()
            .map(|m| m.content.clone())
            .ok_or_else(|| Error::completion("no messages"))
    }

    fn default_model(&self) -> &str {
        "echo-default"
    }

    fn large_context_model(&self) -> &str {
        "echo-large"
    }

    fn name(&self) -> &str {
        "echo"
    }
}

fn test_config(root: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.knowledge_base_dir = root.join("knowledge_base");
    config.storage.processed_dir = root.join("processed_documents");
    config.storage.index_dir = root.join("vector_db");
    config.storage.ledger_path = root.join("db_details.csv");
    config.chunking.chunk_size = 200;
    config.chunking.chunk_overlap = 20;
    config
}

fn write_kb_file(config: &AppConfig, name: &str, content: &str) {
    std::fs::create_dir_all(&config.storage.knowledge_base_dir).unwrap();
    std::fs::write(config.storage.knowledge_base_dir.join(name), content).unwrap();
}

#[tokio::test]
async fn ingest_builds_index_and_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    write_kb_file(&config, "meeting.txt", "The team agreed to cut the budget by 10%.");
    write_kb_file(&config, "weather.txt", "It rained heavily throughout the afternoon.");

    let embedder = HashEmbedder;
    let pipeline = IngestPipeline::new(&config, &embedder);
    let outcome = pipeline.run(IngestMode::Merge).await.unwrap();

    match outcome {
        IngestOutcome::Completed {
            files,
            chunks,
            merged_into_existing,
        } => {
            assert_eq!(files, 2);
            assert!(chunks >= 2);
            assert!(!merged_into_existing);
        }
        other => panic!("expected completed ingest, got {:?}", other),
    }

    // Ledger has one row per file with the dotted extension
    let rows = Ledger::new(config.storage.ledger_path.clone())
        .read_rows()
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.file_type == ".txt"));
    assert!(rows.iter().all(|r| r.input_type == "Document"));

    // Files moved out of the input folder
    assert!(std::fs::read_dir(&config.storage.knowledge_base_dir)
        .unwrap()
        .next()
        .is_none());
    assert!(config.storage.processed_dir.join("meeting.txt").is_file());

    // Index is persisted and loadable
    let index = VectorIndex::load(&config.storage.index_dir).unwrap();
    assert!(index.len() >= 2);
}

#[tokio::test]
async fn second_ingest_over_empty_folder_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    write_kb_file(&config, "one.txt", "A single document.");

    let embedder = HashEmbedder;
    let pipeline = IngestPipeline::new(&config, &embedder);
    pipeline.run(IngestMode::Merge).await.unwrap();

    let before = VectorIndex::load(&config.storage.index_dir).unwrap().len();
    let outcome = pipeline.run(IngestMode::Merge).await.unwrap();
    assert!(matches!(outcome, IngestOutcome::NothingToIngest));

    let after = VectorIndex::load(&config.storage.index_dir).unwrap().len();
    assert_eq!(before, after);
}

#[tokio::test]
async fn merge_appends_and_overwrite_replaces() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let embedder = HashEmbedder;
    let pipeline = IngestPipeline::new(&config, &embedder);

    write_kb_file(&config, "first.txt", "Contents of the first document.");
    pipeline.run(IngestMode::Merge).await.unwrap();
    let len_first = VectorIndex::load(&config.storage.index_dir).unwrap().len();

    write_kb_file(&config, "second.txt", "Contents of the second document.");
    let outcome = pipeline.run(IngestMode::Merge).await.unwrap();
    assert!(matches!(
        outcome,
        IngestOutcome::Completed {
            merged_into_existing: true,
            ..
        }
    ));

    let merged_len = VectorIndex::load(&config.storage.index_dir).unwrap().len();
    assert!(merged_len > len_first);

    // Ledger rows appended in merge order
    let ledger = Ledger::new(config.storage.ledger_path.clone());
    let names: Vec<String> = ledger
        .read_rows()
        .unwrap()
        .into_iter()
        .map(|r| r.file_name)
        .collect();
    assert_eq!(names, ["first.txt", "second.txt"]);

    // Overwrite drops the prior contents
    write_kb_file(&config, "third.txt", "Contents of the third document.");
    pipeline.run(IngestMode::Overwrite).await.unwrap();

    let names: Vec<String> = ledger
        .read_rows()
        .unwrap()
        .into_iter()
        .map(|r| r.file_name)
        .collect();
    assert_eq!(names, ["third.txt"]);
    let overwritten_len = VectorIndex::load(&config.storage.index_dir).unwrap().len();
    assert!(overwritten_len < merged_len);
}

#[tokio::test]
async fn merged_retrieval_covers_both_batches() {
    let embedder = HashEmbedder;

    let chunk_a = Chunk::new(
        uuid::Uuid::new_v4(),
        "a.txt".to_string(),
        "quarterly budget review and spending cuts".to_string(),
        0,
    );
    let chunk_b = Chunk::new(
        uuid::Uuid::new_v4(),
        "b.txt".to_string(),
        "office relocation schedule and moving plans".to_string(),
        0,
    );

    let index_a = VectorIndex::build(vec![chunk_a], &embedder).await.unwrap();
    let index_b = VectorIndex::build(vec![chunk_b], &embedder).await.unwrap();

    let query = hash_embed("budget spending");
    let top_a = index_a.search(&query, 1);
    let top_b = index_b.search(&query, 1);

    // Union of the independent top-1 results, best first
    let mut union: Vec<(String, f32)> = top_a
        .iter()
        .chain(top_b.iter())
        .map(|r| (r.chunk.content.clone(), r.similarity))
        .collect();
    union.sort_by(|a, b| b.1.total_cmp(&a.1));

    let merged = VectorIndex::merge(index_a, index_b).unwrap();
    let merged_top: Vec<(String, f32)> = merged
        .search(&query, 2)
        .into_iter()
        .map(|r| (r.chunk.content, r.similarity))
        .collect();

    assert_eq!(merged_top, union);
}

#[tokio::test]
async fn query_returns_answer_with_sources() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    write_kb_file(
        &config,
        "transcript.txt",
        "The team agreed to cut the budget by 10%. Everyone supported the decision.",
    );
    write_kb_file(
        &config,
        "weather.txt",
        "It rained heavily throughout the afternoon and the streets flooded.",
    );

    let embedder = HashEmbedder;
    IngestPipeline::new(&config, &embedder)
        .run(IngestMode::Merge)
        .await
        .unwrap();

    let completions = EchoCompletion;
    let engine = QueryEngine::new(&config, &embedder, &completions);
    let answer = engine
        .query("What was decided about the budget?", 2, true)
        .await
        .unwrap();

    // The echoed prompt contains the retrieved context, so the answer must
    // mention the figure from the transcript
    assert!(answer.answer.contains("10%"), "answer: {}", answer.answer);

    let sources = answer.sources.unwrap();
    assert!(!sources.is_empty());
    assert!(sources.iter().any(|s| s.content.contains("10%")));
    assert!(sources.iter().any(|s| s.document == "transcript.txt"));
}

#[tokio::test]
async fn query_without_sources_omits_them() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    write_kb_file(&config, "doc.txt", "Some ingested content.");

    let embedder = HashEmbedder;
    IngestPipeline::new(&config, &embedder)
        .run(IngestMode::Merge)
        .await
        .unwrap();

    let completions = EchoCompletion;
    let engine = QueryEngine::new(&config, &embedder, &completions);
    let answer = engine.query("anything", 2, false).await.unwrap();
    assert!(answer.sources.is_none());
}

#[tokio::test]
async fn query_before_ingestion_reports_missing_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let embedder = HashEmbedder;
    let completions = EchoCompletion;
    let engine = QueryEngine::new(&config, &embedder, &completions);

    match engine.query("anything", 6, false).await {
        Err(Error::IndexNotFound) => {}
        other => panic!("expected missing index error, got {:?}", other.is_ok()),
    }
}

#[tokio::test]
async fn unsupported_file_aborts_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    write_kb_file(&config, "notes.txt", "fine");
    write_kb_file(&config, "archive.zip", "not a document");

    let embedder = HashEmbedder;
    let outcome = IngestPipeline::new(&config, &embedder)
        .run(IngestMode::Merge)
        .await;
    assert!(matches!(outcome, Err(Error::UnsupportedFileType(_))));

    // The failure aborts before anything is persisted
    assert!(!VectorIndex::exists(&config.storage.index_dir));
    assert!(!config.storage.ledger_path.exists());
}

#[tokio::test]
async fn removing_files_drops_rows_and_processed_copies() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    write_kb_file(&config, "keep.txt", "kept document");
    write_kb_file(&config, "drop.txt", "dropped document");

    let embedder = HashEmbedder;
    IngestPipeline::new(&config, &embedder)
        .run(IngestMode::Merge)
        .await
        .unwrap();

    let report = IngestPipeline::remove_files(&config, &["drop.txt".to_string()]).unwrap();
    assert_eq!(report.deleted_files, ["drop.txt".to_string()]);
    assert_eq!(report.removed_rows, 1);

    assert!(!config.storage.processed_dir.join("drop.txt").exists());
    assert!(config.storage.processed_dir.join("keep.txt").is_file());

    let names: Vec<String> = Ledger::new(config.storage.ledger_path.clone())
        .read_rows()
        .unwrap()
        .into_iter()
        .map(|r| r.file_name)
        .collect();
    assert_eq!(names, ["keep.txt"]);
}
