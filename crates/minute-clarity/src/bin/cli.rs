//! Minute Clarity CLI
//!
//! Run with: cargo run -p minute-clarity -- <command>

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use minute_clarity::generation::{MinutesGenerator, PromptBuilder};
use minute_clarity::ingestion::{FileParser, IngestMode, IngestOutcome, IngestPipeline};
use minute_clarity::providers::{CompletionProvider, OpenAiClient};
use minute_clarity::{AppConfig, FileType, Ledger, QueryEngine};

#[derive(Parser)]
#[command(name = "minute-clarity", version, about = "Document Q&A and meeting minutes over a local vector index")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest documents from the knowledge-base folder into the index
    Ingest {
        /// Replace the existing index instead of merging into it
        #[arg(long)]
        overwrite: bool,
    },
    /// Ask a question against the ingested documents
    Query {
        /// The question to answer
        question: String,
        /// Also print the source chunks used as context
        #[arg(long)]
        sources: bool,
        /// Number of chunks retrieved as context
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Generate meeting minutes from a transcript file
    Minutes {
        /// Transcript file (any supported document format)
        transcript: PathBuf,
    },
    /// Summarize a document
    Summarize {
        /// Document file (any supported document format)
        file: PathBuf,
        /// Word limit for the summary
        #[arg(long, default_value_t = 250)]
        word_limit: usize,
    },
    /// List files recorded in the ingestion ledger
    Ls,
    /// Delete uploaded files and their ledger rows
    Rm {
        /// File names to delete from the processed folder
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Drop the persisted index and ledger
    Reset,
    /// Validate the configuration and API key
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minute_clarity=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Ingest { overwrite } => {
            let client = connect(&config).await?;
            let mode = if overwrite {
                IngestMode::Overwrite
            } else {
                IngestMode::Merge
            };

            let pb = spinner("Building database...");
            let outcome = IngestPipeline::new(&config, &client).run(mode).await;
            pb.finish_and_clear();

            match outcome? {
                IngestOutcome::NothingToIngest => {
                    println!(
                        "Nothing to ingest: no files in '{}'",
                        config.storage.knowledge_base_dir.display()
                    );
                }
                IngestOutcome::Completed {
                    files,
                    chunks,
                    merged_into_existing,
                } => {
                    let action = if merged_into_existing {
                        "merged into existing database"
                    } else {
                        "written as new database"
                    };
                    println!(
                        "{} {} files, {} chunks, {}",
                        style("Ingested").green().bold(),
                        files,
                        chunks,
                        action
                    );
                }
            }
        }

        Command::Query {
            question,
            sources,
            top_k,
        } => {
            let client = connect(&config).await?;
            let engine = QueryEngine::new(&config, &client, &client);
            let top_k = top_k.unwrap_or(config.query.top_k);

            let pb = spinner("Retrieving response...");
            let result = engine.query(&question, top_k, sources).await;
            pb.finish_and_clear();

            let answer = result?;
            println!("{}", answer.answer.trim());
            if let Some(sources) = answer.sources {
                println!();
                println!("{}", style("Sources:").dim());
                for source in sources {
                    println!("{}", style(format!("  [{}]", source.document)).dim());
                    println!("{}", style(format!("  {}", source.content.trim())).dim());
                }
            }
        }

        Command::Minutes { transcript } => {
            let client = connect(&config).await?;
            let text = read_document_text(&transcript)?;

            let pb = spinner("Generating minutes of meeting...");
            let generator = MinutesGenerator::new(&client, config.openai.max_tokens);
            let minutes = generator.generate(&text).await;
            pb.finish_and_clear();

            print!("{}", minutes.to_markdown());

            let failed = [&minutes.summary, &minutes.key_points, &minutes.action_items]
                .iter()
                .filter(|s| !s.is_generated())
                .count();
            if failed > 0 {
                eprintln!(
                    "{}",
                    style(format!("{} section(s) could not be generated", failed)).yellow()
                );
            }
        }

        Command::Summarize { file, word_limit } => {
            let client = connect(&config).await?;
            let text = read_document_text(&file)?;

            let pb = spinner("Summarizing...");
            let messages = PromptBuilder::summarize_messages(&text, word_limit);
            let summary = client
                .complete_auto(&messages, config.openai.temperature, config.openai.max_tokens)
                .await;
            pb.finish_and_clear();

            println!("{}", summary?.trim());
        }

        Command::Ls => {
            let ledger = Ledger::new(config.storage.ledger_path.clone());
            let rows = ledger.read_rows()?;
            if rows.is_empty() {
                println!("No files have been ingested yet");
            } else {
                println!("{}", style("Available documents:").bold());
                for row in rows {
                    println!(
                        "  {}  {}  {}",
                        row.file_name,
                        style(&row.file_type).dim(),
                        style(row.executed_time.format("%Y-%m-%d %H:%M:%S UTC")).dim()
                    );
                }
            }
        }

        Command::Rm { files } => {
            let report = IngestPipeline::remove_files(&config, &files)?;
            println!(
                "Deleted {} file(s), removed {} ledger row(s)",
                report.deleted_files.len(),
                report.removed_rows
            );
        }

        Command::Reset => {
            IngestPipeline::reset(&config);
            println!("Database has been deleted");
        }

        Command::Check => {
            let client = connect(&config).await?;
            println!("{}", style("Configuration is valid").green());
            println!("  Knowledge base: {}", config.storage.knowledge_base_dir.display());
            println!("  Index: {}", config.storage.index_dir.display());
            println!("  Ledger: {}", config.storage.ledger_path.display());
            println!("  Default model: {}", client.default_model());
            println!("  Large-context model: {}", client.large_context_model());
        }
    }

    Ok(())
}

/// Load the configuration file, falling back to defaults when it is absent
fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    if path.is_file() {
        Ok(AppConfig::load(path)?)
    } else {
        tracing::debug!("No config file at '{}', using defaults", path.display());
        let config = AppConfig::default();
        config.validate()?;
        Ok(config)
    }
}

/// Build the API client from validated credentials
async fn connect(config: &AppConfig) -> anyhow::Result<OpenAiClient> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY is not set. Please configure your API key")?;
    let client = OpenAiClient::new(&config.openai, api_key)?;

    let pb = spinner("Validating API key...");
    let validated = client.validate_key().await;
    pb.finish_and_clear();
    validated.context("Invalid API key. Please re-configure with a valid API key")?;

    Ok(client)
}

/// Extract the text of a document file by its extension
fn read_document_text(path: &Path) -> anyhow::Result<String> {
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
        anyhow::bail!("Unsupported file format: .{}", ext);
    }

    let data = std::fs::read(path).with_context(|| format!("cannot read '{}'", path.display()))?;
    Ok(FileParser::extract(file_type, &filename, &data)?)
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
