//! CLI command handlers.
//!
//! One-shot counterparts of the HTTP surface: each handler builds the
//! configured backends, runs one pipeline operation, and prints a
//! plain-text report. `compare` is pure chunking and needs no config
//! or backends at all.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use ragline_core::chunk;
use ragline_core::ingest::IngestionPipeline;
use ragline_core::models::ChunkStrategy;
use ragline_core::retrieve::RetrievalPipeline;

use crate::config::Config;
use crate::embedding::create_embedder;
use crate::generation::create_generator;
use crate::vector_index::create_index;

/// Characters of chunk text shown per search result.
const EXCERPT_CHARS: usize = 160;

/// Build both pipelines over the configured backends, mirroring
/// server startup so CLI and server behave identically.
fn build_pipelines(config: &Config) -> Result<(IngestionPipeline, RetrievalPipeline)> {
    let embedder = create_embedder(&config.embedding)?;
    let index = create_index(&config.index)?;
    let generator = create_generator(&config.generation)?;

    let ingestion = IngestionPipeline::new(Arc::clone(&embedder), Arc::clone(&index))
        .with_batching(config.embedding.batch_size, config.embedding.max_concurrency);
    let retrieval = RetrievalPipeline::new(embedder, index, generator);
    Ok((ingestion, retrieval))
}

// ============ ragline ingest ============

/// Chunk, embed, and index a document file.
///
/// `document_id` and `title` default to the file stem when not given.
pub async fn run_ingest(
    config: &Config,
    file: &Path,
    document_id: Option<String>,
    title: Option<String>,
    strategy: &str,
) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read document file: {}", file.display()))?;
    let strategy: ChunkStrategy = strategy.parse()?;

    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string();
    let document_id = document_id.unwrap_or_else(|| stem.clone());
    let title = title.unwrap_or(stem);

    let (ingestion, _) = build_pipelines(config)?;
    let report = ingestion
        .ingest(&document_id, &title, &content, strategy)
        .await?;

    println!(
        "Ingested '{}' with strategy '{}'.",
        report.document_id, report.strategy
    );
    println!("  chunks:     {}", report.chunks_created);
    println!("  avg size:   {:.1} chars", report.average_chunk_size);
    println!(
        "  min / max:  {} / {}",
        report.min_chunk_size, report.max_chunk_size
    );
    Ok(())
}

// ============ ragline search ============

/// Similarity search over the index; prints ranked matches.
pub async fn run_search(config: &Config, query: &str, top_k: Option<usize>) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }
    let top_k = top_k.unwrap_or(config.retrieval.default_top_k);
    if top_k == 0 {
        bail!("top_k must be at least 1");
    }

    let (_, retrieval) = build_pipelines(config)?;
    let results = retrieval.search(query, top_k).await?;

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, m) in results.iter().enumerate() {
        println!("{}. [{:.2}] {} / {}", i + 1, m.score, m.document_id, m.title);
        println!("    chunk {}: \"{}\"", m.chunk_index, excerpt(&m.chunk_text));
        println!();
    }
    Ok(())
}

// ============ ragline ask ============

/// Answer a question from retrieved context; prints the answer and
/// its sources. `document_ids` restricts retrieval when non-empty.
pub async fn run_ask(config: &Config, question: &str, document_ids: Vec<String>) -> Result<()> {
    if question.trim().is_empty() {
        bail!("Question must not be empty");
    }
    if !config.generation.is_enabled() {
        bail!("Command 'ask' requires generation. Set [generation] provider in config.");
    }

    let (_, retrieval) = build_pipelines(config)?;
    let filter = if document_ids.is_empty() {
        None
    } else {
        Some(document_ids)
    };
    let report = retrieval.answer(question, filter.as_deref()).await?;

    println!("{}", report.answer);
    if !report.sources.is_empty() {
        println!();
        println!("Sources:");
        for (i, s) in report.sources.iter().enumerate() {
            println!("  {}. [{:.2}] {} / {}", i + 1, s.score, s.document_id, s.title);
        }
    }
    Ok(())
}

// ============ ragline delete ============

/// Delete a document's records from the index.
pub async fn run_delete(config: &Config, document_id: &str) -> Result<()> {
    if document_id.trim().is_empty() {
        bail!("document_id must not be empty");
    }

    let (ingestion, _) = build_pipelines(config)?;
    let report = ingestion.delete_document(document_id).await;
    println!("{}", report.message);
    Ok(())
}

// ============ ragline compare ============

/// Run every chunking strategy over a document file and print a
/// per-strategy statistics table. No backends are touched.
pub fn run_compare(file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read document file: {}", file.display()))?;
    let reports = chunk::compare_strategies(&content);

    println!(
        "  {:<10} {:>7} {:>10} {:>7} {:>7}",
        "STRATEGY", "CHUNKS", "AVG SIZE", "MIN", "MAX"
    );
    println!("  {}", "-".repeat(46));
    for (strategy, report) in &reports {
        println!(
            "  {:<10} {:>7} {:>10.1} {:>7} {:>7}",
            strategy.as_str(),
            report.chunks_count,
            report.average_size,
            report.min_size,
            report.max_size
        );
    }
    Ok(())
}

/// Single-line excerpt of chunk text for terminal display.
fn excerpt(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() <= EXCERPT_CHARS {
        flat.to_string()
    } else {
        let prefix: String = flat.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", prefix)
    }
}
