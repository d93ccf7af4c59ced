//! Document chunking.
//!
//! Four strategies over the same input text:
//!
//! | Strategy   | Boundary                                      |
//! |------------|-----------------------------------------------|
//! | `fixed`    | recursive character split, 500 chars / 50 overlap |
//! | `markdown` | heading sections, large bodies re-split       |
//! | `semantic` | paragraph groups under 600 chars              |
//! | `hybrid`   | markdown sections, oversized ones re-split on paragraphs |
//!
//! Chunking is pure and deterministic: the same content and strategy
//! always produce the same chunks, and the input is never modified.
//! A strategy that produces no chunks falls back to `fixed`; only
//! empty or whitespace-only input yields zero chunks.

mod fixed;
mod hybrid;
mod markdown;
mod semantic;
mod splitter;

use std::collections::BTreeMap;

use crate::models::{Chunk, ChunkStrategy, StrategyReport};

/// Characters of chunk text included in comparison samples.
const SAMPLE_CHARS: usize = 200;

/// Split `content` with the given strategy.
pub fn chunk(content: &str, strategy: ChunkStrategy) -> Vec<Chunk> {
    match strategy {
        ChunkStrategy::Fixed => fixed::split_fixed(content),
        ChunkStrategy::Markdown => with_fixed_fallback(markdown::split_markdown(content), content),
        ChunkStrategy::Semantic => with_fixed_fallback(semantic::split_semantic(content), content),
        ChunkStrategy::Hybrid => hybrid::split_hybrid(content),
    }
}

/// Replace an empty strategy result with the fixed splitter's output
/// for the same content. Chunks produced this way report `fixed` as
/// their strategy.
fn with_fixed_fallback(chunks: Vec<Chunk>, content: &str) -> Vec<Chunk> {
    if chunks.is_empty() {
        fixed::split_fixed(content)
    } else {
        chunks
    }
}

/// Run every strategy over `content` and summarize the results, keyed
/// by strategy in canonical order.
pub fn compare_strategies(content: &str) -> BTreeMap<ChunkStrategy, StrategyReport> {
    ChunkStrategy::ALL
        .iter()
        .map(|&strategy| (strategy, strategy_report(chunk(content, strategy))))
        .collect()
}

fn strategy_report(chunks: Vec<Chunk>) -> StrategyReport {
    let sizes: Vec<usize> = chunks.iter().map(|c| c.metadata.chunk_size).collect();
    let average_size = if sizes.is_empty() {
        0.0
    } else {
        sizes.iter().sum::<usize>() as f64 / sizes.len() as f64
    };
    StrategyReport {
        chunks_count: chunks.len(),
        average_size,
        min_size: sizes.iter().copied().min().unwrap_or(0),
        max_size: sizes.iter().copied().max().unwrap_or(0),
        sample_chunks: chunks
            .iter()
            .take(3)
            .map(|c| sample_text(&c.text))
            .collect(),
    }
}

fn sample_text(text: &str) -> String {
    let prefix: String = text.chars().take(SAMPLE_CHARS).collect();
    format!("{}...", prefix)
}
