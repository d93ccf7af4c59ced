//! Core data model: chunks, chunk metadata, persisted vector records,
//! and the report shapes returned by the pipelines.
//!
//! Chunk metadata is a typed struct rather than a free-form map. Each
//! strategy fills only the fields it defines (`headers` for markdown,
//! `paragraphs` for semantic, `original_headers` for hybrid re-splits);
//! absent fields are omitted from serialized output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The four supported chunking strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    Fixed,
    Markdown,
    Semantic,
    Hybrid,
}

impl ChunkStrategy {
    /// All strategies, in canonical order.
    pub const ALL: [ChunkStrategy; 4] = [
        ChunkStrategy::Fixed,
        ChunkStrategy::Markdown,
        ChunkStrategy::Semantic,
        ChunkStrategy::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStrategy::Fixed => "fixed",
            ChunkStrategy::Markdown => "markdown",
            ChunkStrategy::Semantic => "semantic",
            ChunkStrategy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "fixed" => Ok(ChunkStrategy::Fixed),
            "markdown" => Ok(ChunkStrategy::Markdown),
            "semantic" => Ok(ChunkStrategy::Semantic),
            "hybrid" => Ok(ChunkStrategy::Hybrid),
            other => Err(Error::InvalidStrategy(other.to_string())),
        }
    }
}

/// Matched heading text for a markdown-derived chunk, without the
/// `#` markers. All levels are optional; a preamble section before the
/// first heading carries an empty `Headers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h3: Option<String>,
}

impl Headers {
    pub fn is_empty(&self) -> bool {
        self.h1.is_none() && self.h2.is_none() && self.h3.is_none()
    }

    /// Reconstruct the heading trail, one heading per line with its
    /// original marker (`"# A\n## B"`). `None` when no heading is set.
    pub fn trail(&self) -> Option<String> {
        let mut lines = Vec::new();
        if let Some(h) = &self.h1 {
            lines.push(format!("# {}", h));
        }
        if let Some(h) = &self.h2 {
            lines.push(format!("## {}", h));
        }
        if let Some(h) = &self.h3 {
            lines.push(format!("### {}", h));
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

/// Descriptive metadata attached to every [`Chunk`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Strategy that produced this chunk. After a fallback this is the
    /// strategy that actually ran (`fixed`), not the one requested.
    pub strategy: ChunkStrategy,
    /// Character count of the chunk text. Always equals
    /// `text.chars().count()`.
    pub chunk_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    /// Number of source paragraphs merged into this chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraphs: Option<usize>,
    /// For hybrid re-splits: the parent markdown section's headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_headers: Option<Headers>,
}

/// A contiguous slice of a document's text plus metadata, the unit of
/// embedding and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Build a chunk for `strategy`, deriving `chunk_size` from the text.
    pub fn new(text: impl Into<String>, strategy: ChunkStrategy) -> Self {
        let text = text.into();
        let chunk_size = text.chars().count();
        Chunk {
            text,
            metadata: ChunkMetadata {
                strategy,
                chunk_size,
                headers: None,
                paragraphs: None,
                original_headers: None,
            },
        }
    }
}

/// Metadata persisted alongside each vector record. The chunk-level
/// fields are flattened so the serialized form is a single flat map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub document_id: String,
    pub title: String,
    /// Copy of the chunk text for display. May be truncated when the
    /// serialized metadata would exceed the index's size cap; the
    /// canonical text used for embedding never is.
    pub chunk_text: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    #[serde(flatten)]
    pub chunk: ChunkMetadata,
}

/// A persisted vector record: id, embedding values, and metadata.
/// Field names match the wire format of the vector index API, so the
/// record serializes directly into an upsert request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: RecordMetadata,
}

/// A similarity-search result row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    pub document_id: String,
    pub title: String,
    pub chunk_text: String,
    pub chunk_index: usize,
    /// Backend similarity score; higher is more similar.
    pub score: f32,
}

/// Result of a successful ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionReport {
    pub document_id: String,
    /// The strategy the caller requested (individual chunks may record
    /// `fixed` when the fallback ran).
    pub strategy: ChunkStrategy,
    pub chunks_created: usize,
    pub average_chunk_size: f64,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    pub message: String,
}

/// Confirmation returned by chunk deletion. Deletion is best-effort;
/// this is returned even when the underlying delete failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionReport {
    pub document_id: String,
    pub message: String,
}

/// Provenance entry for one match that contributed answer context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub document_id: String,
    pub title: String,
    pub score: f32,
}

/// A synthesized answer with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerReport {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
    /// Number of matches included in the generation context.
    pub context_used: usize,
}

/// Per-strategy statistics produced by strategy comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyReport {
    pub chunks_count: usize,
    pub average_size: f64,
    pub min_size: usize,
    pub max_size: usize,
    /// First three chunk texts, truncated to 200 characters.
    pub sample_chunks: Vec<String>,
}
