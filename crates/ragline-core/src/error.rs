//! Pipeline error taxonomy.
//!
//! Backend clients return `anyhow::Error`; the pipelines classify those
//! failures into this enum at the stage boundary so callers can map
//! them to exit codes or HTTP statuses without string matching.

use std::fmt;

use thiserror::Error;

/// External backend stage named in [`Error::UpstreamUnavailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Embedding,
    VectorStore,
    Generation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Embedding => "embedding",
            Stage::VectorStore => "vector-store",
            Stage::Generation => "generation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// The requested chunking strategy name is not recognized.
    #[error("unknown chunking strategy '{0}' (expected fixed, markdown, semantic, or hybrid)")]
    InvalidStrategy(String),

    /// Chunking produced no chunks, so there is nothing to ingest.
    #[error("document produced no chunks; content is empty or whitespace only")]
    EmptyDocument,

    /// An external backend failed after retries were exhausted.
    #[error("{stage} backend unavailable: {detail}")]
    UpstreamUnavailable { stage: Stage, detail: String },

    /// A vector-store upsert batch was rejected. Earlier batches may
    /// already be persisted.
    #[error("vector upsert failed at batch {batch_index}: {detail}")]
    UpsertFailed { batch_index: usize, detail: String },
}

impl Error {
    /// Wrap a backend client failure, keeping the formatted cause chain.
    pub fn upstream(stage: Stage, source: anyhow::Error) -> Self {
        Error::UpstreamUnavailable {
            stage,
            detail: format!("{:#}", source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
