//! Vector index abstraction.
//!
//! | Operation            | Purpose                                  |
//! |----------------------|------------------------------------------|
//! | `upsert`             | insert or overwrite records by id        |
//! | `query`              | top-k similarity search, optional filter |
//! | `delete_by_document` | drop all records for one document        |

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{RecordMetadata, VectorRecord};

/// Metadata filter applied to a similarity query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFilter {
    /// Match records whose `document_id` is one of the given ids.
    DocumentIds(Vec<String>),
}

impl QueryFilter {
    pub fn matches(&self, metadata: &RecordMetadata) -> bool {
        match self {
            QueryFilter::DocumentIds(ids) => ids.iter().any(|id| *id == metadata.document_id),
        }
    }
}

/// A similarity hit.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub id: String,
    /// Backend similarity score; higher is more similar.
    pub score: f32,
    pub metadata: RecordMetadata,
}

/// A vector index backend. Records are keyed by id; upserting an
/// existing id overwrites it.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()>;

    /// Return up to `top_k` records most similar to `vector`, highest
    /// score first, restricted to `filter` when one is given.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&QueryFilter>,
    ) -> Result<Vec<ScoredRecord>>;

    async fn delete_by_document(&self, document_id: &str) -> Result<()>;
}
