//! Ingestion pipeline: chunk, embed, and upsert a document.
//!
//! Embedding runs over batches with bounded concurrency; vectors are
//! reassembled in chunk order before records are built, so record ids
//! and `chunk_index` always line up with chunk positions. Upserts go
//! to the index in fixed-size batches, sequentially, and a rejected
//! batch aborts the run (earlier batches may already be persisted).
//!
//! Re-ingesting a document id overwrites records id-by-id. When the
//! new run produces fewer chunks than the old one, higher-index
//! records from the old run remain in the index; callers that need a
//! clean slate delete the document first.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::chunk;
use crate::embedding::Embedder;
use crate::error::{Error, Result, Stage};
use crate::index::VectorIndex;
use crate::models::{
    Chunk, ChunkStrategy, DeletionReport, IngestionReport, RecordMetadata, VectorRecord,
};

/// Records per vector-store upsert call.
const UPSERT_BATCH_SIZE: usize = 100;
/// Serialized record metadata above this size gets its `chunk_text`
/// truncated; remote indexes reject larger payloads.
const METADATA_MAX_BYTES: usize = 40_000;
/// Characters of `chunk_text` kept when truncating.
const METADATA_TEXT_PREFIX: usize = 1000;

const DEFAULT_EMBED_BATCH_SIZE: usize = 64;
const DEFAULT_EMBED_CONCURRENCY: usize = 4;

pub struct IngestionPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    embed_batch_size: usize,
    embed_concurrency: usize,
}

impl IngestionPipeline {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        IngestionPipeline {
            embedder,
            index,
            embed_batch_size: DEFAULT_EMBED_BATCH_SIZE,
            embed_concurrency: DEFAULT_EMBED_CONCURRENCY,
        }
    }

    /// Override embedding batch size and number of in-flight batches.
    /// Values are clamped to at least 1.
    pub fn with_batching(mut self, batch_size: usize, concurrency: usize) -> Self {
        self.embed_batch_size = batch_size.max(1);
        self.embed_concurrency = concurrency.max(1);
        self
    }

    /// Chunk `content`, embed every chunk, and upsert the records.
    pub async fn ingest(
        &self,
        document_id: &str,
        title: &str,
        content: &str,
        strategy: ChunkStrategy,
    ) -> Result<IngestionReport> {
        let chunks = chunk::chunk(content, strategy);
        if chunks.is_empty() {
            return Err(Error::EmptyDocument);
        }
        tracing::debug!(document_id, %strategy, chunks = chunks.len(), "chunked document");

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embed_all(&texts).await?;

        let total_chunks = chunks.len();
        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (chunk, values))| {
                build_record(document_id, title, chunk, i, total_chunks, values)
            })
            .collect();

        for (batch_index, batch) in records.chunks(UPSERT_BATCH_SIZE).enumerate() {
            self.index
                .upsert(batch)
                .await
                .map_err(|err| Error::UpsertFailed {
                    batch_index,
                    detail: format!("{:#}", err),
                })?;
        }
        tracing::info!(document_id, records = records.len(), "document ingested");

        let sizes: Vec<usize> = chunks.iter().map(|c| c.metadata.chunk_size).collect();
        Ok(IngestionReport {
            document_id: document_id.to_string(),
            strategy,
            chunks_created: total_chunks,
            average_chunk_size: sizes.iter().sum::<usize>() as f64 / sizes.len() as f64,
            min_chunk_size: sizes.iter().copied().min().unwrap_or(0),
            max_chunk_size: sizes.iter().copied().max().unwrap_or(0),
            message: "Document chunked and embedded successfully".to_string(),
        })
    }

    /// Delete all records for a document. Best-effort: a backend
    /// failure is logged and the report still returned, so deleting a
    /// document that was never ingested is not an error.
    pub async fn delete_document(&self, document_id: &str) -> DeletionReport {
        if let Err(err) = self.index.delete_by_document(document_id).await {
            tracing::warn!(
                document_id,
                error = %format!("{:#}", err),
                "vector index delete failed; reporting completion anyway"
            );
        }
        DeletionReport {
            document_id: document_id.to_string(),
            message: "Document chunks deleted successfully".to_string(),
        }
    }

    /// Embed `texts` in batches with bounded concurrency, preserving
    /// input order in the returned vectors.
    async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let batches: Vec<Vec<String>> = texts
            .chunks(self.embed_batch_size)
            .map(|batch| batch.to_vec())
            .collect();

        let per_batch: Vec<Vec<Vec<f32>>> = stream::iter(batches)
            .map(|batch| {
                let embedder = Arc::clone(&self.embedder);
                async move { embedder.embed(&batch).await }
            })
            .buffered(self.embed_concurrency)
            .try_collect()
            .await
            .map_err(|err| Error::upstream(Stage::Embedding, err))?;

        let vectors: Vec<Vec<f32>> = per_batch.into_iter().flatten().collect();
        if vectors.len() != texts.len() {
            return Err(Error::UpstreamUnavailable {
                stage: Stage::Embedding,
                detail: format!(
                    "expected {} vectors, backend returned {}",
                    texts.len(),
                    vectors.len()
                ),
            });
        }
        Ok(vectors)
    }
}

/// Record id for one chunk of a document.
pub fn record_id(document_id: &str, chunk_index: usize) -> String {
    format!("{}_chunk_{}", document_id, chunk_index)
}

fn build_record(
    document_id: &str,
    title: &str,
    chunk: &Chunk,
    chunk_index: usize,
    total_chunks: usize,
    values: Vec<f32>,
) -> VectorRecord {
    let mut metadata = RecordMetadata {
        document_id: document_id.to_string(),
        title: title.to_string(),
        chunk_text: chunk.text.clone(),
        chunk_index,
        total_chunks,
        chunk: chunk.metadata.clone(),
    };
    if serialized_len(&metadata) > METADATA_MAX_BYTES {
        let prefix: String = chunk.text.chars().take(METADATA_TEXT_PREFIX).collect();
        metadata.chunk_text = format!("{}...", prefix);
    }
    VectorRecord {
        id: record_id(document_id, chunk_index),
        values,
        metadata,
    }
}

fn serialized_len(metadata: &RecordMetadata) -> usize {
    serde_json::to_string(metadata).map_or(usize::MAX, |s| s.len())
}
