//! Vector index backends.
//!
//! - **[`PineconeIndex`]**: remote index over the Pinecone data-plane
//!   HTTP API (`/vectors/upsert`, `/query`, `/vectors/delete`), with
//!   retry and backoff. Requires `PINECONE_API_KEY`.
//! - in-memory: re-exports the core crate's `InMemoryIndex` through
//!   [`create_index`] for offline runs and tests.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use ragline_core::index::memory::InMemoryIndex;
use ragline_core::index::{QueryFilter, ScoredRecord, VectorIndex};
use ragline_core::models::{RecordMetadata, VectorRecord};

use crate::config::IndexConfig;
use crate::http;

/// Build the configured index backend.
///
/// | Config value | Backend |
/// |--------------|---------|
/// | `"pinecone"` | [`PineconeIndex`] |
/// | `"memory"`   | `InMemoryIndex` |
pub fn create_index(config: &IndexConfig) -> Result<Arc<dyn VectorIndex>> {
    match config.provider.as_str() {
        "pinecone" => Ok(Arc::new(PineconeIndex::new(config)?)),
        "memory" => Ok(Arc::new(InMemoryIndex::new())),
        other => bail!("Unknown index provider: {}", other),
    }
}

pub struct PineconeIndex {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    namespace: Option<String>,
    max_retries: u32,
}

impl PineconeIndex {
    /// # Errors
    ///
    /// Fails when `index.url` is missing or `PINECONE_API_KEY` is not
    /// set.
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let base_url = config
            .url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("index.url required for Pinecone provider"))?;
        let api_key = std::env::var("PINECONE_API_KEY")
            .map_err(|_| anyhow::anyhow!("PINECONE_API_KEY environment variable not set"))?;
        Ok(Self {
            client: http::build_client(config.timeout_secs)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            namespace: config.namespace.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        let headers = [("Api-Key", self.api_key.clone())];
        http::post_json(
            &self.client,
            &url,
            &headers,
            body,
            self.max_retries,
            "Pinecone API",
        )
        .await
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        let body = upsert_body(records, self.namespace.as_deref());
        self.post("/vectors/upsert", &body).await?;
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&QueryFilter>,
    ) -> Result<Vec<ScoredRecord>> {
        let body = query_body(vector, top_k, filter, self.namespace.as_deref());
        let json = self.post("/query", &body).await?;
        parse_query_response(&json)
    }

    async fn delete_by_document(&self, document_id: &str) -> Result<()> {
        let body = delete_body(document_id, self.namespace.as_deref());
        self.post("/vectors/delete", &body).await?;
        Ok(())
    }
}

fn with_namespace(mut body: serde_json::Value, namespace: Option<&str>) -> serde_json::Value {
    if let Some(ns) = namespace {
        body["namespace"] = serde_json::json!(ns);
    }
    body
}

fn upsert_body(records: &[VectorRecord], namespace: Option<&str>) -> serde_json::Value {
    with_namespace(serde_json::json!({ "vectors": records }), namespace)
}

fn query_body(
    vector: &[f32],
    top_k: usize,
    filter: Option<&QueryFilter>,
    namespace: Option<&str>,
) -> serde_json::Value {
    let mut body = serde_json::json!({
        "vector": vector,
        "topK": top_k,
        "includeMetadata": true,
    });
    if let Some(filter) = filter {
        body["filter"] = filter_json(filter);
    }
    with_namespace(body, namespace)
}

fn delete_body(document_id: &str, namespace: Option<&str>) -> serde_json::Value {
    with_namespace(
        serde_json::json!({ "filter": { "document_id": document_id } }),
        namespace,
    )
}

fn filter_json(filter: &QueryFilter) -> serde_json::Value {
    match filter {
        QueryFilter::DocumentIds(ids) => serde_json::json!({ "document_id": { "$in": ids } }),
    }
}

/// Extract `matches[]` as scored records.
fn parse_query_response(json: &serde_json::Value) -> Result<Vec<ScoredRecord>> {
    let matches = json
        .get("matches")
        .and_then(|m| m.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid query response: missing matches array"))?;

    let mut records = Vec::with_capacity(matches.len());
    for entry in matches {
        let id = entry
            .get("id")
            .and_then(|i| i.as_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid query response: match without id"))?
            .to_string();
        let score = entry
            .get("score")
            .and_then(|s| s.as_f64())
            .unwrap_or(0.0) as f32;
        let metadata: RecordMetadata = serde_json::from_value(
            entry
                .get("metadata")
                .cloned()
                .unwrap_or(serde_json::Value::Null),
        )
        .with_context(|| format!("Invalid query response: bad metadata for match '{}'", id))?;
        records.push(ScoredRecord {
            id,
            score,
            metadata,
        });
    }
    Ok(records)
}
