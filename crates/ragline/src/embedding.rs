//! Embedding backends.
//!
//! Two implementations of [`Embedder`]:
//! - **[`OpenAiEmbedder`]**: calls the OpenAI embeddings API with
//!   retry and backoff. Requires `OPENAI_API_KEY`.
//! - **[`HashEmbedder`]**: deterministic token-hash vectors with no
//!   network dependency. Texts sharing tokens get similar vectors,
//!   which is enough for local development and tests.
//!
//! Use [`create_embedder`] to build the configured backend.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use ragline_core::embedding::Embedder;

use crate::config::EmbeddingConfig;
use crate::http;

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";
const DEFAULT_OPENAI_DIMS: usize = 1536;
const DEFAULT_HASH_DIMS: usize = 256;

/// Build the configured embedding backend.
///
/// | Config value | Backend |
/// |--------------|---------|
/// | `"openai"`   | [`OpenAiEmbedder`] |
/// | `"hash"`     | [`HashEmbedder`] |
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiEmbedder::new(config)?)),
        "hash" => Ok(Arc::new(HashEmbedder::new(config))),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

// ============ OpenAI ============

/// Embedding backend using `POST /v1/embeddings`.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dims: usize,
    max_retries: u32,
}

impl OpenAiEmbedder {
    /// # Errors
    ///
    /// Fails when `OPENAI_API_KEY` is not set.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self {
            client: http::build_client(config.timeout_secs)?,
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            dims: config.dims.unwrap_or(DEFAULT_OPENAI_DIMS),
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });
        let headers = [("Authorization", format!("Bearer {}", self.api_key))];
        let json = http::post_json(
            &self.client,
            OPENAI_EMBEDDINGS_URL,
            &headers,
            &body,
            self.max_retries,
            "OpenAI embeddings API",
        )
        .await?;
        parse_embeddings_response(&json)
    }
}

/// Extract `data[].embedding` arrays in response order.
fn parse_embeddings_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid embeddings response: missing data array"))?;

    let mut embeddings = Vec::with_capacity(data.len());
    for item in data {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| anyhow::anyhow!("Invalid embeddings response: missing embedding"))?;
        let vec: Vec<f32> = embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        embeddings.push(vec);
    }
    Ok(embeddings)
}

// ============ Hash ============

/// Deterministic offline embedder.
///
/// Lowercased whitespace tokens are hashed into buckets and the bucket
/// counts L2-normalized. The same text always produces the same
/// vector, across processes and platforms.
pub struct HashEmbedder {
    model: String,
    dims: usize,
}

impl HashEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            model: config
                .model
                .clone()
                .unwrap_or_else(|| "token-hash".to_string()),
            dims: config.dims.unwrap_or(DEFAULT_HASH_DIMS),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut values = vec![0.0f32; self.dims];
        for token in text.to_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dims;
            values[bucket] += 1.0;
        }
        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut values {
                *value /= norm;
            }
        }
        values
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
