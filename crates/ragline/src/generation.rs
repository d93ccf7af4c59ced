//! Generation backends.
//!
//! - **[`OpenAiGenerator`]**: `POST /v1/chat/completions` with retry
//!   and backoff. Requires `OPENAI_API_KEY`.
//! - **[`DisabledGenerator`]**: always errors; the default when no
//!   generation backend is configured. Ingest and search still work.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use ragline_core::generation::Generator;

use crate::config::GenerationConfig;
use crate::http;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4";

/// Build the configured generation backend.
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiGenerator::new(config)?)),
        "disabled" => Ok(Arc::new(DisabledGenerator)),
        other => bail!("Unknown generation provider: {}", other),
    }
}

// ============ OpenAI ============

pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_retries: u32,
}

impl OpenAiGenerator {
    /// # Errors
    ///
    /// Fails when `OPENAI_API_KEY` is not set.
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self {
            client: http::build_client(config.timeout_secs)?,
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        let headers = [("Authorization", format!("Bearer {}", self.api_key))];
        let json = http::post_json(
            &self.client,
            OPENAI_CHAT_URL,
            &headers,
            &body,
            self.max_retries,
            "OpenAI chat API",
        )
        .await?;
        parse_chat_response(&json)
    }
}

/// Extract `choices[0].message.content`.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid chat response: missing choices[0].message.content"))
}

// ============ Disabled ============

/// Errors on every completion. Keeps ingest and search usable when no
/// generation backend is configured.
pub struct DisabledGenerator;

#[async_trait]
impl Generator for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        bail!("Generation provider is disabled; set generation.provider in the config")
    }
}
