//! Generation backend abstraction.

use anyhow::Result;
use async_trait::async_trait;

/// A chat-completion backend used for answer synthesis.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Model identifier, e.g. `"gpt-4"`.
    fn model_name(&self) -> &str;

    /// Produce a completion for the given system and user prompts.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}
