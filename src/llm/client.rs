//! OpenAI-compatible completion client.
//!
//! Works with OpenAI, OpenRouter, Ollama, and other compatible APIs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::error::LlmError;
use super::types::{ChatRequest, ChatResponse};

/// A connection handle bound to one provider's endpoint and credential.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Issue one chat completion request.
    ///
    /// The timeout is best effort: implementations whose transport cannot
    /// bound a single call ignore it (see [`supports_timeout`]).
    ///
    /// [`supports_timeout`]: CompletionClient::supports_timeout
    async fn chat(
        &self,
        request: ChatRequest,
        timeout: Option<Duration>,
    ) -> Result<ChatResponse, LlmError>;

    /// Whether this client honors a per-request timeout.
    fn supports_timeout(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for dyn CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn CompletionClient")
    }
}

/// Completion client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiCompatibleClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatibleClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatibleClient {
    async fn chat(
        &self,
        request: ChatRequest,
        timeout: Option<Duration>,
    ) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key));

        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }

        let response = req.json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    fn supports_timeout(&self) -> bool {
        true
    }
}
