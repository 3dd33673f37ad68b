//! HTTP completion client for an Anthropic-style messages endpoint.

use super::ports::{CompletionPort, CompletionRequest, CompletionResponse, CompletionUsage};
use crate::errors::CompletionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Configuration for [`HttpCompletionClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpCompletionConfig {
    /// Messages endpoint URL.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for HttpCompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_ms: 120_000,
        }
    }
}

impl HttpCompletionConfig {
    /// Sets the endpoint URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the API key variable.
    #[must_use]
    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = name.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// A [`CompletionPort`] over HTTP.
///
/// Failures map onto [`CompletionError`] so the retry policy can classify
/// them. The client performs exactly one request per call.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    client: reqwest::Client,
    config: HttpCompletionConfig,
    api_key: String,
}

impl HttpCompletionClient {
    /// Creates a client, reading the API key from the configured variable.
    pub fn from_env(config: HttpCompletionConfig) -> Result<Self, CompletionError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            CompletionError::Provider(format!(
                "API key not found in environment variable '{}'",
                config.api_key_env
            ))
        })?;
        Self::new(config, api_key)
    }

    /// Creates a client with an explicit API key.
    pub fn new(config: HttpCompletionConfig, api_key: impl Into<String>) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CompletionError::Provider(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &HttpCompletionConfig {
        &self.config
    }

    fn body(&self, request: CompletionRequest) -> MessagesRequest {
        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: request.max_tokens,
            system: (!request.system_prompt.is_empty()).then_some(request.system_prompt),
            messages: vec![WireMessage {
                role: "user",
                content: request.user_prompt,
            }],
        }
    }

    fn map_transport(&self, err: &reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout(self.config.timeout())
        } else {
            CompletionError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl CompletionPort for HttpCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        debug!(
            model = %self.config.model,
            max_tokens = request.max_tokens,
            timeout_ms = self.config.timeout_ms,
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| self.map_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;
        body.into_completion()
    }
}

fn status_error(status: u16, body: &str) -> CompletionError {
    let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if status == 429 {
        CompletionError::RateLimited(body)
    } else {
        CompletionError::Http { status, body }
    }
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
    usage: Option<WireUsage>,
}

impl MessagesResponse {
    fn into_completion(self) -> Result<CompletionResponse, CompletionError> {
        let content: String = self
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();
        if content.is_empty() {
            return Err(CompletionError::MalformedResponse(
                "response contained no text content".to_string(),
            ));
        }
        Ok(CompletionResponse {
            content,
            model: self.model,
            usage: self
                .usage
                .map(|u| CompletionUsage {
                    input_tokens: u.input_tokens,
                    output_tokens: u.output_tokens,
                })
                .unwrap_or_default(),
        })
    }
}
