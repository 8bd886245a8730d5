use std::time::Duration;

use tripdesk_core::{env_non_empty, env_or, truncate};

use crate::ai_types::{ChatRequest, ChatResponse};
use crate::error::LlmError;

/// Default model when `TRIPDESK_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default OpenAI-compatible endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_RETRIES: usize = 3;
const RETRY_DELAYS: [u64; 4] = [0, 1, 2, 4];

/// Client for an OpenAI-compatible chat completion API.
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: String, base_url: &str) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
            model: env_or("TRIPDESK_MODEL", DEFAULT_MODEL),
        })
    }

    /// Build from `OPENAI_API_KEY` / `OPENAI_BASE_URL`. `Ok(None)` without a key.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_env() -> Result<Option<Self>, LlmError> {
        let Some(api_key) = env_non_empty("OPENAI_API_KEY") else {
            tracing::info!("OPENAI_API_KEY not set, AI features disabled");
            return Ok(None);
        };
        let base_url = env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL);
        Self::new(api_key, &base_url).map(Some)
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a chat completion request and return the first choice's content.
    ///
    /// Request errors and 429/5xx responses are retried with backoff.
    ///
    /// # Errors
    /// Returns an error on non-retryable status, unparseable body, empty
    /// choices, or when retries run out.
    pub(crate) async fn chat_completion(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_secs(RETRY_DELAYS.get(attempt).copied().unwrap_or(4));
                tracing::warn!(attempt, max = MAX_RETRIES, ?delay, "retrying chat completion");
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(format!("{}/v1/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(request)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::HttpRequest(e));
                    continue;
                },
            };

            let status = response.status();
            let body = match response.text().await {
                Ok(b) => b,
                Err(e) => {
                    last_error = Some(LlmError::HttpRequest(e));
                    continue;
                },
            };

            if !status.is_success() {
                let err = LlmError::HttpStatus { code: status.as_u16(), body: truncate(&body, 500).to_owned() };
                if err.is_transient() {
                    last_error = Some(err);
                    continue;
                }
                return Err(err);
            }

            let chat_response: ChatResponse =
                serde_json::from_str(&body).map_err(|e| LlmError::JsonParse {
                    context: format!("chat completion response (body: {})", truncate(&body, 200)),
                    source: e,
                })?;
            let first_choice = chat_response.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
            tracing::debug!(model = %self.model, chars = first_choice.message.content.len(), "chat completion");
            return Ok(first_choice.message.content);
        }

        Err(LlmError::RetriesExhausted(Box::new(last_error.unwrap_or(LlmError::EmptyResponse))))
    }
}
