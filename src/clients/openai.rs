use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Settings, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
use crate::error::{AppError, Result};
use crate::hooks::Prompt;

/// Sampling and sizing knobs for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            // Creative variation over determinism.
            temperature: 0.8,
            max_tokens: 1000,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    }
}

/// Fixed-delay retry on transport failures and non-success statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, delay: DEFAULT_RETRY_DELAY }
    }
}

#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the text of the first completion choice.
    async fn complete(&self, prompt: &Prompt, params: &ModelParams) -> Result<String>;
}

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
    debug_prompts: bool,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
            debug_prompts: false,
        }
    }

    /// Fails fast when no credential is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings
            .openai_api_key
            .clone()
            .ok_or_else(|| AppError::Configuration("Missing OPENAI_API_KEY".into()))?;
        Ok(Self::new(api_key, settings.openai_base_url.clone())
            .with_retry(RetryPolicy {
                max_attempts: settings.llm_max_attempts,
                delay: settings.llm_retry_delay,
            })
            .with_debug_prompts(settings.debug_prompts))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = RetryPolicy { max_attempts: retry.max_attempts.max(1), ..retry };
        self
    }

    pub fn with_debug_prompts(mut self, enabled: bool) -> Self {
        self.debug_prompts = enabled;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> std::result::Result<ChatResponse, AttemptError> {
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let preview: String = text.chars().take(200).collect();
            return Err(AttemptError::Retryable(format!("OpenAI API error: {status}: {preview}")));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| AttemptError::Fatal(format!("unexpected response shape: {e}")))
    }
}

enum AttemptError {
    Retryable(String),
    Fatal(String),
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &Prompt, params: &ModelParams) -> Result<String> {
        if self.debug_prompts {
            debug_log_preview(&prompt.system, &prompt.user);
        }

        let body = ChatRequest {
            model: &params.model,
            messages: vec![
                ChatMessage { role: "system", content: &prompt.system },
                ChatMessage { role: "user", content: &prompt.user },
            ],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
        };

        let mut last_error = String::from("no attempt made");
        for attempt in 1..=self.retry.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.retry.delay).await;
            }

            match self.send_once(&body).await {
                Ok(resp) => {
                    let content = resp
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.message.content)
                        .filter(|c| !c.trim().is_empty());
                    return content.ok_or_else(|| {
                        AppError::MalformedUpstreamResponse("no completion content returned".into())
                    });
                }
                Err(AttemptError::Fatal(msg)) => return Err(AppError::MalformedUpstreamResponse(msg)),
                Err(AttemptError::Retryable(msg)) => {
                    warn!(attempt, max_attempts = self.retry.max_attempts, error = %msg, "completion attempt failed");
                    last_error = msg;
                }
            }
        }

        Err(AppError::UpstreamUnavailable(format!(
            "gave up after {} attempts: {last_error}",
            self.retry.max_attempts
        )))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn debug_log_preview(system: &str, user: &str) {
    debug!(system_len = system.len(), user_len = user.len(), "prompt sizes");
    debug!(preview = %system.chars().take(80).collect::<String>(), "system preview");
    debug!(preview = %user.chars().take(80).collect::<String>(), "user preview");
}
