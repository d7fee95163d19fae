/// LLM Client: the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: gpt-3.5-turbo (hardcoded, as is the context window it is sized for)
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::retry::{retry_transient, RetryPolicy};

pub mod prompts;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for all LLM calls.
pub const MODEL: &str = "gpt-3.5-turbo";
/// Context window of [`MODEL`], in tokens.
pub const TOKEN_LIMIT: usize = 4096;
/// Prompts estimated above this share of the window are refused locally.
const TOKEN_BUDGET_RATIO: f64 = 0.9;
/// Every message is framed as `<|start|>{role}\n{content}<|end|>\n`.
const TOKENS_PER_MESSAGE: usize = 4;
/// Every reply is primed with `<|start|>assistant<|message|>`.
const REPLY_PRIMING_TOKENS: usize = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    n: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatResponse {
    /// Collects the text of every choice. A choice cut off at the length
    /// limit poisons the whole response, as does an empty choice list.
    pub fn replies(self) -> Option<Vec<String>> {
        if self
            .choices
            .iter()
            .any(|c| c.finish_reason.as_deref() == Some("length"))
        {
            return None;
        }
        let replies: Vec<String> = self
            .choices
            .into_iter()
            .map(|c| c.message.content.unwrap_or_default())
            .collect();
        if replies.is_empty() {
            None
        } else {
            Some(replies)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Approximate prompt size. Roughly four characters per token plus the chat
/// framing overhead; precise enough to refuse prompts that cannot fit.
pub fn estimate_tokens(messages: &[ChatMessage]) -> usize {
    messages
        .iter()
        .map(|m| TOKENS_PER_MESSAGE + m.content.chars().count().div_ceil(4) + 1)
        .sum::<usize>()
        + REPLY_PRIMING_TOKENS
}

pub fn exceeds_token_budget(messages: &[ChatMessage]) -> bool {
    estimate_tokens(messages) as f64 > TOKEN_LIMIT as f64 * TOKEN_BUDGET_RATIO
}

/// The single LLM client used by all services.
/// Wraps the chat-completions API with timeout retry.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(300))
                .build()?,
            api_key,
            retry: RetryPolicy::default(),
        })
    }

    /// Requests `n` completions for `messages`.
    ///
    /// Returns `Ok(None)` when the prompt is too large for the model or any
    /// completion was truncated. Request timeouts are retried per the
    /// client's [`RetryPolicy`]; every other failure is returned immediately.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        n: u32,
    ) -> Result<Option<Vec<String>>, LlmError> {
        if exceeds_token_budget(messages) {
            warn!(
                "Prompt of ~{} tokens exceeds {}% of the {} token window, not sending",
                estimate_tokens(messages),
                (TOKEN_BUDGET_RATIO * 100.0) as u32,
                TOKEN_LIMIT
            );
            return Ok(None);
        }

        let request_body = ChatRequest {
            model: MODEL,
            messages,
            temperature: temperature.clamp(0.0, 1.0),
            n: n.max(1),
        };

        let response = retry_transient(
            &self.retry,
            "LLM call",
            |e: &reqwest::Error| e.is_timeout(),
            || {
                self.client
                    .post(OPENAI_API_URL)
                    .bearer_auth(&self.api_key)
                    .json(&request_body)
                    .send()
            },
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatResponse = serde_json::from_slice(&response.bytes().await?)?;

        if let Some(usage) = &completion.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}, total_tokens={}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let replies = completion.replies();
        if replies.is_none() {
            warn!("LLM completion was truncated or empty");
        }
        Ok(replies)
    }

    /// Convenience wrapper for a single completion.
    pub async fn complete_one(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<Option<String>, LlmError> {
        Ok(self
            .complete(messages, temperature, 1)
            .await?
            .and_then(|replies| replies.into_iter().next()))
    }
}
