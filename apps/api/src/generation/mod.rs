// Tailoring engine: rewrites, skill ranking, job analysis, motivation letter.
// All LLM calls go through llm_client; every reply is post-processed with extract.

pub mod handlers;
pub mod job;
pub mod letter;
pub mod prompts;
pub mod rewrite;
pub mod skills;

use crate::errors::AppError;
use crate::llm_client::{ChatMessage, LlmClient};

/// `n` completions, or a validation error when the service declined the
/// prompt as too long.
pub(crate) async fn complete_many(
    llm: &LlmClient,
    task: &str,
    messages: &[ChatMessage],
    temperature: f32,
    n: u32,
) -> Result<Vec<String>, AppError> {
    llm.complete(messages, temperature, n)
        .await
        .map_err(|e| AppError::Llm(format!("{task} failed: {e}")))?
        .ok_or_else(AppError::input_too_long)
}

pub(crate) async fn complete_single(
    llm: &LlmClient,
    task: &str,
    messages: &[ChatMessage],
    temperature: f32,
) -> Result<String, AppError> {
    complete_many(llm, task, messages, temperature, 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(AppError::input_too_long)
}

/// The code-tagged part of a reply, or the whole reply trimmed.
pub(crate) fn code_or_reply(reply: &str) -> String {
    crate::extract::extract_code(reply)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| reply.trim().to_string())
}
