//! LLM fallbacks used while normalizing a résumé.
//!
//! Normalization never talks to the completion client directly; it asks a
//! [`ResumeQueries`] capability. Production wires in [`LlmResumeQueries`];
//! tests substitute a recorder.

use async_trait::async_trait;
use tracing::debug;

use crate::extract::{extract_by_quotation_mark, extract_code, strip_json_fences};
use crate::llm_client::{ChatMessage, LlmClient, LlmError};
use crate::resume::prompts::{
    project_contributions_messages, project_description_messages, project_title_messages,
    transcription_messages,
};

/// Temperature for extraction queries: stick to what the résumé says.
const EXTRACTION_TEMPERATURE: f32 = 0.1;

/// Each method returns the extracted reply text, or `None` when the model
/// produced nothing usable. No method retries on an unusable reply.
#[async_trait]
pub trait ResumeQueries: Send + Sync {
    /// JSON transcription of a free-text résumé (raw, undecoded).
    async fn transcribe(&self, resume_text: &str) -> Result<Option<String>, LlmError>;

    /// A clean project title for an ambiguous title/description value.
    async fn project_title(&self, project_info: &str) -> Result<Option<String>, LlmError>;

    /// The project description that sits under `title` in the résumé.
    async fn project_description(&self, title: &str) -> Result<Option<String>, LlmError>;

    /// Newline-separated key contributions for the project named `title`.
    async fn project_contributions(&self, title: &str) -> Result<Option<String>, LlmError>;
}

/// [`ResumeQueries`] backed by the completion service, grounded in the
/// résumé text the user submitted.
pub struct LlmResumeQueries<'a> {
    llm: &'a LlmClient,
    resume_text: &'a str,
}

impl<'a> LlmResumeQueries<'a> {
    pub fn new(llm: &'a LlmClient, resume_text: &'a str) -> Self {
        Self { llm, resume_text }
    }

    async fn ask(&self, messages: Vec<ChatMessage>) -> Result<Option<String>, LlmError> {
        self.llm
            .complete_one(&messages, EXTRACTION_TEMPERATURE)
            .await
    }
}

#[async_trait]
impl<'a> ResumeQueries for LlmResumeQueries<'a> {
    async fn transcribe(&self, resume_text: &str) -> Result<Option<String>, LlmError> {
        debug!("Transcribing resume of {} chars", resume_text.len());
        let reply = self.ask(transcription_messages(resume_text)).await?;
        Ok(reply.map(|r| {
            // Bare JSON would be mangled by the post-colon fallback.
            if serde_json::from_str::<serde_json::Value>(strip_json_fences(&r)).is_ok() {
                r
            } else {
                extract_code(&r).unwrap_or(r)
            }
        }))
    }

    async fn project_title(&self, project_info: &str) -> Result<Option<String>, LlmError> {
        let reply = self
            .ask(project_title_messages(self.resume_text, project_info))
            .await?;
        Ok(reply.and_then(|r| extract_code(&r).or_else(|| extract_by_quotation_mark(&r))))
    }

    async fn project_description(&self, title: &str) -> Result<Option<String>, LlmError> {
        let reply = self
            .ask(project_description_messages(self.resume_text, title))
            .await?;
        Ok(reply.and_then(|r| extract_code(&r)))
    }

    async fn project_contributions(&self, title: &str) -> Result<Option<String>, LlmError> {
        let reply = self
            .ask(project_contributions_messages(self.resume_text, title))
            .await?;
        Ok(reply.and_then(|r| extract_code(&r)))
    }
}
