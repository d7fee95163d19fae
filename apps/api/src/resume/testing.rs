use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::LlmError;
use crate::resume::queries::ResumeQueries;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Transcribe,
    Title(String),
    Description(String),
    Contributions(String),
}

/// Canned replies plus a log of every query made, in order.
#[derive(Default)]
pub struct RecordingQueries {
    transcription: Option<String>,
    title: Option<String>,
    description: Option<String>,
    contributions: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingQueries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcription(mut self, reply: &str) -> Self {
        self.transcription = Some(reply.to_string());
        self
    }

    pub fn with_title(mut self, reply: &str) -> Self {
        self.title = Some(reply.to_string());
        self
    }

    pub fn with_description(mut self, reply: &str) -> Self {
        self.description = Some(reply.to_string());
        self
    }

    pub fn with_contributions(mut self, reply: &str) -> Self {
        self.contributions = Some(reply.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ResumeQueries for RecordingQueries {
    async fn transcribe(&self, _resume_text: &str) -> Result<Option<String>, LlmError> {
        self.record(Call::Transcribe);
        Ok(self.transcription.clone())
    }

    async fn project_title(&self, project_info: &str) -> Result<Option<String>, LlmError> {
        self.record(Call::Title(project_info.to_string()));
        Ok(self.title.clone())
    }

    async fn project_description(&self, title: &str) -> Result<Option<String>, LlmError> {
        self.record(Call::Description(title.to_string()));
        Ok(self.description.clone())
    }

    async fn project_contributions(&self, title: &str) -> Result<Option<String>, LlmError> {
        self.record(Call::Contributions(title.to_string()));
        Ok(self.contributions.clone())
    }
}
