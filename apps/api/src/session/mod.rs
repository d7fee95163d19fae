//! Per-user working state: the target job, the analysed résumé, every
//! generated alternative, the export choices, the motivation letter and the
//! chat history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::ChatEntry;
use crate::errors::AppError;
use crate::generation::letter::{letter_text, Paragraph};
use crate::resume::models::Document;
use crate::resume::versioning::VersionBook;

pub mod handlers;
pub mod store;

pub use store::{InMemorySessionStore, RedisSessionStore, SessionError, SessionStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub job_description: String,
    pub resume_text: String,
    pub document: Option<Document>,
    pub versions: VersionBook,
    /// Skills ranked against the job, most relevant first.
    pub sorted_skills: Vec<String>,
    /// ATS keywords generated from the job description.
    pub generated_skills: Vec<String>,
    pub chosen_skills: Vec<String>,
    pub chosen_projects: Vec<Uuid>,
    /// Motivation letter, one entry per paragraph.
    pub paragraphs: Vec<Paragraph>,
    /// `None` until a chat is started.
    pub messages: Option<Vec<ChatEntry>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            job_description: String::new(),
            resume_text: String::new(),
            document: None,
            versions: VersionBook::default(),
            sorted_skills: Vec::new(),
            generated_skills: Vec::new(),
            chosen_skills: Vec::new(),
            chosen_projects: Vec::new(),
            paragraphs: Vec::new(),
            messages: None,
        }
    }

    /// Replaces the analysed résumé. Every version and choice tied to the
    /// previous document is discarded.
    pub fn replace_document(&mut self, resume_text: String, document: Document) {
        self.resume_text = resume_text;
        self.document = Some(document);
        self.versions = VersionBook::default();
        self.sorted_skills.clear();
        self.chosen_skills.clear();
        self.chosen_projects.clear();
    }

    pub fn document(&self) -> Result<&Document, AppError> {
        self.document
            .as_ref()
            .ok_or_else(|| AppError::Validation("no resume has been analysed yet".to_string()))
    }

    /// The whole letter, or `None` when it has no text yet.
    pub fn letter(&self) -> Option<String> {
        let letter = letter_text(&self.paragraphs);
        (!letter.is_empty()).then_some(letter)
    }

    pub fn job_description(&self) -> Result<&str, AppError> {
        let jd = self.job_description.trim();
        if jd.is_empty() {
            return Err(AppError::Validation(
                "no job description has been set".to_string(),
            ));
        }
        Ok(jd)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
