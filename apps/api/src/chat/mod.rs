//! Free-form conversation with the model, optionally seeded with the job and
//! the candidate's chosen skills and experiences.
//!
//! The history is kept on the session. Every entry can be edited or
//! deselected; only selected entries are sent with the next message.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::complete_single;
use crate::llm_client::prompts::CAREER_COACH_ROLE;
use crate::llm_client::{ChatMessage, LlmClient, Role};
use crate::resume::selection::{choose_skills, chosen_experiences};
use crate::session::Session;

pub mod handlers;

pub const DEFAULT_CHAT_TEMPERATURE: f32 = 0.5;

/// Where an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// The role the model is asked to play.
    System,
    /// Background pulled from the session.
    Info,
    Input,
    Reply,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub kind: EntryKind,
    pub role: Role,
    pub content: String,
    /// Unselected entries stay in the history but are not sent.
    pub selected: bool,
}

impl ChatEntry {
    fn new(kind: EntryKind, role: Role, content: impl Into<String>) -> Self {
        Self {
            kind,
            role,
            content: content.into(),
            selected: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatPreset {
    CareerCoach,
    HiringManager,
    DutchToEnglish,
    EnglishToChinese,
    DutchToChinese,
}

impl ChatPreset {
    pub const ALL: [ChatPreset; 5] = [
        ChatPreset::CareerCoach,
        ChatPreset::HiringManager,
        ChatPreset::DutchToEnglish,
        ChatPreset::EnglishToChinese,
        ChatPreset::DutchToChinese,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChatPreset::CareerCoach => "Career coach",
            ChatPreset::HiringManager => "Hiring manager",
            ChatPreset::DutchToEnglish => "NL to EN",
            ChatPreset::EnglishToChinese => "EN to CN",
            ChatPreset::DutchToChinese => "NL to CN",
        }
    }

    pub fn system_role(self) -> &'static str {
        match self {
            ChatPreset::CareerCoach => CAREER_COACH_ROLE,
            ChatPreset::HiringManager => {
                "You are a hiring manager. You are shortlisting candidates for a job"
            }
            ChatPreset::DutchToEnglish => {
                "You are a translator, who is an expert to translate Dutch to English. \
                 You will translate all my messages to English."
            }
            ChatPreset::EnglishToChinese => {
                "You are a translator, who is an expert to translate English to Chinese. \
                 You will translate all my messages to Chinese."
            }
            ChatPreset::DutchToChinese => {
                "You are a translator, who is an expert to translate Dutch to Chinese. \
                 You will translate all my messages to Chinese."
            }
        }
    }
}

/// Job description, chosen skills and chosen experiences as `info` entries.
/// Whatever the session does not have yet is skipped.
pub fn background(session: &Session) -> Result<Vec<ChatEntry>, AppError> {
    let mut entries = Vec::new();

    let job_description = session.job_description.trim();
    if !job_description.is_empty() {
        entries.push(ChatEntry::new(
            EntryKind::Info,
            Role::User,
            format!("The job description is follows: \n{job_description}"),
        ));
    }

    if let Some(document) = &session.document {
        let skills = choose_skills(document, &session.chosen_skills);
        if !skills.is_empty() {
            entries.push(ChatEntry::new(
                EntryKind::Info,
                Role::User,
                format!("I will give you my skills as follows: \n {}", skills.join(", ")),
            ));
        }

        let experiences =
            chosen_experiences(document, &session.versions, &session.chosen_projects);
        if !experiences.is_empty() {
            let experiences_json = serde_json::to_string(&experiences)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("experience encoding failed: {e}")))?;
            entries.push(ChatEntry::new(
                EntryKind::Info,
                Role::User,
                format!("I will give you my experiences as follows: \n{experiences_json}"),
            ));
        }
    }
    Ok(entries)
}

/// A fresh history: the system role (when non-blank), then the background
/// when requested.
pub fn start_conversation(
    session: &Session,
    system_role: Option<&str>,
    with_background: bool,
) -> Result<Vec<ChatEntry>, AppError> {
    let mut history = Vec::new();
    if let Some(role) = system_role.map(str::trim).filter(|r| !r.is_empty()) {
        history.push(ChatEntry::new(EntryKind::System, Role::System, role));
    }
    if with_background {
        history.extend(background(session)?);
    }
    Ok(history)
}

pub fn selected_messages(history: &[ChatEntry]) -> Vec<ChatMessage> {
    history
        .iter()
        .filter(|e| e.selected)
        .map(|e| ChatMessage {
            role: e.role,
            content: e.content.clone(),
        })
        .collect()
}

/// Sends `text` with every selected entry and appends both the input and the
/// reply. The history is untouched when the call fails.
pub async fn send_message(
    llm: &LlmClient,
    history: &mut Vec<ChatEntry>,
    text: &str,
    temperature: f32,
) -> Result<String, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("message is empty".to_string()));
    }
    let input = ChatEntry::new(EntryKind::Input, Role::User, text);

    let mut messages = selected_messages(history);
    messages.push(ChatMessage::user(text));
    let reply = complete_single(llm, "Chat", &messages, temperature).await?;
    info!("Chat reply: {} chars after {} messages", reply.len(), messages.len());

    history.push(input);
    history.push(ChatEntry::new(EntryKind::Reply, Role::Assistant, reply.clone()));
    Ok(reply)
}

/// Rewrites or (de)selects one entry.
pub fn edit_entry(
    history: &mut [ChatEntry],
    index: usize,
    content: Option<String>,
    selected: Option<bool>,
) -> Result<(), AppError> {
    let entry = history
        .get_mut(index)
        .ok_or_else(|| AppError::NotFound(format!("Chat message {index} not found")))?;
    if let Some(content) = content {
        entry.content = content;
    }
    if let Some(selected) = selected {
        entry.selected = selected;
    }
    Ok(())
}

/// The user's inputs and the replies, separated by blank lines.
pub fn transcript(history: &[ChatEntry]) -> String {
    history
        .iter()
        .filter(|e| matches!(e.kind, EntryKind::Input | EntryKind::Reply))
        .map(|e| e.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
