use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::chat::{
    edit_entry, send_message, start_conversation, transcript, ChatEntry, ChatPreset,
    DEFAULT_CHAT_TEMPERATURE,
};
use crate::errors::AppError;
use crate::session::Session;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PresetResponse {
    pub preset: ChatPreset,
    pub label: &'static str,
    pub system_role: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct StartChatRequest {
    pub preset: Option<ChatPreset>,
    /// Custom system role; cannot be combined with `preset`.
    pub role: Option<String>,
    #[serde(default = "default_background")]
    pub background: bool,
}

impl Default for StartChatRequest {
    fn default() -> Self {
        Self {
            preset: None,
            role: None,
            background: true,
        }
    }
}

fn default_background() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct EditMessageRequest {
    pub content: Option<String>,
    pub selected: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub started: bool,
    pub messages: Vec<ChatEntry>,
    pub transcript: String,
}

impl From<&Session> for ChatResponse {
    fn from(session: &Session) -> Self {
        let messages = session.messages.clone().unwrap_or_default();
        Self {
            started: session.messages.is_some(),
            transcript: transcript(&messages),
            messages,
        }
    }
}

fn history(session: &mut Session) -> Result<&mut Vec<ChatEntry>, AppError> {
    session
        .messages
        .as_mut()
        .ok_or_else(|| AppError::Validation("the chat has not been started".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/chat/presets
pub async fn handle_list_presets() -> Json<Vec<PresetResponse>> {
    Json(
        ChatPreset::ALL
            .iter()
            .map(|&preset| PresetResponse {
                preset,
                label: preset.label(),
                system_role: preset.system_role(),
            })
            .collect(),
    )
}

/// GET /api/v1/sessions/:id/chat
pub async fn handle_get_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatResponse>, AppError> {
    let session = state.sessions.load(id).await?;
    Ok(Json(ChatResponse::from(&session)))
}

/// POST /api/v1/sessions/:id/chat
///
/// Starts (or restarts) the conversation.
pub async fn handle_start_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<StartChatRequest>>,
) -> Result<Json<ChatResponse>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let system_role = match (request.preset, request.role.as_deref()) {
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "choose either a preset or a custom role".to_string(),
            ))
        }
        (Some(preset), None) => Some(preset.system_role()),
        (None, role) => role,
    };

    let mut session = state.sessions.load(id).await?;
    session.messages = Some(start_conversation(
        &session,
        system_role,
        request.background,
    )?);
    info!("Session {id}: chat started");

    state.sessions.save(&session).await?;
    Ok(Json(ChatResponse::from(&session)))
}

/// POST /api/v1/sessions/:id/chat/messages
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let mut session = state.sessions.load(id).await?;
    send_message(
        &state.llm,
        history(&mut session)?,
        &request.content,
        request.temperature.unwrap_or(DEFAULT_CHAT_TEMPERATURE),
    )
    .await?;

    state.sessions.save(&session).await?;
    Ok(Json(ChatResponse::from(&session)))
}

/// PATCH /api/v1/sessions/:id/chat/messages/:index
pub async fn handle_edit_message(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(request): Json<EditMessageRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let mut session = state.sessions.load(id).await?;
    edit_entry(
        history(&mut session)?,
        index,
        request.content,
        request.selected,
    )?;

    state.sessions.save(&session).await?;
    Ok(Json(ChatResponse::from(&session)))
}

/// DELETE /api/v1/sessions/:id/chat
pub async fn handle_reset_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut session = state.sessions.load(id).await?;
    session.messages = None;
    state.sessions.save(&session).await?;
    info!("Session {id}: chat reset");
    Ok(StatusCode::NO_CONTENT)
}
