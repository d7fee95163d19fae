//! Axum route handlers for résumé analysis, editing, selection and export.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::resume::ingest::{analyse_resume, ResumeSource};
use crate::resume::models::Document;
use crate::resume::queries::LlmResumeQueries;
use crate::resume::selection::{
    choose_contributions, choose_description, choose_statement, export_payload, ExportPayload,
};
use crate::resume::versioning::{VersionBook, VersionRef, VersionedField};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyseRequest {
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyseResponse {
    pub source: ResumeSource,
    pub document: Document,
}

#[derive(Debug, Serialize)]
pub struct ResumeResponse {
    pub document: Document,
    pub versions: VersionBook,
    pub sorted_skills: Vec<String>,
    pub generated_skills: Vec<String>,
    pub chosen_skills: Vec<String>,
    pub chosen_projects: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct EditStatementRequest {
    pub statement: String,
}

#[derive(Debug, Deserialize)]
pub struct EditProjectRequest {
    pub description: Option<String>,
    pub contributions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SelectVersionRequest {
    pub field: VersionedField,
    pub entity: Option<Uuid>,
    pub version: VersionRef,
}

#[derive(Debug, Serialize)]
pub struct SelectVersionResponse {
    pub field: VersionedField,
    pub entity: Option<Uuid>,
    pub version: usize,
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct ChooseSkillsRequest {
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChooseProjectsRequest {
    pub project_ids: Vec<Uuid>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/resume/analyse
///
/// Accepts résumé JSON or free text and replaces the session's document.
pub async fn handle_analyse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnalyseRequest>,
) -> Result<Json<AnalyseResponse>, AppError> {
    let mut session = state.sessions.load(id).await?;

    let analysed = {
        let queries = LlmResumeQueries::new(&state.llm, &request.resume_text);
        analyse_resume(&request.resume_text, &queries).await?
    };
    info!(
        "Session {id}: analysed resume ({:?}, {} experiences)",
        analysed.source,
        analysed.document.experiences.len()
    );

    let document = analysed.document.clone();
    session.replace_document(request.resume_text, analysed.document);
    state.sessions.save(&session).await?;

    Ok(Json(AnalyseResponse {
        source: analysed.source,
        document,
    }))
}

/// GET /api/v1/sessions/:id/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeResponse>, AppError> {
    let session = state.sessions.load(id).await?;
    let document = session.document()?.clone();
    Ok(Json(ResumeResponse {
        document,
        versions: session.versions,
        sorted_skills: session.sorted_skills,
        generated_skills: session.generated_skills,
        chosen_skills: session.chosen_skills,
        chosen_projects: session.chosen_projects,
    }))
}

/// PATCH /api/v1/sessions/:id/resume/statement
pub async fn handle_edit_statement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<EditStatementRequest>,
) -> Result<StatusCode, AppError> {
    let mut session = state.sessions.load(id).await?;
    session.document()?;

    if let Some(versions) = session.versions.statement.as_mut() {
        versions.set_original(request.statement.clone());
    }
    if let Some(document) = session.document.as_mut() {
        document.statement = request.statement;
    }

    state.sessions.save(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/sessions/:id/projects/:pid
pub async fn handle_edit_project(
    State(state): State<AppState>,
    Path((id, project_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<EditProjectRequest>,
) -> Result<StatusCode, AppError> {
    let mut session = state.sessions.load(id).await?;
    session.document()?;

    let project = session
        .document
        .as_mut()
        .and_then(|d| d.find_project_mut(project_id))
        .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))?;

    if let Some(description) = request.description {
        project.description = description.clone();
        if let Some(versions) = session.versions.descriptions.get_mut(&project_id) {
            versions.set_original(description);
        }
    }
    if let Some(contributions) = request.contributions {
        project.contributions = contributions.clone();
        if let Some(versions) = session.versions.contributions.get_mut(&project_id) {
            versions.set_original(contributions);
        }
    }

    state.sessions.save(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/select
///
/// Moves the selection cursor of one versioned field. Version 0 is the
/// analysed (or last edited) text.
pub async fn handle_select_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectVersionRequest>,
) -> Result<Json<SelectVersionResponse>, AppError> {
    let mut session = state.sessions.load(id).await?;
    let index = request.version.index()?;
    session
        .versions
        .select(request.field, request.entity, index)?;

    let document = session.document()?;
    let project = || {
        request
            .entity
            .and_then(|pid| document.find_project(pid))
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    };
    let value = match request.field {
        VersionedField::Statement => json!(choose_statement(document, &session.versions)),
        VersionedField::Description => {
            json!(choose_description(project()?, &session.versions))
        }
        VersionedField::Contributions => {
            json!(choose_contributions(project()?, &session.versions))
        }
    };

    state.sessions.save(&session).await?;
    Ok(Json(SelectVersionResponse {
        field: request.field,
        entity: request.entity,
        version: index,
        value,
    }))
}

/// PUT /api/v1/sessions/:id/skills/chosen
///
/// An empty list means "export every skill".
pub async fn handle_choose_skills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChooseSkillsRequest>,
) -> Result<StatusCode, AppError> {
    let mut session = state.sessions.load(id).await?;
    session.document()?;

    let mut chosen: Vec<String> = Vec::new();
    for skill in request.skills {
        let skill = skill.trim();
        if !skill.is_empty() && !chosen.iter().any(|c| c.eq_ignore_ascii_case(skill)) {
            chosen.push(skill.to_string());
        }
    }
    session.chosen_skills = chosen;

    state.sessions.save(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/projects/chosen
///
/// An empty list means "export every project".
pub async fn handle_choose_projects(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChooseProjectsRequest>,
) -> Result<StatusCode, AppError> {
    let mut session = state.sessions.load(id).await?;
    let document = session.document()?;

    if let Some(unknown) = request
        .project_ids
        .iter()
        .find(|pid| document.find_project(**pid).is_none())
    {
        return Err(AppError::NotFound(format!("Project {unknown} not found")));
    }
    session.chosen_projects = request.project_ids;

    state.sessions.save(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:id/export
///
/// Values for the résumé template's `{statement}`, `{competencies}` and
/// `{experiences}` placeholders.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExportPayload>, AppError> {
    let session = state.sessions.load(id).await?;
    let document = session.document()?;
    Ok(Json(export_payload(
        document,
        &session.versions,
        &session.chosen_skills,
        &session.chosen_projects,
    )))
}
