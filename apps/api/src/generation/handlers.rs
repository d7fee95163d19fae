//! Axum route handlers for the tailoring API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::job::{estimate_match_rate, letter_file_stem, summarize_job};
use crate::generation::letter::{
    insert_paragraph, letter_text, paragraph_index, parse_letter, revise_paragraph,
    write_letter, write_paragraph, LetterInput, LetterMode, Paragraph,
};
use crate::generation::rewrite::{
    contribution_alternatives, description_alternatives, statement_alternatives, RewriteOptions,
};
use crate::generation::skills::{generate_skills, sort_skills, DEFAULT_KEYWORDS};
use crate::resume::models::Experience;
use crate::resume::selection::{choose_skills, choose_statement, chosen_experiences};
use crate::resume::versioning::Versioned;
use crate::session::Session;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Every version of a field after a rewrite; index 0 is the original.
#[derive(Debug, Serialize)]
pub struct VersionsResponse<T> {
    pub labels: Vec<String>,
    pub selected: usize,
    pub versions: Vec<T>,
}

impl<T: Clone> From<&Versioned<T>> for VersionsResponse<T> {
    fn from(v: &Versioned<T>) -> Self {
        Self {
            labels: v.labels(),
            selected: v.selected_index(),
            versions: std::iter::once(v.original().clone())
                .chain(v.alternatives().iter().cloned())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateSkillsRequest {
    pub number: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct MatchRateResponse {
    pub estimate: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LetterRequest {
    #[serde(default)]
    pub mode: LetterMode,
    /// Draft to revise; defaults to the session's last letter.
    pub draft: Option<String>,
    pub words: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct LetterResponse {
    pub letter: String,
    /// `Company_Role`, when the job description names both.
    pub file_stem: Option<String>,
    pub paragraphs: Vec<ParagraphView>,
}

#[derive(Debug, Serialize)]
pub struct ParagraphView {
    pub uuid: Uuid,
    pub content: String,
    pub words: usize,
}

impl From<&Paragraph> for ParagraphView {
    fn from(p: &Paragraph) -> Self {
        Self {
            uuid: p.uuid,
            content: p.content.clone(),
            words: p.words(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParagraphsResponse {
    pub paragraphs: Vec<ParagraphView>,
    pub letter: String,
    pub words: usize,
}

impl From<&[Paragraph]> for ParagraphsResponse {
    fn from(paragraphs: &[Paragraph]) -> Self {
        let views: Vec<ParagraphView> = paragraphs.iter().map(ParagraphView::from).collect();
        Self {
            words: views.iter().map(|p| p.words).sum(),
            letter: letter_text(paragraphs),
            paragraphs: views,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InsertParagraphRequest {
    /// Insert before this position; appends when absent.
    pub index: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct EditParagraphRequest {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ParagraphOptions {
    pub words: Option<u32>,
    pub temperature: Option<f32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/job/summary
pub async fn handle_job_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SummaryResponse>, AppError> {
    let session = state.sessions.load(id).await?;
    let summary = summarize_job(&state.llm, session.job_description()?).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// POST /api/v1/sessions/:id/statement/rewrite
pub async fn handle_rewrite_statement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    options: Option<Json<RewriteOptions>>,
) -> Result<Json<VersionsResponse<String>>, AppError> {
    let options = options.map(|Json(o)| o).unwrap_or_default();
    let mut session = state.sessions.load(id).await?;
    let document = session.document()?;

    let alternatives = statement_alternatives(
        &state.llm,
        session.job_description()?,
        &choose_statement(document, &session.versions),
        &document.skills,
        &document.experiences,
        options,
    )
    .await?;

    let statement = document.statement.clone();
    let versions = session.versions.statement_mut(&statement);
    versions.push_alternatives(alternatives);
    let response = VersionsResponse::from(&*versions);

    state.sessions.save(&session).await?;
    Ok(Json(response))
}

/// POST /api/v1/sessions/:id/projects/:pid/description/rewrite
pub async fn handle_rewrite_description(
    State(state): State<AppState>,
    Path((id, project_id)): Path<(Uuid, Uuid)>,
    options: Option<Json<RewriteOptions>>,
) -> Result<Json<VersionsResponse<String>>, AppError> {
    let options = options.map(|Json(o)| o).unwrap_or_default();
    let mut session = state.sessions.load(id).await?;
    let project = session
        .document()?
        .find_project(project_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))?;

    let alternatives =
        description_alternatives(&state.llm, session.job_description()?, &project, options)
            .await?;
    info!(
        "Session {id}: {} description alternatives for {project_id}",
        alternatives.len()
    );

    let versions = session
        .versions
        .description_mut(project_id, &project.description);
    versions.push_alternatives(alternatives);
    let response = VersionsResponse::from(&*versions);

    state.sessions.save(&session).await?;
    Ok(Json(response))
}

/// POST /api/v1/sessions/:id/projects/:pid/contributions/rewrite
pub async fn handle_rewrite_contributions(
    State(state): State<AppState>,
    Path((id, project_id)): Path<(Uuid, Uuid)>,
    options: Option<Json<RewriteOptions>>,
) -> Result<Json<VersionsResponse<Vec<String>>>, AppError> {
    let options = options.map(|Json(o)| o).unwrap_or_default();
    let mut session = state.sessions.load(id).await?;
    let project = session
        .document()?
        .find_project(project_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))?;

    let alternatives =
        contribution_alternatives(&state.llm, session.job_description()?, &project, options)
            .await?;

    let versions = session
        .versions
        .contributions_mut(project_id, &project.contributions);
    versions.push_alternatives(alternatives);
    let response = VersionsResponse::from(&*versions);

    state.sessions.save(&session).await?;
    Ok(Json(response))
}

/// POST /api/v1/sessions/:id/skills/sort
pub async fn handle_sort_skills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SkillsResponse>, AppError> {
    let mut session = state.sessions.load(id).await?;
    let skills = session.document()?.skills.clone();

    let sorted = sort_skills(&state.llm, session.job_description()?, &skills).await?;
    session.sorted_skills = sorted.clone();

    state.sessions.save(&session).await?;
    Ok(Json(SkillsResponse { skills: sorted }))
}

/// POST /api/v1/sessions/:id/skills/generate
pub async fn handle_generate_skills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<GenerateSkillsRequest>>,
) -> Result<Json<SkillsResponse>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let mut session = state.sessions.load(id).await?;

    let keywords = generate_skills(
        &state.llm,
        session.job_description()?,
        request.number.unwrap_or(DEFAULT_KEYWORDS),
        request.temperature,
    )
    .await?;
    session.generated_skills = keywords.clone();

    state.sessions.save(&session).await?;
    Ok(Json(SkillsResponse { skills: keywords }))
}

/// POST /api/v1/sessions/:id/match-rate
pub async fn handle_match_rate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchRateResponse>, AppError> {
    let session = state.sessions.load(id).await?;
    session.document()?;
    let estimate = estimate_match_rate(
        &state.llm,
        session.job_description()?,
        &session.resume_text,
    )
    .await?;
    Ok(Json(MatchRateResponse { estimate }))
}

/// POST /api/v1/sessions/:id/letter
///
/// Drafts (or revises) a motivation letter from the skills and projects
/// chosen for export, and splits it into paragraphs.
pub async fn handle_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<LetterRequest>>,
) -> Result<Json<LetterResponse>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let mut session = state.sessions.load(id).await?;
    let document = session.document()?;
    let job_description = session.job_description()?;

    let skills = choose_skills(document, &session.chosen_skills);
    let experiences = chosen_experiences(document, &session.versions, &session.chosen_projects);
    let input = LetterInput {
        job_description,
        skills: &skills,
        experiences: &experiences,
        words: request.words,
        temperature: request.temperature,
    };
    let current = session.letter();
    let draft = request.draft.as_deref().or(current.as_deref());
    let letter = write_letter(&state.llm, &input, request.mode, draft).await?;
    let file_stem = letter_file_stem(&state.llm, job_description).await;

    session.paragraphs = parse_letter(&letter);
    let paragraphs = session.paragraphs.iter().map(ParagraphView::from).collect();
    state.sessions.save(&session).await?;
    Ok(Json(LetterResponse {
        letter,
        file_stem,
        paragraphs,
    }))
}

/// GET /api/v1/sessions/:id/letter/paragraphs
pub async fn handle_get_paragraphs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ParagraphsResponse>, AppError> {
    let session = state.sessions.load(id).await?;
    Ok(Json(ParagraphsResponse::from(session.paragraphs.as_slice())))
}

/// POST /api/v1/sessions/:id/letter/paragraphs
///
/// Adds an empty paragraph, to be typed in or generated.
pub async fn handle_insert_paragraph(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<InsertParagraphRequest>>,
) -> Result<(StatusCode, Json<ParagraphsResponse>), AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let mut session = state.sessions.load(id).await?;
    let uuid = insert_paragraph(&mut session.paragraphs, request.index)?;
    info!("Session {id}: inserted paragraph {uuid}");

    state.sessions.save(&session).await?;
    Ok((
        StatusCode::CREATED,
        Json(ParagraphsResponse::from(session.paragraphs.as_slice())),
    ))
}

/// PATCH /api/v1/sessions/:id/letter/paragraphs/:pid
pub async fn handle_edit_paragraph(
    State(state): State<AppState>,
    Path((id, paragraph_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<EditParagraphRequest>,
) -> Result<Json<ParagraphsResponse>, AppError> {
    let mut session = state.sessions.load(id).await?;
    let index = paragraph_index(&session.paragraphs, paragraph_id)?;
    session.paragraphs[index].content = request.content;

    state.sessions.save(&session).await?;
    Ok(Json(ParagraphsResponse::from(session.paragraphs.as_slice())))
}

/// DELETE /api/v1/sessions/:id/letter/paragraphs/:pid
pub async fn handle_delete_paragraph(
    State(state): State<AppState>,
    Path((id, paragraph_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ParagraphsResponse>, AppError> {
    let mut session = state.sessions.load(id).await?;
    let index = paragraph_index(&session.paragraphs, paragraph_id)?;
    session.paragraphs.remove(index);

    state.sessions.save(&session).await?;
    Ok(Json(ParagraphsResponse::from(session.paragraphs.as_slice())))
}

/// The export choices a paragraph prompt is built from.
fn letter_choices(session: &Session) -> Result<(Vec<String>, Vec<Experience>), AppError> {
    let document = session.document()?;
    Ok((
        choose_skills(document, &session.chosen_skills),
        chosen_experiences(document, &session.versions, &session.chosen_projects),
    ))
}

/// POST /api/v1/sessions/:id/letter/paragraphs/:pid/generate
///
/// Writes the paragraph as a continuation of the ones before it.
pub async fn handle_generate_paragraph(
    State(state): State<AppState>,
    Path((id, paragraph_id)): Path<(Uuid, Uuid)>,
    options: Option<Json<ParagraphOptions>>,
) -> Result<Json<ParagraphsResponse>, AppError> {
    let options = options.map(|Json(o)| o).unwrap_or_default();
    let mut session = state.sessions.load(id).await?;
    let index = paragraph_index(&session.paragraphs, paragraph_id)?;
    let (skills, experiences) = letter_choices(&session)?;

    let input = LetterInput {
        job_description: session.job_description()?,
        skills: &skills,
        experiences: &experiences,
        words: options.words,
        temperature: options.temperature,
    };
    let content = write_paragraph(&state.llm, &input, &session.paragraphs, index).await?;

    session.paragraphs[index].content = content;
    state.sessions.save(&session).await?;
    Ok(Json(ParagraphsResponse::from(session.paragraphs.as_slice())))
}

/// POST /api/v1/sessions/:id/letter/paragraphs/:pid/revise
pub async fn handle_revise_paragraph(
    State(state): State<AppState>,
    Path((id, paragraph_id)): Path<(Uuid, Uuid)>,
    options: Option<Json<ParagraphOptions>>,
) -> Result<Json<ParagraphsResponse>, AppError> {
    let options = options.map(|Json(o)| o).unwrap_or_default();
    let mut session = state.sessions.load(id).await?;
    let index = paragraph_index(&session.paragraphs, paragraph_id)?;
    let (skills, experiences) = letter_choices(&session)?;

    let input = LetterInput {
        job_description: session.job_description()?,
        skills: &skills,
        experiences: &experiences,
        words: options.words,
        temperature: options.temperature,
    };
    let content = revise_paragraph(&state.llm, &input, &session.paragraphs[index].content).await?;

    session.paragraphs[index].content = content;
    state.sessions.save(&session).await?;
    Ok(Json(ParagraphsResponse::from(session.paragraphs.as_slice())))
}
