use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::{posting_to_text, resolve_job_id};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetJobRequest {
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct FetchJobRequest {
    /// A LinkedIn posting URL or a bare job id.
    pub job: String,
}

#[derive(Debug, Serialize)]
pub struct FetchJobResponse {
    pub job_id: String,
    pub job_description: String,
}

/// PUT /api/v1/sessions/:id/job
pub async fn handle_set_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetJobRequest>,
) -> Result<StatusCode, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    let mut session = state.sessions.load(id).await?;
    session.job_description = request.job_description;
    state.sessions.save(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/job/fetch
///
/// Looks the posting up and stores its text as the session's job description.
pub async fn handle_fetch_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<FetchJobRequest>,
) -> Result<Json<FetchJobResponse>, AppError> {
    let job_id = resolve_job_id(&request.job)?;
    let mut session = state.sessions.load(id).await?;

    let record = state
        .jobs
        .fetch_job_posting(&job_id)
        .await?
        .ok_or_else(|| AppError::UnprocessableEntity(format!("Job posting {job_id} is unavailable")))?;
    let job_description = posting_to_text(&record);
    if job_description.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "Job posting {job_id} has no description"
        )));
    }
    info!("Session {id}: fetched job posting {job_id}");

    session.job_description = job_description.clone();
    state.sessions.save(&session).await?;
    Ok(Json(FetchJobResponse {
        job_id,
        job_description,
    }))
}
