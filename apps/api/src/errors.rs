use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::jobs::JobPostingError;
use crate::llm_client::LlmError;
use crate::resume::ingest::IngestError;
use crate::resume::normalize::NormalizeError;
use crate::resume::versioning::VersionError;
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Job posting error: {0}")]
    JobPosting(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The completion service declined to answer: prompt over budget or
    /// reply truncated.
    pub fn input_too_long() -> Self {
        AppError::Validation("input is too long".to_string())
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e.to_string())
    }
}

impl From<NormalizeError> for AppError {
    fn from(e: NormalizeError) -> Self {
        match e {
            NormalizeError::Llm(e) => e.into(),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Empty => AppError::Validation(e.to_string()),
            IngestError::TooLong => AppError::input_too_long(),
            IngestError::Transcription { raw } => AppError::UnprocessableEntity(raw),
            IngestError::Llm(e) => e.into(),
            IngestError::Normalize(e) => e.into(),
        }
    }
}

impl From<VersionError> for AppError {
    fn from(e: VersionError) -> Self {
        match e {
            VersionError::NoVersions { .. } => AppError::NotFound(e.to_string()),
            _ => AppError::Validation(e.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(id) => AppError::NotFound(format!("Session {id} not found")),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<JobPostingError> for AppError {
    fn from(e: JobPostingError) -> Self {
        match e {
            JobPostingError::NotConfigured => AppError::ServiceUnavailable(e.to_string()),
            JobPostingError::InvalidJobReference(_) => AppError::Validation(e.to_string()),
            other => AppError::JobPosting(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::JobPosting(msg) => {
                tracing::error!("Job posting error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "JOB_POSTING_ERROR",
                    "The job posting could not be retrieved".to_string(),
                )
            }
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                msg.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
