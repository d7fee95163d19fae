//! Résumé intake: raw text → JSON (direct parse or LLM transcription) →
//! [`assemble`].

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm_client::LlmError;
use crate::resume::fields::FieldAlias;
use crate::resume::models::Document;
use crate::resume::normalize::{assemble, NormalizeError};
use crate::resume::queries::ResumeQueries;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("resume text is empty")]
    Empty,
    #[error("input is too long")]
    TooLong,
    #[error("resume transcription is not valid JSON")]
    Transcription { raw: String },
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSource {
    /// The submitted text was already résumé JSON.
    Direct,
    /// The completion service transcribed free text into JSON.
    Transcribed,
}

#[derive(Debug)]
pub struct AnalysedResume {
    pub document: Document,
    pub source: ResumeSource,
}

/// Parses `text` as JSON only when it already has the résumé shape: an
/// object where statement, skills and experiences all resolve.
pub fn parse_direct(text: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let shaped = FieldAlias::Statement.resolve(&value).is_some()
        && FieldAlias::Skills.resolve(&value).is_some()
        && FieldAlias::Experiences.resolve(&value).is_some();
    shaped.then_some(value)
}

pub async fn analyse_resume(
    text: &str,
    queries: &dyn ResumeQueries,
) -> Result<AnalysedResume, IngestError> {
    if text.trim().is_empty() {
        return Err(IngestError::Empty);
    }

    if let Some(raw) = parse_direct(text) {
        info!("Resume submitted as JSON, skipping transcription");
        let document = assemble(&raw, queries).await?;
        return Ok(AnalysedResume {
            document,
            source: ResumeSource::Direct,
        });
    }

    debug!("Resume is free text, requesting transcription");
    let reply = queries
        .transcribe(text)
        .await?
        .ok_or(IngestError::TooLong)?;

    let raw: Value = match serde_json::from_str(crate::extract::strip_json_fences(&reply)) {
        Ok(value @ Value::Object(_)) => value,
        _ => {
            warn!("Transcription reply did not decode as a JSON object");
            return Err(IngestError::Transcription { raw: reply });
        }
    };

    let document = assemble(&raw, queries).await?;
    info!(
        "Resume transcribed: {} experiences, {} skills",
        document.experiences.len(),
        document.skills.len()
    );
    Ok(AnalysedResume {
        document,
        source: ResumeSource::Transcribed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::testing::{Call, RecordingQueries};

    #[test]
    fn test_parse_direct_requires_resume_shape() {
        assert!(parse_direct(r#"{"statement": "", "skills": [], "experiences": []}"#).is_some());
        assert!(parse_direct(r#"{"Profile": "", "Core Competencies": [], "work_experience": []}"#).is_some());
        assert!(parse_direct(r#"{"statement": "only"}"#).is_none());
        assert!(parse_direct("Jane Doe\nRust engineer").is_none());
        assert!(parse_direct("[1, 2]").is_none());
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let queries = RecordingQueries::new();
        let err = analyse_resume("   \n", &queries).await.unwrap_err();
        assert!(matches!(err, IngestError::Empty));
        assert!(queries.calls().is_empty());
    }

    #[tokio::test]
    async fn test_direct_json_skips_transcription() {
        let queries = RecordingQueries::new();
        let text = r#"{"statement": "Engineer.", "skills": "Rust, Go", "experiences": []}"#;
        let analysed = analyse_resume(text, &queries).await.unwrap();
        assert_eq!(analysed.source, ResumeSource::Direct);
        assert_eq!(analysed.document.skills, vec!["Rust", "Go"]);
        assert!(queries.calls().is_empty());
    }

    #[tokio::test]
    async fn test_free_text_is_transcribed_then_assembled() {
        let queries = RecordingQueries::new().with_transcription(
            r#"{"profile": "Builder.", "skills": ["Rust"], "experience": {
                "title": "Dev", "company": "Acme", "dates": "2020 - 2021",
                "projects": [{"title": "X", "description": "Built X", "contributions": ["Did A"]}]
            }}"#,
        );
        let analysed = analyse_resume("Jane Doe, Dev at Acme", &queries)
            .await
            .unwrap();
        assert_eq!(analysed.source, ResumeSource::Transcribed);
        assert_eq!(analysed.document.statement, "Builder.");
        assert_eq!(analysed.document.experiences.len(), 1);
        assert_eq!(queries.calls(), vec![Call::Transcribe]);
    }

    #[tokio::test]
    async fn test_undecodable_transcription_carries_raw_text() {
        let queries = RecordingQueries::new().with_transcription("Sorry, I cannot help.");
        let err = analyse_resume("Jane Doe", &queries).await.unwrap_err();
        match err {
            IngestError::Transcription { raw } => assert_eq!(raw, "Sorry, I cannot help."),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(queries.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_transcription_is_too_long() {
        let queries = RecordingQueries::new();
        let err = analyse_resume("Jane Doe", &queries).await.unwrap_err();
        assert!(matches!(err, IngestError::TooLong));
    }
}
