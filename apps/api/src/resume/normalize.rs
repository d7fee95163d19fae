//! Résumé normalization: heterogeneous JSON in, canonical [`Document`] out.
//!
//! Flow: assemble → per-experience normalize → per-project normalize.
//! Each field is first looked up locally through [`FieldAlias`]; when the
//! local value is missing or unreliable, exactly one [`ResumeQueries`] call
//! fills it and its result is accepted as-is.

use std::collections::HashSet;

use chrono::Month;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::llm_client::LlmError;
use crate::resume::fields::FieldAlias;
use crate::resume::models::{Document, Experience, Project};
use crate::resume::queries::ResumeQueries;

/// Delimiters tried when skills arrive as one string, in tie-break order.
const SKILL_DELIMITERS: [char; 3] = [',', ';', '|'];
/// Leading tokens transcriptions prepend to project titles.
const TITLE_PREFIXES: [&str; 2] = ["Project:", "The project name is "];
const DESCRIPTION_PREFIX: &str = "Project:";

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("LLM fallback failed: {0}")]
    Llm(#[from] LlmError),
}

/// Builds a [`Document`] from a raw résumé mapping.
pub async fn assemble(
    raw: &Value,
    queries: &dyn ResumeQueries,
) -> Result<Document, NormalizeError> {
    let statement = FieldAlias::Statement
        .resolve(raw)
        .map(value_to_text)
        .unwrap_or_default();

    let skills = FieldAlias::Skills
        .resolve(raw)
        .map(skills_from_value)
        .unwrap_or_default();

    let mut experiences = Vec::new();
    if let Some(value) = FieldAlias::Experiences.resolve(raw) {
        for exp in as_list(value) {
            experiences.push(normalize_experience(exp, queries).await?);
        }
    }

    debug!(
        "Assembled document: {} skills, {} experiences",
        skills.len(),
        experiences.len()
    );

    Ok(Document {
        statement,
        skills,
        experiences,
    })
}

/// Normalizes one experience record.
///
/// A record that already carries a `uuid` and parses as an [`Experience`] is
/// returned as-is, so re-normalizing never changes identity.
pub async fn normalize_experience(
    raw: &Value,
    queries: &dyn ResumeQueries,
) -> Result<Experience, NormalizeError> {
    if raw.get("uuid").is_some() {
        if let Ok(existing) = serde_json::from_value::<Experience>(raw.clone()) {
            return Ok(existing);
        }
    }

    let title = resolve_text(raw, FieldAlias::ExperienceTitle);
    let company = resolve_text(raw, FieldAlias::Company);
    let date_range = date_range(raw);

    let projects = match FieldAlias::Projects.resolve(raw) {
        None => vec![normalize_project(raw, queries).await?],
        Some(value) => {
            let mut projects = Vec::new();
            for project in as_list(value) {
                projects.push(normalize_project(project, queries).await?);
            }
            if projects.is_empty() {
                projects.push(normalize_project(raw, queries).await?);
            }
            projects
        }
    };

    Ok(Experience {
        uuid: Uuid::new_v4(),
        title,
        company,
        date_range,
        projects,
    })
}

/// Normalizes a project record, or synthesizes a project from an experience
/// record that has none.
pub async fn normalize_project(
    raw: &Value,
    queries: &dyn ResumeQueries,
) -> Result<Project, NormalizeError> {
    if let Some(existing) = already_normalized(raw) {
        return Ok(existing);
    }

    let title = FieldAlias::ProjectTitle.resolve(raw).map(value_to_text);
    let description = FieldAlias::ProjectDescription.resolve(raw).map(value_to_text);

    // Compared after cleaning: quotes or a `Project:` prefix can hide equality.
    let (title, description) = match description {
        Some(description) if title.as_deref() != Some(description.as_str()) => {
            let cleaned =
                clean_title_and_description(title.as_deref().unwrap_or_default(), &description);
            if cleaned.0 != cleaned.1 {
                cleaned
            } else {
                ask_title_and_description(&cleaned.0, queries).await?
            }
        }
        conflated => {
            let ambiguous = title.or(conflated).unwrap_or_default();
            ask_title_and_description(&ambiguous, queries).await?
        }
    };

    let contributions = match FieldAlias::Contributions.resolve(raw) {
        Some(value) => contributions_from_value(value),
        None => {
            debug!("No contributions for project {title:?}, asking LLM");
            queries
                .project_contributions(&title)
                .await?
                .map(|reply| clean_contribution_lines(&reply))
                .unwrap_or_default()
        }
    };

    Ok(Project {
        uuid: Uuid::new_v4(),
        title,
        description,
        contributions,
    })
}

async fn ask_title_and_description(
    ambiguous: &str,
    queries: &dyn ResumeQueries,
) -> Result<(String, String), NormalizeError> {
    debug!("Project title/description unreliable, asking LLM: {ambiguous:?}");
    let title = queries
        .project_title(ambiguous)
        .await?
        .unwrap_or_default();
    let description = queries
        .project_description(&title)
        .await?
        .unwrap_or_default();
    Ok(clean_title_and_description(&title, &description))
}

fn already_normalized(raw: &Value) -> Option<Project> {
    raw.get("uuid")?;
    let project: Project = serde_json::from_value(raw.clone()).ok()?;
    (!project.title.is_empty() && project.description != project.title).then_some(project)
}

/// Splits a one-line skill list on whichever of `,`, `;`, `|` yields the most
/// parts. Ties go to the comma, then the semicolon.
pub fn split_skills(text: &str) -> Vec<String> {
    let delimiter = SKILL_DELIMITERS
        .iter()
        .copied()
        .fold((SKILL_DELIMITERS[0], 0), |best, d| {
            let parts = text.split(d).count();
            if parts > best.1 {
                (d, parts)
            } else {
                best
            }
        })
        .0;
    text.split(delimiter).map(str::to_string).collect()
}

/// Flattens any skills shape into trimmed, non-empty, case-insensitively
/// unique entries.
pub fn skills_from_value(value: &Value) -> Vec<String> {
    let mut raw = Vec::new();
    collect_skills(value, &mut raw);

    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

fn collect_skills(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => map.values().for_each(|v| collect_skills(v, out)),
        Value::Array(items) => items.iter().for_each(|v| match v {
            Value::String(s) => out.push(s.clone()),
            other => collect_skills(other, out),
        }),
        Value::String(s) => out.extend(split_skills(s)),
        Value::Null => {}
        other => out.push(other.to_string()),
    }
}

/// Formats `start`/`end` year-month objects as `"Jan 2020 - Jun 2022"`, with
/// `Present` for an open end. Falls back to a date-range field, then to
/// `start_date - end_date`.
pub fn date_range(raw: &Value) -> String {
    if let Some(start) = FieldAlias::Start.resolve(raw).and_then(year_month) {
        let end = match FieldAlias::End.resolve(raw) {
            None | Some(Value::Null) => "Present".to_string(),
            Some(end) => year_month(end).unwrap_or_else(|| value_to_text(end)),
        };
        return format!("{start} - {end}");
    }

    if let Some(range) = FieldAlias::DateRange.resolve(raw) {
        return value_to_text(range);
    }

    let start = FieldAlias::StartDate.resolve(raw).map(value_to_text);
    let end = FieldAlias::EndDate.resolve(raw).map(value_to_text);
    match (start, end) {
        (None, None) => String::new(),
        (start, end) => format!(
            "{} - {}",
            start.unwrap_or_default(),
            end.unwrap_or_default()
        ),
    }
}

fn year_month(value: &Value) -> Option<String> {
    let year = value.get("year").map(value_to_text)?;
    let month = match value.get("month") {
        None | Some(Value::Null) => return Some(year),
        Some(m) => m,
    };
    let label = as_u8(month)
        .and_then(|n| Month::try_from(n).ok())
        .map(|m| m.name()[..3].to_string())
        .unwrap_or_else(|| value_to_text(month));
    Some(format!("{label} {year}"))
}

fn as_u8(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Drops the title from the front of the description and strips the
/// transcription tokens and wrapping quotes from the title.
fn clean_title_and_description(title: &str, description: &str) -> (String, String) {
    let title = title.trim();
    let mut description = description.trim();
    if !title.is_empty() {
        description = description.strip_prefix(title).unwrap_or(description).trim();
    }
    let description = description
        .strip_prefix(DESCRIPTION_PREFIX)
        .unwrap_or(description)
        .trim()
        .to_string();

    let mut title = title;
    for prefix in TITLE_PREFIXES {
        title = title.strip_prefix(prefix).unwrap_or(title).trim();
    }
    (unquote(title).to_string(), description)
}

fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

fn contributions_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|c| !c.trim().is_empty())
            .collect(),
        Value::String(s) => s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Null => Vec::new(),
        other => vec![value_to_text(other)],
    }
}

/// One contribution per reply line, keeping only ASCII letters, digits and
/// spaces.
pub fn clean_contribution_lines(reply: &str) -> Vec<String> {
    reply
        .trim()
        .lines()
        .map(|line| {
            line.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
                .collect::<String>()
        })
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn resolve_text(raw: &Value, field: FieldAlias) -> String {
    field.resolve(raw).map(value_to_text).unwrap_or_default()
}

fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        single => vec![single],
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
