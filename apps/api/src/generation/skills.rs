//! Skill ranking against the job, and ATS keyword generation.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::capitalize;
use crate::generation::prompts::{generate_skills_messages, sort_skills_messages};
use crate::generation::{code_or_reply, complete_single};
use crate::llm_client::LlmClient;

const SORT_TEMPERATURE: f32 = 0.2;
const GENERATE_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_KEYWORDS: u32 = 15;

/// Ranks `skills` by relevance to the job, most in-demand first.
pub async fn sort_skills(
    llm: &LlmClient,
    job_description: &str,
    skills: &[String],
) -> Result<Vec<String>, AppError> {
    if skills.is_empty() {
        return Ok(Vec::new());
    }
    let reply = complete_single(
        llm,
        "Skill ranking",
        &sort_skills_messages(job_description, skills),
        SORT_TEMPERATURE,
    )
    .await?;

    let ranked = parse_skills(&reply);
    if ranked.len() < skills.len() {
        warn!(
            "Skill ranking returned {} of {} skills",
            ranked.len(),
            skills.len()
        );
    }
    Ok(ranked)
}

/// ATS keywords the job description is likely screened on.
pub async fn generate_skills(
    llm: &LlmClient,
    job_description: &str,
    number: u32,
    temperature: Option<f32>,
) -> Result<Vec<String>, AppError> {
    let reply = complete_single(
        llm,
        "Keyword generation",
        &generate_skills_messages(job_description, number),
        temperature.unwrap_or(GENERATE_TEMPERATURE),
    )
    .await?;
    let keywords = parse_skills(&reply);
    info!("Generated {} ATS keywords", keywords.len());
    Ok(keywords)
}

/// Comma-separated reply → trimmed, capitalized, case-insensitively unique
/// skills.
pub fn parse_skills(reply: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    code_or_reply(reply)
        .split(',')
        .map(|s| s.trim().trim_end_matches('.'))
        .filter(|s| !s.is_empty())
        .map(capitalize)
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skills_from_code_tags() {
        assert_eq!(
            parse_skills("Here you go: <code>rust, Kubernetes , SQL.</code>"),
            vec!["Rust", "Kubernetes", "SQL"]
        );
    }

    #[test]
    fn test_parse_skills_dedupes_and_drops_empty() {
        assert_eq!(
            parse_skills("<code>Go, go, , Docker</code>"),
            vec!["Go", "Docker"]
        );
    }
}
