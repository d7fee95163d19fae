//! Alternative versions of the statement, a project description, or a
//! project's contributions, tailored to the job.
//!
//! Each generator asks for [`ALTERNATIVES`] completions in one call; callers
//! append the results to the session's `VersionBook`.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::extract::extract_html_list;
use crate::generation::prompts::{contributions_messages, description_messages, statement_messages};
use crate::generation::{code_or_reply, complete_many};
use crate::llm_client::LlmClient;
use crate::resume::models::{Experience, Project};

/// Completions requested per rewrite.
pub const ALTERNATIVES: u32 = 3;

/// Length and creativity knobs a client may override per request.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RewriteOptions {
    pub words: Option<u32>,
    pub temperature: Option<f32>,
    /// Contributions only: how many bullets each alternative should have.
    pub number: Option<u32>,
}

const STATEMENT_WORDS: u32 = 120;
const DESCRIPTION_WORDS: u32 = 60;
const CONTRIBUTION_WORDS: u32 = 25;
const CONTRIBUTION_COUNT: u32 = 3;
const REWRITE_TEMPERATURE: f32 = 0.8;

pub async fn statement_alternatives(
    llm: &LlmClient,
    job_description: &str,
    statement: &str,
    skills: &[String],
    experiences: &[Experience],
    options: RewriteOptions,
) -> Result<Vec<String>, AppError> {
    let experiences_json = serde_json::to_string(experiences)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("experience encoding failed: {e}")))?;
    let messages = statement_messages(
        job_description,
        skills,
        &experiences_json,
        statement,
        options.words.unwrap_or(STATEMENT_WORDS),
    );
    let replies = complete_many(
        llm,
        "Statement rewrite",
        &messages,
        options.temperature.unwrap_or(REWRITE_TEMPERATURE),
        ALTERNATIVES,
    )
    .await?;

    let statements = parse_text_alternatives(&replies);
    info!("Generated {} statement alternatives", statements.len());
    Ok(statements)
}

pub async fn description_alternatives(
    llm: &LlmClient,
    job_description: &str,
    project: &Project,
    options: RewriteOptions,
) -> Result<Vec<String>, AppError> {
    let messages = description_messages(
        job_description,
        project,
        options.words.unwrap_or(DESCRIPTION_WORDS),
    );
    let replies = complete_many(
        llm,
        "Description rewrite",
        &messages,
        options.temperature.unwrap_or(REWRITE_TEMPERATURE),
        ALTERNATIVES,
    )
    .await?;
    Ok(parse_text_alternatives(&replies))
}

pub async fn contribution_alternatives(
    llm: &LlmClient,
    job_description: &str,
    project: &Project,
    options: RewriteOptions,
) -> Result<Vec<Vec<String>>, AppError> {
    let messages = contributions_messages(
        job_description,
        project,
        options.words.unwrap_or(CONTRIBUTION_WORDS),
        options.number.unwrap_or(CONTRIBUTION_COUNT),
    );
    let replies = complete_many(
        llm,
        "Contributions rewrite",
        &messages,
        options.temperature.unwrap_or(REWRITE_TEMPERATURE),
        ALTERNATIVES,
    )
    .await?;
    Ok(replies
        .iter()
        .map(|reply| parse_contribution_list(reply))
        .filter(|items| !items.is_empty())
        .collect())
}

/// One alternative per non-empty reply, code tags removed.
pub fn parse_text_alternatives(replies: &[String]) -> Vec<String> {
    replies
        .iter()
        .map(|r| code_or_reply(r))
        .filter(|s| !s.is_empty())
        .collect()
}

/// `<li>` items of an HTML list reply (keeping `<b>` keyword markup). Replies
/// without list markup fall back to one item per non-empty line.
pub fn parse_contribution_list(reply: &str) -> Vec<String> {
    let body = code_or_reply(reply);
    match extract_html_list(&body) {
        Some(items) => items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        None => body
            .lines()
            .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_alternatives_strip_code_tags_and_drop_empty() {
        let replies = vec![
            "<code>Engineer who ships.</code>".to_string(),
            "<code>  </code>".to_string(),
            "Plain reply".to_string(),
        ];
        assert_eq!(
            parse_text_alternatives(&replies),
            vec!["Engineer who ships.", "Plain reply"]
        );
    }

    #[test]
    fn test_contribution_list_from_html() {
        let reply = "<code><ul>\n<li>Cut <b>latency</b> by 40%</li>\n<li> Built CI </li></ul></code>";
        assert_eq!(
            parse_contribution_list(reply),
            vec!["Cut <b>latency</b> by 40%", "Built CI"]
        );
    }

    #[test]
    fn test_contribution_list_falls_back_to_lines() {
        let reply = "- Cut latency\n\n* Built CI\n";
        assert_eq!(parse_contribution_list(reply), vec!["Cut latency", "Built CI"]);
    }

    #[test]
    fn test_options_deserialize_partially() {
        let options: RewriteOptions = serde_json::from_str(r#"{"words": 80}"#).unwrap();
        assert_eq!(options.words, Some(80));
        assert!(options.temperature.is_none());
    }
}
