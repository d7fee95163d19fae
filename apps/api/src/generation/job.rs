//! Job-description analysis: summary, résumé match estimate, company and
//! role identification.

use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::extract::extract_code;
use crate::generation::prompts::{company_role_messages, job_summary_messages, match_rate_messages};
use crate::generation::{code_or_reply, complete_single};
use crate::llm_client::LlmClient;

const SUMMARY_TEMPERATURE: f32 = 0.8;
const MATCH_RATE_TEMPERATURE: f32 = 0.5;
const COMPANY_ROLE_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyRole {
    pub company: String,
    pub role: String,
}

impl CompanyRole {
    /// `Company_Role`, for naming downloaded documents.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.company, self.role).replace(char::is_whitespace, "_")
    }
}

pub async fn summarize_job(llm: &LlmClient, job_description: &str) -> Result<String, AppError> {
    let reply = complete_single(
        llm,
        "Job summary",
        &job_summary_messages(job_description),
        SUMMARY_TEMPERATURE,
    )
    .await?;
    Ok(code_or_reply(&reply))
}

/// Free-text estimate of how well the résumé matches the job.
pub async fn estimate_match_rate(
    llm: &LlmClient,
    job_description: &str,
    resume_text: &str,
) -> Result<String, AppError> {
    let reply = complete_single(
        llm,
        "Match rate estimate",
        &match_rate_messages(job_description, resume_text),
        MATCH_RATE_TEMPERATURE,
    )
    .await?;
    Ok(reply.trim().to_string())
}

pub async fn company_and_role(
    llm: &LlmClient,
    job_description: &str,
) -> Result<Option<CompanyRole>, AppError> {
    let reply = complete_single(
        llm,
        "Company/role identification",
        &company_role_messages(job_description),
        COMPANY_ROLE_TEMPERATURE,
    )
    .await?;
    let parsed = parse_company_role(&reply);
    if parsed.is_none() {
        debug!("No company/role found in reply: {reply:?}");
    }
    Ok(parsed)
}

/// `Company_Role` for naming a generated letter. A failed lookup is logged
/// and yields `None`; it never fails the caller.
pub async fn letter_file_stem(llm: &LlmClient, job_description: &str) -> Option<String> {
    match company_and_role(llm, job_description).await {
        Ok(company_role) => company_role.map(|cr| cr.file_stem()),
        Err(e) => {
            warn!("Company/role lookup failed, letter has no file name: {e}");
            None
        }
    }
}

/// Parses `<code>{company}_{role}</code>`.
pub fn parse_company_role(reply: &str) -> Option<CompanyRole> {
    let code = extract_code(reply)?;
    let (company, role) = code.trim().split_once('_')?;
    let (company, role) = (company.trim(), role.trim());
    if company.is_empty() || role.is_empty() {
        return None;
    }
    Some(CompanyRole {
        company: company.to_string(),
        role: role.to_string(),
    })
}
