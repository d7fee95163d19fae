//! LinkedIn job postings via the Proxycurl job endpoint.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::retry::{retry_transient, RetryPolicy};

pub mod handlers;

const PROXYCURL_JOB_URL: &str = "https://nubela.co/proxycurl/api/linkedin/job";

#[derive(Debug, Error)]
pub enum JobPostingError {
    #[error("job posting lookup is not configured")]
    NotConfigured,
    #[error("no LinkedIn job id found in {0:?}")]
    InvalidJobReference(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("job posting API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Clone)]
pub struct JobPostingClient {
    client: Client,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl JobPostingClient {
    pub fn new(api_key: Option<String>) -> Result<Self, JobPostingError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(300))
                .build()?,
            api_key,
            retry: RetryPolicy::default(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetches the posting record for `job_id`.
    ///
    /// `Ok(None)` means the lookup ran but produced nothing usable: the
    /// account is out of credits (403) or the body is not JSON.
    pub async fn fetch_job_posting(&self, job_id: &str) -> Result<Option<Value>, JobPostingError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(JobPostingError::NotConfigured)?;
        let posting_url = format!("https://www.linkedin.com/jobs/view/{job_id}/");

        let response = retry_transient(
            &self.retry,
            "Job posting fetch",
            |e: &reqwest::Error| e.is_timeout(),
            || {
                self.client
                    .get(PROXYCURL_JOB_URL)
                    .bearer_auth(api_key)
                    .query(&[("url", posting_url.as_str())])
                    .send()
            },
        )
        .await?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            warn!("Job posting API refused request for {job_id}: not enough credits");
            return Ok(None);
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(JobPostingError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(record) => {
                debug!("Fetched job posting {job_id}");
                Ok(Some(record))
            }
            Err(e) => {
                warn!("Job posting {job_id} returned a non-JSON body: {e}");
                Ok(None)
            }
        }
    }
}

/// Accepts a bare numeric id or any LinkedIn URL carrying one.
pub fn resolve_job_id(reference: &str) -> Result<String, JobPostingError> {
    let reference = reference.trim();
    if !reference.is_empty() && reference.chars().all(|c| c.is_ascii_digit()) {
        return Ok(reference.to_string());
    }
    crate::extract::extract_linkedin_job_id(reference)
        .ok_or_else(|| JobPostingError::InvalidJobReference(reference.to_string()))
}

/// Renders a posting record as plain job-description text. Missing fields
/// are skipped.
pub fn posting_to_text(record: &Value) -> String {
    let text = |key: &str| {
        record
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let mut lines = Vec::new();
    if let Some(title) = text("title") {
        lines.push(format!("Job title: {title}"));
    }
    let company = record
        .get("company")
        .and_then(|c| c.get("name"))
        .and_then(Value::as_str);
    if let Some(company) = company {
        lines.push(format!("Company: {company}"));
    }
    if let Some(location) = location_text(record) {
        lines.push(format!("Location: {location}"));
    }
    if let Some(kind) = text("employment_type") {
        lines.push(format!("Employment type: {kind}"));
    }
    if let Some(description) = text("job_description") {
        lines.push(String::new());
        lines.push(description.to_string());
    }
    lines.join("\n")
}

fn location_text(record: &Value) -> Option<String> {
    match record.get("location")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(parts) => {
            let joined = ["city", "region", "country"]
                .iter()
                .filter_map(|k| parts.get(*k).and_then(Value::as_str))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_job_id() {
        assert_eq!(resolve_job_id(" 3612345678 ").unwrap(), "3612345678");
        assert_eq!(
            resolve_job_id("https://www.linkedin.com/jobs/view/3612345678/").unwrap(),
            "3612345678"
        );
        assert_eq!(
            resolve_job_id("https://www.linkedin.com/jobs/search/?currentJobId=42&geoId=1").unwrap(),
            "42"
        );
        assert!(matches!(
            resolve_job_id("https://example.com/careers"),
            Err(JobPostingError::InvalidJobReference(_))
        ));
    }

    #[test]
    fn test_posting_to_text() {
        let record = json!({
            "title": "Backend Engineer",
            "company": {"name": "Acme", "url": "https://acme.test"},
            "location": {"city": "Berlin", "region": null, "country": "Germany"},
            "employment_type": "Full-time",
            "job_description": "Build APIs in Rust.\n"
        });
        assert_eq!(
            posting_to_text(&record),
            "Job title: Backend Engineer\nCompany: Acme\nLocation: Berlin, Germany\n\
             Employment type: Full-time\n\nBuild APIs in Rust."
        );
    }

    #[test]
    fn test_posting_to_text_skips_missing_fields() {
        let record = json!({"job_description": "Only text", "location": "Remote"});
        assert_eq!(posting_to_text(&record), "Location: Remote\n\nOnly text");
    }

    #[tokio::test]
    async fn test_fetch_without_key_is_not_configured() {
        let client = JobPostingClient::new(None).unwrap();
        assert!(!client.is_configured());
        assert!(matches!(
            client.fetch_job_posting("1").await,
            Err(JobPostingError::NotConfigured)
        ));
    }
}
