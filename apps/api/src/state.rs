use std::sync::Arc;

use crate::jobs::JobPostingClient;
use crate::llm_client::LlmClient;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub jobs: JobPostingClient,
    /// Redis-backed when REDIS_URL is set, in-memory otherwise.
    pub sessions: Arc<dyn SessionStore>,
}
