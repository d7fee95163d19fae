pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::chat::handlers as chat;
use crate::generation::handlers as generation;
use crate::jobs::handlers as jobs;
use crate::resume::handlers as resume;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route("/api/v1/sessions/:id", delete(session::handle_delete_session))
        // Job description
        .route("/api/v1/sessions/:id/job", put(jobs::handle_set_job))
        .route("/api/v1/sessions/:id/job/fetch", post(jobs::handle_fetch_job))
        .route(
            "/api/v1/sessions/:id/job/summary",
            post(generation::handle_job_summary),
        )
        // Résumé
        .route(
            "/api/v1/sessions/:id/resume/analyse",
            post(resume::handle_analyse),
        )
        .route("/api/v1/sessions/:id/resume", get(resume::handle_get_resume))
        .route(
            "/api/v1/sessions/:id/resume/statement",
            patch(resume::handle_edit_statement),
        )
        .route(
            "/api/v1/sessions/:id/projects/:pid",
            patch(resume::handle_edit_project),
        )
        // Rewrites and version selection
        .route(
            "/api/v1/sessions/:id/statement/rewrite",
            post(generation::handle_rewrite_statement),
        )
        .route(
            "/api/v1/sessions/:id/projects/:pid/description/rewrite",
            post(generation::handle_rewrite_description),
        )
        .route(
            "/api/v1/sessions/:id/projects/:pid/contributions/rewrite",
            post(generation::handle_rewrite_contributions),
        )
        .route("/api/v1/sessions/:id/select", put(resume::handle_select_version))
        // Skills
        .route(
            "/api/v1/sessions/:id/skills/sort",
            post(generation::handle_sort_skills),
        )
        .route(
            "/api/v1/sessions/:id/skills/generate",
            post(generation::handle_generate_skills),
        )
        .route(
            "/api/v1/sessions/:id/skills/chosen",
            put(resume::handle_choose_skills),
        )
        // Export choices and outputs
        .route(
            "/api/v1/sessions/:id/projects/chosen",
            put(resume::handle_choose_projects),
        )
        .route(
            "/api/v1/sessions/:id/match-rate",
            post(generation::handle_match_rate),
        )
        .route("/api/v1/sessions/:id/letter", post(generation::handle_letter))
        .route(
            "/api/v1/sessions/:id/letter/paragraphs",
            get(generation::handle_get_paragraphs).post(generation::handle_insert_paragraph),
        )
        .route(
            "/api/v1/sessions/:id/letter/paragraphs/:pid",
            patch(generation::handle_edit_paragraph).delete(generation::handle_delete_paragraph),
        )
        .route(
            "/api/v1/sessions/:id/letter/paragraphs/:pid/generate",
            post(generation::handle_generate_paragraph),
        )
        .route(
            "/api/v1/sessions/:id/letter/paragraphs/:pid/revise",
            post(generation::handle_revise_paragraph),
        )
        // Chat
        .route("/api/v1/chat/presets", get(chat::handle_list_presets))
        .route(
            "/api/v1/sessions/:id/chat",
            get(chat::handle_get_chat)
                .post(chat::handle_start_chat)
                .delete(chat::handle_reset_chat),
        )
        .route(
            "/api/v1/sessions/:id/chat/messages",
            post(chat::handle_send_message),
        )
        .route(
            "/api/v1/sessions/:id/chat/messages/:index",
            patch(chat::handle_edit_message),
        )
        .route("/api/v1/sessions/:id/export", get(resume::handle_export))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::jobs::JobPostingClient;
    use crate::llm_client::LlmClient;
    use crate::session::InMemorySessionStore;

    fn app() -> Router {
        build_router(AppState {
            llm: LlmClient::new("test-key".into()).unwrap(),
            jobs: JobPostingClient::new(None).unwrap(),
            sessions: Arc::new(InMemorySessionStore::new(Duration::from_secs(60))),
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, String) {
        let mut request = Request::builder().method(method).uri(uri);
        if body.is_some() {
            request = request.header("content-type", "application/json");
        }
        let request = request
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn create_session(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        json["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("tailor-api"));
    }

    #[tokio::test]
    async fn test_json_resume_flow_without_llm() {
        let app = app();
        let id = create_session(&app).await;

        let resume = serde_json::json!({
            "resume_text": serde_json::json!({
                "statement": "Engineer.",
                "skills": {"tech": ["Python", "SQL"]},
                "experiences": [{
                    "title": "Dev", "company": "Acme",
                    "start": {"year": 2020, "month": 1},
                    "end": {"year": 2022, "month": 6},
                    "projects": [{"title": "X", "description": "Built X",
                                  "contributions": ["Did A", "Did B"]}]
                }]
            }).to_string()
        })
        .to_string();
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/resume/analyse"),
            Some(&resume),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(body.contains("\"source\":\"direct\""));

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/v1/sessions/{id}/skills/chosen"),
            Some(r#"{"skills": ["SQL"]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "GET", &format!("/api/v1/sessions/{id}/export"), None).await;
        assert_eq!(status, StatusCode::OK);
        let export: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(export["statement"], "Engineer.");
        assert_eq!(export["competencies"], "SQL");
        assert_eq!(export["experiences"][0]["date_range"], "Jan 2020 - Jun 2022");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let app = app();
        let uri = format!("/api/v1/sessions/{}/resume", uuid::Uuid::new_v4());
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_job_fetch_without_key_is_503() {
        let app = app();
        let id = create_session(&app).await;
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/job/fetch"),
            Some(r#"{"job": "https://www.linkedin.com/jobs/view/123/"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_selecting_missing_versions_is_404() {
        let app = app();
        let id = create_session(&app).await;
        let resume = serde_json::json!({
            "resume_text": r#"{"statement": "Hi.", "skills": [], "experiences": []}"#
        })
        .to_string();
        send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/resume/analyse"),
            Some(&resume),
        )
        .await;

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/v1/sessions/{id}/select"),
            Some(r#"{"field": "statement", "version": "Version 1"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_letter_paragraph_editing() {
        let app = app();
        let id = create_session(&app).await;
        let base = format!("/api/v1/sessions/{id}/letter/paragraphs");

        let (status, _) = send(&app, "POST", &base, None).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = send(&app, "POST", &base, Some(r#"{"index": 0}"#)).await;
        assert_eq!(status, StatusCode::CREATED);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let first = json["paragraphs"][0]["uuid"].as_str().unwrap().to_string();
        let second = json["paragraphs"][1]["uuid"].as_str().unwrap().to_string();

        send(&app, "PATCH", &format!("{base}/{first}"), Some(r#"{"content": "Dear team,"}"#)).await;
        let (status, body) = send(
            &app,
            "PATCH",
            &format!("{base}/{second}"),
            Some(r#"{"content": "I build Rust services."}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["letter"], "Dear team,\n\nI build Rust services.");
        assert_eq!(json["words"], 6);

        let (status, body) = send(&app, "DELETE", &format!("{base}/{first}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["paragraphs"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "POST", &format!("{base}/{first}/revise"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "POST", &base, Some(r#"{"index": 5}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_lifecycle_without_llm() {
        let app = app();
        let id = create_session(&app).await;
        let chat = format!("/api/v1/sessions/{id}/chat");

        let (status, _) = send(&app, "POST", &format!("{chat}/messages"), Some(r#"{"content": "Hi"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        send(&app, "PUT", &format!("/api/v1/sessions/{id}/job"), Some(r#"{"job_description": "Rust engineer"}"#)).await;
        let (status, body) = send(&app, "POST", &chat, Some(r#"{"preset": "hiring_manager"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["started"], true);
        assert_eq!(json["messages"][0]["kind"], "system");
        assert_eq!(json["messages"][1]["kind"], "info");

        let (status, body) = send(&app, "PATCH", &format!("{chat}/messages/1"), Some(r#"{"selected": false}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"selected\":false"));
        let (status, _) = send(&app, "PATCH", &format!("{chat}/messages/7"), Some(r#"{"selected": false}"#)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        assert_eq!(send(&app, "DELETE", &chat, None).await.0, StatusCode::NO_CONTENT);
        let (_, body) = send(&app, "GET", &chat, None).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["started"], false);

        let (status, body) = send(&app, "GET", "/api/v1/chat/presets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("dutch_to_chinese"));
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = app();
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}");
        assert_eq!(send(&app, "DELETE", &uri, None).await.0, StatusCode::NO_CONTENT);
        assert_eq!(send(&app, "DELETE", &uri, None).await.0, StatusCode::NOT_FOUND);
    }
}
