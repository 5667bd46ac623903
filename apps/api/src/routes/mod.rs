pub mod health;
pub mod page;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(page::index_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/upload",
            post(handlers::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/sessions/:id/mode", put(handlers::handle_select_mode))
        .route("/api/v1/sessions/:id/analyze", post(handlers::handle_analyze))
        .route(
            "/api/v1/sessions/:id/suggestions",
            post(handlers::handle_generate_suggestions),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::analysis::Analyzer;
    use crate::config::Config;
    use crate::extraction::{extracted_for_tests, pdf_with_pages};
    use crate::llm_client::testing::StubClient;
    use crate::session::model::{AnalysisMode, UPLOAD_SUCCESS};
    use crate::session::store::SessionStore;

    const BOUNDARY: &str = "resume-ats-test-boundary";

    fn test_state(stub: Arc<StubClient>) -> AppState {
        AppState {
            config: Config::for_tests(),
            sessions: SessionStore::new(),
            analyzer: Analyzer::new(stub, Duration::from_secs(5)),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(uri: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/sessions")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["state"], "awaiting_upload");
        body["session_id"].as_str().unwrap().to_string()
    }

    /// Puts extracted text into a session directly, standing in for a good PDF upload.
    async fn seed_resume(state: &AppState, id: &str, mode: AnalysisMode) {
        let handle = state.sessions.get(id.parse::<Uuid>().unwrap()).await.unwrap();
        let mut session = handle.lock().await;
        session.resume = Some(extracted_for_tests("Experienced Go developer..."));
        session.filename = Some("resume.pdf".to_string());
        session.select_mode(mode).unwrap();
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(Arc::new(StubClient::new(""))));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-ats");
    }

    #[tokio::test]
    async fn test_index_page_is_served() {
        let app = build_router(test_state(Arc::new(StubClient::new(""))));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Resume ATS System"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let app = build_router(test_state(Arc::new(StubClient::new(""))));
        let uri = format!("/api/v1/sessions/{}", Uuid::new_v4());
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_rejected() {
        let app = build_router(test_state(Arc::new(StubClient::new(""))));
        let id = create_session(&app).await;
        let request = multipart_request(
            &format!("/api/v1/sessions/{id}/upload"),
            "resume.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            b"PK\x03\x04",
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_pdf_upload_moves_session_to_uploaded() {
        let app = build_router(test_state(Arc::new(StubClient::new(""))));
        let id = create_session(&app).await;
        let pdf = pdf_with_pages(&["Jane Doe", "Experienced Go developer"]);
        let request = multipart_request(
            &format!("/api/v1/sessions/{id}/upload"),
            "resume.pdf",
            "application/pdf",
            &pdf,
        );

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "uploaded");
        assert_eq!(body["filename"], "resume.pdf");
        assert_eq!(body["banners"][0]["level"], "success");
        assert_eq!(body["banners"][0]["message"], UPLOAD_SUCCESS);
        assert!(body["resume_chars"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_malformed_pdf_shows_error_banner() {
        let app = build_router(test_state(Arc::new(StubClient::new(""))));
        let id = create_session(&app).await;
        let request = multipart_request(
            &format!("/api/v1/sessions/{id}/upload"),
            "resume.pdf",
            "application/pdf",
            b"this is not really a pdf",
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "extraction_failed");
        assert_eq!(body["filename"], "resume.pdf");
        assert_eq!(body["banners"][0]["level"], "error");
        assert!(body["banners"][0]["message"]
            .as_str()
            .unwrap()
            .starts_with("Error reading PDF:"));
    }

    #[tokio::test]
    async fn test_analyze_before_upload_is_conflict() {
        let stub = Arc::new(StubClient::new("unused"));
        let app = build_router(test_state(stub.clone()));
        let id = create_session(&app).await;
        let request = json_request(
            Method::POST,
            &format!("/api/v1/sessions/{id}/analyze"),
            json!({"job_description": "Go engineer"}),
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_STATE");
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_job_description_warns_over_http() {
        let stub = Arc::new(StubClient::new("unused"));
        let state = test_state(stub.clone());
        let app = build_router(state.clone());
        let id = create_session(&app).await;
        seed_resume(&state, &id, AnalysisMode::JobMatch).await;

        let request = json_request(
            Method::POST,
            &format!("/api/v1/sessions/{id}/analyze"),
            json!({"job_description": ""}),
        );
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "awaiting_job_description");
        assert!(body["banners"]
            .as_array()
            .unwrap()
            .iter()
            .any(|b| b["level"] == "warning"));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_ats_suggestions_flow_over_http() {
        let stub = Arc::new(StubClient::new("Overall resume score: 64%"));
        let state = test_state(stub.clone());
        let app = build_router(state.clone());
        let id = create_session(&app).await;
        seed_resume(&state, &id, AnalysisMode::Unset).await;

        let request = json_request(
            Method::PUT,
            &format!("/api/v1/sessions/{id}/mode"),
            json!({"mode": "general_ats"}),
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "general_ats");
        assert_eq!(body["state"], "uploaded");

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/v1/sessions/{id}/suggestions"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "result_displayed");
        assert_eq!(body["result"]["heading"], "💡 ATS Resume Suggestions");
        assert_eq!(body["result"]["body"], "Overall resume score: 64%");
        assert!(stub.prompt(0).contains("Experienced Go developer..."));
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = build_router(test_state(Arc::new(StubClient::new(""))));
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}");

        let request = Request::builder()
            .method(Method::DELETE)
            .uri(&uri)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let request = Request::builder().uri(&uri).body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
