//! Axum route handlers for the session API.
//!
//! Every handler returns the session view. Extraction failures, missing job
//! descriptions and model failures arrive as banners inside a 200 view.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::{is_pdf_upload, UploadedDocument};
use crate::session::model::{AnalysisMode, InvalidTransition, SessionView};
use crate::session::store::SessionHandle;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "resume";

impl From<InvalidTransition> for AppError {
    fn from(err: InvalidTransition) -> Self {
        AppError::Conflict(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectModeRequest {
    pub mode: AnalysisMode,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub job_description: String,
}

async fn find_session(state: &AppState, id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let handle = state.sessions.create().await;
    let view = handle.lock().await.view();
    (StatusCode::CREATED, Json(view))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, id).await?;
    let view = handle.lock().await.view();
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// POST /api/v1/sessions/:id/upload
///
/// Multipart form with a single `resume` file field (PDF only).
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, id).await?;

    let mut document = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        if !is_pdf_upload(&filename, content_type.as_deref()) {
            return Err(AppError::Validation(
                "Only PDF files are accepted".to_string(),
            ));
        }
        let content = field.bytes().await?;
        document = Some(UploadedDocument {
            filename: if filename.is_empty() {
                "resume.pdf".to_string()
            } else {
                filename
            },
            content,
        });
        break;
    }

    let document = document.ok_or_else(|| {
        AppError::Validation(format!("Missing '{UPLOAD_FIELD}' file field"))
    })?;

    let mut session = handle.lock().await;
    session.upload(document).await?;
    Ok(Json(session.view()))
}

/// PUT /api/v1/sessions/:id/mode
pub async fn handle_select_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectModeRequest>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;
    session.select_mode(request.mode)?;
    Ok(Json(session.view()))
}

/// POST /api/v1/sessions/:id/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;
    session
        .analyze(&request.job_description, &state.analyzer)
        .await?;
    Ok(Json(session.view()))
}

/// POST /api/v1/sessions/:id/suggestions
pub async fn handle_generate_suggestions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;
    session.generate_suggestions(&state.analyzer).await?;
    Ok(Json(session.view()))
}
