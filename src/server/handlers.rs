use super::types::{CreateSessionResponse, ErrorResponse, SimplifyRequest};
use crate::{
    Error,
    assistant::MedicalAssistant,
    session::{AnalyzeOutcome, SessionStore, SessionView},
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Name of the multipart field carrying the image.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub assistant: Arc<MedicalAssistant>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

fn reject(err: Error) -> ApiError {
    let status = match &err {
        Error::Service(_) => StatusCode::BAD_GATEWAY,
        Error::UnsupportedImage(_) | Error::Upload(_) => StatusCode::BAD_REQUEST,
        Error::InvalidTransition { .. } => StatusCode::CONFLICT,
        Error::SessionNotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        info!("Request rejected: {}", err);
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let session_id = state.sessions.create().await;
    Json(CreateSessionResponse { session_id })
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SessionView> {
    let session = state.sessions.get(id).await.map_err(reject)?;
    let session = session.lock().await;
    Ok(Json(session.view(false)))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> std::result::Result<StatusCode, ApiError> {
    state.sessions.remove(id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<SessionView> {
    let session = state.sessions.get(id).await.map_err(reject)?;

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| reject(e.into()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| reject(Error::upload("file field has no file name")))?;
        let bytes = field.bytes().await.map_err(|e| reject(e.into()))?;
        image = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = image.ok_or_else(|| {
        reject(Error::upload(format!(
            "multipart body has no '{UPLOAD_FIELD}' field"
        )))
    })?;

    let mut session = session.lock().await;
    session.upload(&file_name, &bytes).await.map_err(reject)?;
    Ok(Json(session.view(false)))
}

pub async fn analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SessionView> {
    let session = state.sessions.get(id).await.map_err(reject)?;
    let mut session = session.lock().await;

    let outcome = session.analyze(&state.assistant).await.map_err(reject)?;
    Ok(Json(session.view(outcome == AnalyzeOutcome::Skipped)))
}

pub async fn simplify(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SimplifyRequest>,
) -> ApiResult<SessionView> {
    let session = state.sessions.get(id).await.map_err(reject)?;
    let mut session = session.lock().await;

    session
        .set_simplify(request.simplify, &state.assistant)
        .await
        .map_err(reject)?;
    Ok(Json(session.view(false)))
}
