use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Request, State, multipart::MultipartError},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use ingest::{FileKind, ReadError};
use serde::{Deserialize, Serialize};
use session::{Assistant, ContextView, QaPair, SessionError, StudySession};
use std::sync::Arc;
use summarize::Category;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::metrics::{Metrics, MetricsSnapshot, TimedOperation};
use crate::store::{SessionStore, SharedSession};

#[derive(Clone)]
pub struct AppState {
    pub store: SessionStore,
    pub assistant: Arc<Assistant>,
    pub metrics: Arc<Metrics>,
    pub provider: &'static str,
    pub model: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::SessionNotFound(_) | ApiError::Session(SessionError::FileNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::BadRequest(_)
            | ApiError::Multipart(_)
            | ApiError::Session(SessionError::EmptyCourseName | SessionError::EmptyQuestion)
            | ApiError::Read(ReadError::UnsupportedFileType { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Read(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Session(SessionError::Completion(_)) => StatusCode::BAD_GATEWAY,
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, %status, "Request rejected");
        }

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/files", post(upload_file))
        .route("/sessions/:id/files/:index/summary", get(get_summary))
        .route("/sessions/:id/files/:index/questions", post(ask_question))
        .route("/sessions/:id/files/:index/history", get(get_history))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    state.metrics.record_request(response.status().is_success());
    response
}

fn lookup(state: &AppState, id: Uuid) -> ApiResult<SharedSession> {
    state.store.get(&id).ok_or(ApiError::SessionNotFound(id))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    provider: &'static str,
    model: String,
    accepted_types: [&'static str; 4],
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider: state.provider,
        model: state.model.clone(),
        accepted_types: FileKind::SUPPORTED,
    })
}

async fn get_stats(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot(state.store.len()))
}

#[derive(Deserialize)]
struct CreateSessionRequest {
    course_name: String,
}

#[derive(Serialize)]
struct CreateSessionResponse {
    session_id: Uuid,
    course_name: String,
}

async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<CreateSessionResponse>)> {
    let session = StudySession::new(req.course_name)?;
    let course_name = session.course_name().to_string();
    let session_id = state.store.insert(session);

    info!(%session_id, course = %course_name, "Session created");

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            course_name,
        }),
    ))
}

#[derive(Serialize)]
struct FileListing {
    index: usize,
    name: String,
    category: Category,
    has_summary: bool,
    questions_asked: usize,
}

#[derive(Serialize)]
struct SessionResponse {
    session_id: Uuid,
    course_name: String,
    files: Vec<FileListing>,
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionResponse>> {
    let shared = lookup(&state, id)?;
    let session = shared.lock().await;

    let files = session
        .files()
        .iter()
        .enumerate()
        .map(|(index, file)| FileListing {
            index,
            name: file.name().to_string(),
            category: file.category(),
            has_summary: file.summary().is_some(),
            questions_asked: file.chat_history().len(),
        })
        .collect();

    Ok(Json(SessionResponse {
        session_id: id,
        course_name: session.course_name().to_string(),
        files,
    }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.store.remove(&id) {
        info!(session_id = %id, "Session ended");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}

#[derive(Serialize)]
struct UploadResponse {
    index: usize,
    name: String,
    category: Category,
    doc_id: String,
    approx_tokens: usize,
    char_length: usize,
}

async fn upload_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let timer = TimedOperation::start();
    let shared = lookup(&state, id)?;

    let mut category = Category::ReadingMaterials;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("category") => {
                let label = field.text().await?;
                category = Category::from_label(&label)
                    .ok_or_else(|| ApiError::BadRequest(format!("Invalid category '{}'", label)))?;
            }
            Some("file") => {
                let name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::BadRequest("File field has no file name".to_string()))?;
                let bytes = field.bytes().await?;
                upload = Some((name, bytes));
            }
            _ => {}
        }
    }

    let (name, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("Please select a file to upload.".to_string()))?;

    let doc = ingest::extract_upload(&name, &bytes)?;
    let stats = doc.stats();

    let index = shared.lock().await.upload(doc.name.clone(), category, doc.text);
    state.metrics.record_upload(timer.elapsed());

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            index,
            name: doc.name,
            category,
            doc_id: doc.doc_id,
            approx_tokens: stats.approx_tokens,
            char_length: stats.char_length,
        }),
    ))
}

#[derive(Serialize)]
struct SummaryResponse {
    index: usize,
    name: String,
    category: Category,
    summary: String,
}

async fn get_summary(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> ApiResult<Json<SummaryResponse>> {
    let timer = TimedOperation::start();
    let shared = lookup(&state, id)?;
    let mut session = shared.lock().await;

    let summary = session.ensure_summary(index, &state.assistant).await?;
    let file = session.file(index)?;
    state.metrics.record_summary(timer.elapsed());

    Ok(Json(SummaryResponse {
        index,
        name: file.name().to_string(),
        category: file.category(),
        summary,
    }))
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    #[serde(default)]
    view: ContextView,
}

#[derive(Serialize)]
struct AskResponse {
    question: String,
    answer: String,
}

async fn ask_question(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(req): Json<AskRequest>,
) -> ApiResult<Json<AskResponse>> {
    let timer = TimedOperation::start();
    let shared = lookup(&state, id)?;
    let mut session = shared.lock().await;

    let answer = session
        .ask(index, &req.question, req.view, &state.assistant)
        .await?;
    state.metrics.record_followup(timer.elapsed());

    Ok(Json(AskResponse {
        question: req.question,
        answer,
    }))
}

#[derive(Serialize)]
struct HistoryResponse {
    index: usize,
    name: String,
    history: Vec<QaPair>,
}

async fn get_history(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> ApiResult<Json<HistoryResponse>> {
    let shared = lookup(&state, id)?;
    let session = shared.lock().await;
    let file = session.file(index)?;

    Ok(Json(HistoryResponse {
        index,
        name: file.name().to_string(),
        history: file.chat_history().to_vec(),
    }))
}
