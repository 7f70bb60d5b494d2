use std::path::{Path, PathBuf};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use vidscan_core::{
    CountProgress, KeywordExpr, PAGE_SIZE, Provisioned, Record, Session, dataset_present,
    ensure_dataset,
};

use crate::error::ApiError;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const DEFAULT_EXPORT_NAME: &str = "results";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/session", post(create_session).delete(end_session))
        .route("/api/status", get(status))
        .route("/api/dataset/download", post(download_dataset))
        .route("/api/search", post(search))
        .route("/api/update", post(update))
        .route("/api/next", post(next))
        .route("/api/count", post(count))
        .route("/api/count/progress", get(count_progress))
        .route("/api/export", post(export))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct KeywordsBody {
    pub keywords: String,
    pub negative_keywords: String,
}

impl KeywordsBody {
    fn expr(&self) -> Result<KeywordExpr, ApiError> {
        Ok(KeywordExpr::parse(&self.keywords, &self.negative_keywords)?)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExportBody {
    #[serde(flatten)]
    pub keywords: KeywordsBody,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub dataset_present: bool,
    pub dataset_path: String,
    pub page_size: usize,
}

#[derive(Debug, Serialize)]
pub struct PageView {
    pub paged: bool,
    pub offset: usize,
    pub records: Vec<Record>,
}

impl PageView {
    fn of(session: &Session) -> Self {
        Self {
            paged: session.is_paged(),
            offset: session.offset(),
            records: session.page().map(|p| p.records.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DownloadView {
    pub downloaded: bool,
    pub bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct CountView {
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct ExportView {
    pub path: String,
    pub rows: u64,
    pub message: String,
}

#[derive(Clone, Copy)]
enum PageAction {
    Search,
    Update,
    Next,
}

async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Worker(e.to_string()))?
}

/// Keep only the final path component so exports stay inside the export dir.
fn export_file_name(raw: &str) -> PathBuf {
    Path::new(raw.trim())
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_NAME))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn create_session(State(state): State<AppState>) -> Json<SessionCreated> {
    let session_id = state.create_session();
    info!(%session_id, "session created");
    Json(SessionCreated { session_id })
}

async fn end_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session_id = AppState::session_id(&headers)?;
    if !state.remove_session(session_id) {
        return Err(ApiError::UnknownSession);
    }
    info!(%session_id, "session ended");
    Ok(StatusCode::NO_CONTENT)
}

async fn status(State(state): State<AppState>) -> Json<StatusView> {
    let path = &state.config().dataset_path;
    Json(StatusView {
        dataset_present: dataset_present(path),
        dataset_path: path.display().to_string(),
        page_size: PAGE_SIZE,
    })
}

async fn download_dataset(State(state): State<AppState>) -> Result<Json<DownloadView>, ApiError> {
    let view = run_blocking(move || {
        let cfg = state.config();
        let view = match ensure_dataset(&cfg.dataset_path, &cfg.dataset_url)? {
            Provisioned::AlreadyPresent => DownloadView {
                downloaded: false,
                bytes: 0,
            },
            Provisioned::Downloaded { bytes } => DownloadView {
                downloaded: true,
                bytes,
            },
        };
        Ok(view)
    })
    .await?;
    Ok(Json(view))
}

async fn page_action(
    state: AppState,
    headers: HeaderMap,
    body: KeywordsBody,
    action: PageAction,
) -> Result<Json<PageView>, ApiError> {
    let (id, session) = state.session(&headers)?;
    let view = run_blocking(move || {
        let expr = body.expr()?;
        let mut session = session
            .lock()
            .map_err(|_| ApiError::Worker("session lock poisoned".into()))?;
        let scanner = state.scanner();
        match action {
            PageAction::Search => session.search(scanner, &expr)?,
            PageAction::Update => session.update(scanner, &expr)?,
            PageAction::Next => session.next(scanner, &expr)?,
        };
        Ok(PageView::of(&session))
    })
    .await?;
    info!(session_id = %id, offset = view.offset, rows = view.records.len(), "page served");
    Ok(Json(view))
}

async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<KeywordsBody>,
) -> Result<Json<PageView>, ApiError> {
    page_action(state, headers, body, PageAction::Search).await
}

async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<KeywordsBody>,
) -> Result<Json<PageView>, ApiError> {
    page_action(state, headers, body, PageAction::Update).await
}

async fn next(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<KeywordsBody>,
) -> Result<Json<PageView>, ApiError> {
    page_action(state, headers, body, PageAction::Next).await
}

async fn count(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<KeywordsBody>,
) -> Result<Json<CountView>, ApiError> {
    let (id, _) = state.session(&headers)?;
    let total = run_blocking(move || {
        let expr = body.expr()?;
        state.set_progress(id, CountProgress::default());
        let total = state
            .scanner()
            .count_matches_with_progress(&expr, |p| state.set_progress(id, *p));
        state.clear_progress(id);
        Ok(total?)
    })
    .await?;
    Ok(Json(CountView { total }))
}

async fn count_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CountProgress>, ApiError> {
    let (id, _) = state.session(&headers)?;
    Ok(Json(state.progress(id).unwrap_or_default()))
}

async fn export(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ExportBody>,
) -> Result<Json<ExportView>, ApiError> {
    state.session(&headers)?;
    let view = run_blocking(move || {
        let expr = body.keywords.expr()?;
        let dest = state
            .config()
            .export_dir
            .join(export_file_name(&body.filename));
        let summary = state.scanner().export_matches(&expr, &dest)?;
        let shown = summary
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(ExportView {
            path: summary.path.display().to_string(),
            rows: summary.rows,
            message: format!("Downloaded {shown}"),
        })
    })
    .await?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_names_are_confined() {
        assert_eq!(export_file_name("cats"), PathBuf::from("cats"));
        assert_eq!(export_file_name("../../etc/passwd"), PathBuf::from("passwd"));
        assert_eq!(export_file_name("/tmp/x.csv"), PathBuf::from("x.csv"));
        assert_eq!(export_file_name(""), PathBuf::from(DEFAULT_EXPORT_NAME));
        assert_eq!(export_file_name(".."), PathBuf::from(DEFAULT_EXPORT_NAME));
    }
}
