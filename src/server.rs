//! # HTTP Server
//!
//! axum router for the studio: the two vision proxies, a health check, the
//! leaderboard, and a static file fallback for the pages themselves.
//!
//! | Route | Method | Handler |
//! |-------|--------|---------|
//! | `/api/analyze` | POST | [`crate::proxy::analyze`] |
//! | `/api/gemini-edit` | POST | [`crate::proxy::edit_image`] |
//! | `/api/health` | GET | [`crate::proxy::health`] |
//! | `/api/hall` | GET, POST | [`crate::leaderboard::Leaderboard`] |
//! | anything else | any | files under `doc_root` |
//!
//! Other methods on the API routes answer 405 with a JSON error.

use std::{io::ErrorKind, path::Path, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{
        Method, StatusCode, Uri,
        header::CONTENT_TYPE,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
    sync::Mutex,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::{
    config::{Credentials, ServerConfig},
    error::{StudioError, StudioResult},
    leaderboard::{JsonFileStore, Leaderboard, LeaderboardEntry, NewEntry},
    proxy::{
        self, AnalysisUpstream, EditResponse, EditUpstream, GeminiClient, HealthReport, ImageRequest,
        XaiClient,
    },
};

/// Shared state handed to every handler.
pub struct AppState {
    pub config: ServerConfig,
    pub credentials: Arc<dyn Credentials>,
    pub analysis: Arc<dyn AnalysisUpstream>,
    pub edit: Arc<dyn EditUpstream>,
    pub hall: Mutex<Leaderboard<JsonFileStore>>,
}

impl AppState {
    /// State wired to the real xAI and Gemini endpoints from `config`.
    pub fn new(config: ServerConfig, credentials: Arc<dyn Credentials>) -> Arc<Self> {
        let http = reqwest::Client::new();
        let analysis = Arc::new(XaiClient::new(
            http.clone(),
            config.xai_base_url.clone(),
            config.xai_model.clone(),
        ));
        let edit = Arc::new(GeminiClient::new(
            http,
            config.gemini_base_url.clone(),
            config.gemini_model.clone(),
        ));
        Self::with_upstreams(config, credentials, analysis, edit)
    }

    pub fn with_upstreams(
        config: ServerConfig,
        credentials: Arc<dyn Credentials>,
        analysis: Arc<dyn AnalysisUpstream>,
        edit: Arc<dyn EditUpstream>,
    ) -> Arc<Self> {
        let hall = Leaderboard::new(JsonFileStore::new(config.hall_path.clone()), config.hall_key.clone());
        Arc::new(Self {
            config,
            credentials,
            analysis,
            edit,
            hall: Mutex::new(hall),
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/analyze", post(analyze_handler).fallback(method_not_allowed))
        .route("/api/gemini-edit", post(edit_handler).fallback(method_not_allowed))
        .route("/api/health", get(health_handler).fallback(method_not_allowed))
        .route(
            "/api/hall",
            get(hall_list_handler).post(hall_insert_handler).fallback(method_not_allowed),
        )
        .fallback(static_handler)
        .layer(cors)
        .with_state(state)
}

/// Binds `0.0.0.0:<port>` and serves until Ctrl-C or SIGTERM.
pub async fn start_server(config: ServerConfig, credentials: Arc<dyn Credentials>) -> anyhow::Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;

    let key_state = credentials
        .xai_key()
        .map_or_else(|| "No".to_string(), |k| format!("Yes ({} chars)", k.len()));
    info!("XAI_API_KEY loaded: {key_state}");

    let address = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config, credentials);
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server running on http://localhost:{}", listener.local_addr()?.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> StudioResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| StudioError::validation(rejection.body_text()))
}

fn log_failure(route: &str, error: &StudioError) {
    if error.status().is_server_error() {
        error!(route, category = error.category(), "{error}");
    } else {
        warn!(route, category = error.category(), "{error}");
    }
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ImageRequest>, JsonRejection>,
) -> StudioResult<Json<Value>> {
    analyze_request(&state, body)
        .await
        .map(Json)
        .inspect_err(|e| log_failure("/api/analyze", e))
}

async fn analyze_request(state: &AppState, body: Result<Json<ImageRequest>, JsonRejection>) -> StudioResult<Value> {
    let request = json_body(body)?;
    proxy::analyze(
        &request,
        state.credentials.as_ref(),
        state.analysis.as_ref(),
        &state.config.analyze_prompt,
    )
    .await
}

async fn edit_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ImageRequest>, JsonRejection>,
) -> StudioResult<Json<EditResponse>> {
    edit_request(&state, body)
        .await
        .map(Json)
        .inspect_err(|e| log_failure("/api/gemini-edit", e))
}

async fn edit_request(
    state: &AppState,
    body: Result<Json<ImageRequest>, JsonRejection>,
) -> StudioResult<EditResponse> {
    let request = json_body(body)?;
    proxy::edit_image(&request, state.credentials.as_ref(), state.edit.as_ref()).await
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(proxy::health(state.credentials.as_ref()))
}

async fn hall_list_handler(State(state): State<Arc<AppState>>) -> StudioResult<Json<Vec<LeaderboardEntry>>> {
    let hall = state.hall.lock().await;
    hall.list().map(Json).inspect_err(|e| log_failure("/api/hall", e))
}

async fn hall_insert_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewEntry>, JsonRejection>,
) -> StudioResult<(StatusCode, Json<LeaderboardEntry>)> {
    let entry = json_body(body)?;
    let mut hall = state.hall.lock().await;
    hall.insert(entry)
        .map(|created| (StatusCode::CREATED, Json(created)))
        .inspect_err(|e| log_failure("/api/hall", e))
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

/// Maps a request path onto the file it should be served from, relative to the doc
/// root: `/` becomes `/index.html` and extensionless paths get `.html`. Paths with a
/// `..` segment have no target.
pub fn static_target(path: &str) -> Option<String> {
    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return None;
    }
    if path == "/" {
        return Some("/index.html".to_string());
    }
    if Path::new(path).extension().is_none() {
        return Some(format!("{path}.html"));
    }
    Some(path.to_string())
}

pub fn content_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

async fn static_handler(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let Some(target) = static_target(uri.path()) else {
        warn!(path = uri.path(), "rejected path traversal");
        return (StatusCode::NOT_FOUND, format!("File not found: {}", uri.path())).into_response();
    };

    let file = state.config.doc_root.join(target.trim_start_matches('/'));
    match tokio::fs::read(&file).await {
        Ok(content) => (
            [(CONTENT_TYPE, content_type_for(&target))],
            content,
        )
            .into_response(),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, format!("File not found: {target}")).into_response()
        }
        Err(e) => {
            error!(file = %file.display(), "static read failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}
