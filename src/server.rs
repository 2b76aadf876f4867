//! HTTP server for the chart frontend.
//!
//! This module provides an HTTP server that:
//! - Serves the named datasets as `{data, labels, sample_rate}` JSON
//! - Computes stateless windows over any dataset
//! - Keeps one [`WindowState`] per UI session and applies click, slider
//!   and reset events to it; sessions live in a bounded
//!   [`SessionStore`] and can be closed explicitly
//!
//! # Architecture
//!
//! ```text
//! Chart UI ──→ POST /api/sessions/:id/click ──→ WindowState ──→ compute_window
//!    │                                                               │
//!    └──────── GET /api/datasets/:name ──→ DataSource (Arc<Series>) ─┘
//! ```

use crate::activity::{ActivityLog, Interaction};
use crate::core::{
    compute_window, AxisKind, Series, SeriesPayload, WindowError, WindowPayload, WindowSize,
    WindowState,
};
use crate::datasets::DataSource;
use crate::sessions::{SessionStore, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE_SECS};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Slider value for new sessions and stateless window requests
    pub default_window_size: WindowSize,
    /// Most sessions kept at once
    pub max_sessions: usize,
    /// Idle seconds after which a session may be evicted
    pub session_idle_secs: u64,
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(port: u16, default_window_size: WindowSize) -> Self {
        Self {
            port,
            default_window_size,
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
        }
    }

    /// Override the session cap and idle timeout.
    pub fn with_session_limits(mut self, max_sessions: usize, idle_secs: u64) -> Self {
        self.max_sessions = max_sessions;
        self.session_idle_secs = idle_secs;
        self
    }
}

/// Shared server state
pub struct ServerState {
    /// Where series come from
    source: Arc<dyn DataSource>,
    /// Window state per UI session
    sessions: RwLock<SessionStore>,
    /// Slider value new sessions start with
    default_window_size: WindowSize,
    /// Usage totals
    activity: Arc<ActivityLog>,
}

impl ServerState {
    /// Create new server state
    pub fn new(
        config: &ServerConfig,
        source: Arc<dyn DataSource>,
        activity: Arc<ActivityLog>,
    ) -> Self {
        Self {
            source,
            sessions: RwLock::new(SessionStore::new(
                config.max_sessions,
                config.session_idle_secs,
            )),
            default_window_size: config.default_window_size,
            activity,
        }
    }

    fn fetch(&self, name: &str) -> Result<Arc<Series>, ApiError> {
        self.source.fetch(name).map_err(window_error)
    }

    /// Response for a session whose active series is already fetched.
    fn respond_with(
        &self,
        session_id: Uuid,
        state: WindowState,
        series: &Series,
    ) -> SessionResponse {
        self.activity.record_window(&state.active_series);
        SessionResponse {
            session_id,
            description: state.describe(),
            window: state.window(series).to_payload(),
            state,
        }
    }

    /// Response for a session, fetching its active series.
    fn respond(&self, session_id: Uuid, state: WindowState) -> Result<SessionResponse, ApiError> {
        let series = self.fetch(&state.active_series)?;
        Ok(self.respond_with(session_id, state, &series))
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: String) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error,
            code: code.to_string(),
        }),
    )
}

fn window_error(e: WindowError) -> ApiError {
    let status = match e {
        WindowError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        WindowError::DataUnavailable(_) => StatusCode::NOT_FOUND,
    };
    api_error(status, e.code(), e.to_string())
}

fn session_not_found(id: Uuid) -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        "SESSION_NOT_FOUND",
        format!("No window session with id {id}"),
    )
}

/// One entry of the dataset listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub name: String,
    pub axis: AxisKind,
    pub points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
}

/// Response from the dataset listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetList {
    pub datasets: Vec<DatasetInfo>,
}

/// Query parameters for stateless window requests
#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub window_size: Option<f64>,
    pub center: Option<f64>,
}

/// Chart click event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickRequest {
    pub axis_value: f64,
    pub series: String,
}

/// Slider event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliderRequest {
    pub window_size: f64,
}

/// A session's state together with its current window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub state: WindowState,
    pub description: String,
    pub window: WindowPayload,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/datasets
async fn list_datasets(State(state): State<Arc<ServerState>>) -> Json<DatasetList> {
    let datasets = state
        .source
        .names()
        .into_iter()
        .filter_map(|name| match state.source.fetch(&name) {
            Ok(series) => Some(DatasetInfo {
                name,
                axis: series.axis_kind(),
                points: series.len(),
                sample_rate: series.sample_rate(),
            }),
            Err(e) => {
                tracing::warn!("Skipping dataset in listing: {}", e);
                None
            }
        })
        .collect();

    Json(DatasetList { datasets })
}

/// GET /api/datasets/:name
async fn get_dataset(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> Result<Json<SeriesPayload>, ApiError> {
    let series = state.fetch(&name)?;
    state.activity.record_dataset_served(&name);
    Ok(Json(series.to_payload()))
}

/// GET /api/datasets/:name/window
///
/// Stateless window over a dataset; the window size defaults to the
/// configured slider value.
async fn get_window(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<WindowPayload>, ApiError> {
    let window_size = match query.window_size {
        Some(value) => WindowSize::new(value).map_err(window_error)?,
        None => state.default_window_size,
    };
    if let Some(center) = query.center {
        if !center.is_finite() {
            return Err(window_error(WindowError::InvalidArgument(format!(
                "center must be a finite number, got {center}"
            ))));
        }
    }

    let series = state.fetch(&name)?;
    state.activity.record_window(&name);
    Ok(Json(compute_window(&series, window_size, query.center).to_payload()))
}

/// POST /api/sessions
///
/// Fails with `DATA_UNAVAILABLE` when the default series is missing.
async fn create_session(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let window_state = WindowState::new(state.default_window_size);
    let series = state.fetch(&window_state.active_series)?;

    let id = Uuid::new_v4();
    let evicted = state
        .sessions
        .write()
        .await
        .open(id, window_state.clone(), Utc::now());
    state.activity.record(Interaction::SessionOpened);
    state
        .activity
        .record_many(Interaction::SessionEvicted, evicted as u64);
    tracing::debug!(session = %id, evicted, "created window session");

    Ok(Json(state.respond_with(id, window_state, &series)))
}

/// GET /api/sessions/:id
async fn get_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let window_state = state
        .sessions
        .write()
        .await
        .get(&id, Utc::now())
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(state.respond(id, window_state)?))
}

/// DELETE /api/sessions/:id
async fn delete_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.sessions.write().await.close(&id) {
        return Err(session_not_found(id));
    }
    state.activity.record(Interaction::SessionClosed);
    tracing::debug!(session = %id, "closed window session");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/:id/click
async fn click(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ClickRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if !request.axis_value.is_finite() {
        return Err(window_error(WindowError::InvalidArgument(format!(
            "axis value must be a finite number, got {}",
            request.axis_value
        ))));
    }
    let ClickRequest { axis_value, series } = request;

    let (next, clicked) = {
        let mut sessions = state.sessions.write().await;
        if !sessions.contains(&id) {
            return Err(session_not_found(id));
        }
        // Unknown series must not become the active one.
        let clicked = state.fetch(&series)?;
        let next = sessions
            .update(&id, Utc::now(), |current| current.on_click(axis_value, series))
            .ok_or_else(|| session_not_found(id))?;
        (next, clicked)
    };
    state.activity.record_click(&next.active_series);
    tracing::debug!(session = %id, center = axis_value, series = %next.active_series, "click");

    Ok(Json(state.respond_with(id, next, &clicked)))
}

/// POST /api/sessions/:id/slider
async fn slider(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SliderRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let window_size = WindowSize::new(request.window_size).map_err(window_error)?;

    let next = state
        .sessions
        .write()
        .await
        .update(&id, Utc::now(), |current| current.on_slider_change(window_size))
        .ok_or_else(|| session_not_found(id))?;
    state.activity.record(Interaction::Slider);
    tracing::debug!(session = %id, window_size = window_size.get(), "slider");

    Ok(Json(state.respond(id, next)?))
}

/// POST /api/sessions/:id/reset
async fn reset(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let next = state
        .sessions
        .write()
        .await
        .update(&id, Utc::now(), WindowState::on_reset)
        .ok_or_else(|| session_not_found(id))?;
    state.activity.record(Interaction::Reset);
    tracing::debug!(session = %id, "reset");

    Ok(Json(state.respond(id, next)?))
}

/// Build the application router over shared state.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/datasets", get(list_datasets))
        .route("/api/datasets/:name", get(get_dataset))
        .route("/api/datasets/:name/window", get(get_window))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/click", post(click))
        .route("/api/sessions/:id/slider", post(slider))
        .route("/api/sessions/:id/reset", post(reset))
        .layer(
            CorsLayer::new()
                .allow_origin([
                    HeaderValue::from_static("http://localhost"),
                    HeaderValue::from_static("http://localhost:8000"),
                    HeaderValue::from_static("http://127.0.0.1"),
                    HeaderValue::from_static("http://127.0.0.1:8000"),
                ])
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
    source: Arc<dyn DataSource>,
    activity: Arc<ActivityLog>,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let state = Arc::new(ServerState::new(&config, source, activity));
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Signal playground listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
