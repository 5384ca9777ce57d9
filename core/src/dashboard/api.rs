// Dashboard HTTP API server
//
// Serves the page, the view model, and per-session input/SSE endpoints

use crate::binder::{Binder, InputId, InputValue};
use crate::catalog::SiteCatalog;
use crate::dashboard::session::SessionRegistry;
use crate::dashboard::DashboardConfig;
use crate::dataset::Dataset;
use crate::layout::Layout;
use crate::DashError;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive},
        Html, IntoResponse, Response, Sse,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

/// Dashboard server state
#[derive(Clone)]
struct DashboardState {
    layout: Arc<Layout>,
    sessions: Arc<SessionRegistry>,
}

/// Dashboard HTTP server
pub struct DashboardServer {
    config: DashboardConfig,
    layout: Arc<Layout>,
    sessions: Arc<SessionRegistry>,
}

impl DashboardServer {
    pub fn new(config: DashboardConfig, dataset: Arc<Dataset>) -> Self {
        let catalog = SiteCatalog::from_records(dataset.records());
        let layout = Arc::new(Layout::build(&dataset, &catalog));
        let sessions = Arc::new(SessionRegistry::new(
            dataset,
            Arc::new(Binder::standard()),
            config.sse_capacity,
            config.session_ttl_secs,
        ));

        info!(
            target: "dashboard",
            sites = catalog.sites().count(),
            "Dashboard view model built"
        );

        Self {
            config,
            layout,
            sessions,
        }
    }

    pub fn sessions(&self) -> Arc<SessionRegistry> {
        self.sessions.clone()
    }

    pub fn router(&self) -> Router {
        let state = DashboardState {
            layout: self.layout.clone(),
            sessions: self.sessions.clone(),
        };

        Router::new()
            .route("/", get(index_handler))
            .route("/static/*asset", get(static_asset_handler))
            .route("/api/health", get(health_handler))
            .route("/api/layout", get(layout_handler))
            .route("/api/sessions", post(create_session_handler))
            .route("/api/sessions/:session_id/input", post(input_handler))
            .route("/api/sessions/:session_id/stream", get(stream_handler))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(state)
    }

    /// Start the Dashboard server and run until the process is killed
    pub async fn serve(self) -> crate::Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the Dashboard server and stop once `shutdown` resolves
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> crate::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.addr();
        info!(
            target: "dashboard",
            addr = %addr,
            "Starting Dashboard server"
        );

        let listener = tokio::net::TcpListener::bind(&addr).await?;

        // Start cleanup task for idle sessions
        let sessions = self.sessions.clone();
        let cleanup = tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));
            loop {
                interval.tick().await;
                sessions.cleanup();
            }
        });

        let app = self.router();

        info!(
            target: "dashboard",
            url = %format!("http://{}", addr),
            "Dashboard server ready"
        );

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;
        cleanup.abort();
        result?;

        info!(target: "dashboard", "Dashboard server stopped");
        Ok(())
    }
}

impl IntoResponse for DashError {
    fn into_response(self) -> Response {
        let status = match &self {
            DashError::UnknownSession(_) => StatusCode::NOT_FOUND,
            DashError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

const FALLBACK_INDEX: &str = r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>Launch Dash</title></head><body><h1>Launch Dash assets not found</h1></body></html>"#;

/// Serve the main HTML page
async fn index_handler() -> Html<&'static str> {
    let html = crate::dashboard::static_assets::get_text("index.html").unwrap_or(FALLBACK_INDEX);
    Html(html)
}

async fn static_asset_handler(Path(asset): Path<String>) -> impl IntoResponse {
    match crate::dashboard::static_assets::get(asset.as_str()) {
        Some(asset) => {
            let mut headers = HeaderMap::new();
            if let Ok(value) = header::HeaderValue::from_str(asset.content_type) {
                headers.insert(header::CONTENT_TYPE, value);
            }
            (StatusCode::OK, headers, asset.body).into_response()
        }
        None => {
            let headers = HeaderMap::new();
            (StatusCode::NOT_FOUND, headers, b"Not found".as_slice()).into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Get the static view model
async fn layout_handler(State(state): State<DashboardState>) -> impl IntoResponse {
    Json(state.layout.as_ref().clone())
}

async fn create_session_handler(State(state): State<DashboardState>) -> impl IntoResponse {
    let session_id = state.sessions.create();
    (StatusCode::CREATED, Json(json!({ "session_id": session_id })))
}

/// Control change sent by the browser
#[derive(Deserialize)]
struct InputEvent {
    id: String,
    #[serde(default)]
    value: Value,
}

async fn input_handler(
    State(state): State<DashboardState>,
    Path(session_id): Path<String>,
    Json(event): Json<InputEvent>,
) -> Result<impl IntoResponse, DashError> {
    let input = InputId::parse(&event.id)
        .ok_or_else(|| DashError::InvalidInput(format!("unknown control `{}`", event.id)))?;
    let value = InputValue::from_json(input, &event.value)?;

    let replaced = state.sessions.apply_input(&session_id, value).await?;
    debug!(
        target: "dashboard",
        session_id = %session_id,
        input = %input,
        replaced = replaced.len(),
        "Input dispatched"
    );

    Ok(Json(json!({ "replaced": replaced })))
}

/// SSE endpoint: current charts on connect, then every replacement
async fn stream_handler(
    State(state): State<DashboardState>,
    Path(session_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, DashError> {
    let (initial, rx) = state.sessions.subscribe(&session_id).await?;
    info!(target: "dashboard", session_id = %session_id, "SSE client connected");

    let live = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(update) => Some(update),
        Err(e) => {
            warn!(target: "dashboard", error = %e, "Broadcast error");
            None
        }
    });

    let stream = tokio_stream::iter(initial)
        .chain(live)
        .filter_map(|update| match serde_json::to_string(&update) {
            Ok(json) => Some(Ok(Event::default().event("output").data(json))),
            Err(e) => {
                warn!(target: "dashboard", error = %e, "Failed to serialize chart update");
                None
            }
        });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
