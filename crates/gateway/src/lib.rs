//! Loopback HTTP server exposing the tool catalog.
//!
//! Three routes: `GET /health`, `GET /tools`, and `POST /invoke`. Requests are
//! handled fully concurrently; ordering only appears once a handler submits a
//! command through the bridge. Tool failures travel in the response envelope
//! (`ok: false`), never as HTTP error statuses, so callers can always parse
//! the same shape.

use std::sync::Arc;

use {
    axum::{
        Router,
        extract::{DefaultBodyLimit, State},
        response::{IntoResponse, Json},
        routing::{get, post},
    },
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use {
    limelight_protocol::{InvokeRequest, InvokeResponse, MAX_PAYLOAD_BYTES},
    limelight_tools::ToolCatalog,
};

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ToolCatalog>,
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
pub fn build_app(catalog: Arc<ToolCatalog>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/tools", get(tools_handler))
        .route("/invoke", post(invoke_handler))
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES))
        .layer(cors)
        .with_state(AppState { catalog })
}

/// Bind and serve until the process exits.
pub async fn start_gateway(bind: &str, port: u16, catalog: Arc<ToolCatalog>) -> anyhow::Result<()> {
    let app = build_app(catalog);
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "tools": state.catalog.len(),
    }))
}

async fn tools_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "tools": state.catalog.list() }))
}

async fn invoke_handler(
    State(state): State<AppState>,
    Json(request): Json<InvokeRequest>,
) -> impl IntoResponse {
    let response = match state
        .catalog
        .invoke(&request.tool, request.arguments, request.timeout_ms)
        .await
    {
        Ok(result) => InvokeResponse::ok(result),
        Err(error) => {
            info!(tool = %request.tool, kind = %error.kind, "tool call failed");
            InvokeResponse::err(error)
        },
    };
    Json(response)
}
