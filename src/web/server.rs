//! HTTP server for the conversion form
//!
//! # Routes
//!
//! - `GET /` - Empty form
//! - `POST /` - Form submission (parse or convert)
//! - `GET /health` - Health check
//! - `POST /api/parse` - Parse a manifest (JSON)
//! - `POST /api/convert` - Merge overrides (JSON)
//!
//! # Example
//!
//! ```no_run
//! use repodeps::config::ServerConfig;
//! use repodeps::web::WebServer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = WebServer::new(ServerConfig::default()).expect("Failed to create server");
//!     server.run().await.expect("Server failed");
//! }
//! ```

use super::api;
use super::render::Templates;
use super::workflow::{self, Page, Submission};
use crate::config::ServerConfig;
use crate::{RepoDepsError, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared server state
struct AppState {
    templates: Templates,
    config: ServerConfig,
}

/// HTTP server for the conversion form and API
pub struct WebServer {
    state: Arc<AppState>,
}

impl WebServer {
    /// Create a server, compiling the page templates
    pub fn new(config: ServerConfig) -> Result<Self> {
        Ok(Self {
            state: Arc::new(AppState {
                templates: Templates::new()?,
                config,
            }),
        })
    }

    /// Router for this server, for serving or driving in tests
    pub fn app(&self) -> Router {
        Self::router(self.state.clone())
    }

    fn router(state: Arc<AppState>) -> Router {
        let max_body_size = state.config.max_body_size;

        Router::new()
            .route("/", get(index).post(submit))
            .route("/health", get(health))
            .route("/api/parse", post(api::parse_manifest))
            .route("/api/convert", post(api::convert_records))
            .layer(DefaultBodyLimit::max(max_body_size))
            .with_state(state)
    }

    /// Run the server on the configured address
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| RepoDepsError::Server(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!(
            addr = %addr,
            max_body_size = self.state.config.max_body_size,
            "Web server listening"
        );

        axum::serve(listener, Self::router(self.state))
            .await
            .map_err(RepoDepsError::Io)
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let html = state.templates.render(&Page::empty(String::new()))?;
    Ok(Html(html))
}

async fn submit(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Html<String>> {
    let submission = Submission::from_form(&fields);
    tracing::debug!(
        submission = submission.kind(),
        fields = fields.len(),
        "Form submitted"
    );

    let page = workflow::process(submission);
    let html = state.templates.render(&page)?;
    Ok(Html(html))
}
