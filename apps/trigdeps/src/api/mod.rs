//! # trigdeps HTTP API Module
//!
//! HTTP endpoint through which the selection popup delivers batches.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /dependencies` - Current list
//! - `GET /rows` - Current list rendered as table rows
//! - `GET /form` - Fields the containing form submits
//! - `POST /popup` - Merge a popup batch (`{"object": ..., "values": [...]}`)
//! - `POST /dependencies/remove` - Remove one dependency
//!
//! ## Environment Variables
//!
//! - `TRIGDEPS_CORS_ORIGINS`: Comma-separated allowed origins, or "*" for all (default: localhost only)
//! - `TRIGDEPS_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod types;

pub use auth::{API_KEY_ENV, get_api_key_from_env};
pub use handlers::{
    form_handler, health_handler, list_handler, popup_handler, remove_handler, rows_handler,
};
pub use types::{
    FieldJson, FormResponse, HealthResponse, ListResponse, PopupResponse, RemoveRequest,
    RemoveResponse, encode_form,
};

use crate::config::AppConfig;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use trigdeps_core::{DependencyList, DependencyMerger, MalformedPolicy, TrigDepsError};

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
///
/// Every mutation takes the write lock, so merges and removals on the list
/// are applied one at a time.
#[derive(Clone)]
pub struct AppState {
    pub list: Arc<RwLock<DependencyList>>,
    pub merger: Arc<DependencyMerger>,
    pub policy: MalformedPolicy,
    /// Snapshot file rewritten after every change, if set.
    pub store: Option<Arc<PathBuf>>,
}

impl AppState {
    /// Create state for a list and configuration, without persistence.
    #[must_use]
    pub fn new(list: DependencyList, config: &AppConfig) -> Self {
        Self {
            list: Arc::new(RwLock::new(list)),
            merger: Arc::new(config.merger()),
            policy: config.merge.malformed,
            store: None,
        }
    }

    /// Persist the list to `path` after every change.
    #[must_use]
    pub fn with_store(mut self, path: PathBuf) -> Self {
        self.store = Some(Arc::new(path));
        self
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `TRIGDEPS_CORS_ORIGINS`.
fn build_cors_layer() -> CorsLayer {
    match std::env::var("TRIGDEPS_CORS_ORIGINS").ok().as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (TRIGDEPS_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| match s.trim().parse::<HeaderValue>() {
                    Ok(hv) => Some(hv),
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", s.trim(), e);
                        None
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                restrictive_cors(allowed)
            }
        }
        None => build_localhost_cors(),
    }
}

/// CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:8080",
        "http://127.0.0.1:8080",
        "http://localhost",
        "http://127.0.0.1",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    restrictive_cors(origins)
}

fn restrictive_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED. Set {} to enable it.",
            API_KEY_ENV
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/dependencies", get(handlers::list_handler))
        .route("/dependencies/remove", post(handlers::remove_handler))
        .route("/rows", get(handlers::rows_handler))
        .route("/form", get(handlers::form_handler))
        .route("/popup", post(handlers::popup_handler));

    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), TrigDepsError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TrigDepsError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("trigdeps HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TrigDepsError::IoError(format!("Server error: {}", e)))
}

/// Resolve on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
