//! `feedback serve` -- HTTP JSON API for the survey and the admin dashboard.
//!
//! Form sessions live in memory on the server; completed forms are appended
//! to the configured record store. A session is closed once it submits, and
//! idle sessions expire after two hours.
//!
//! Endpoints:
//! - GET    /health                          - Server status
//! - POST   /sessions                        - Open a form session (start page)
//! - GET    /sessions/{id}                   - Current page, progress and gate
//! - PUT    /sessions/{id}/inputs            - Replace live inputs, returns gate
//! - POST   /sessions/{id}/goto/{page}       - Navigate (forward moves validate)
//! - POST   /sessions/{id}/submit            - Submit from page 6
//! - DELETE /sessions/{id}                   - Exit and discard the session
//! - GET    /admin/stats                     - Dashboard figures
//! - GET    /admin/responses                 - Filtered, sorted response list
//! - GET    /admin/responses/{id}            - One response with its detail view
//! - GET    /admin/export                    - CSV download
//!
//! Admin endpoints require `X-Admin-User` and `X-Admin-Password` headers.
//! All other responses use Content-Type: application/json.

mod dashboard;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{middleware as axum_middleware, Json, Router};
use feedback_core::{Authenticator, RecordStore};
use tower_http::cors::{Any, CorsLayer};

use self::dashboard::{handle_export, handle_list, handle_show, handle_stats};
use self::handlers::{
    handle_create_session, handle_delete_session, handle_get_session, handle_goto, handle_health,
    handle_not_found, handle_put_inputs, handle_submit,
};
use self::middleware::admin_auth_middleware;
use self::state::{AppState, SessionRegistry};

/// Maximum request body size: 64 KB. A full set of form inputs is far smaller.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Maximum number of form sessions held open at once.
const MAX_SESSIONS: usize = 10_000;

/// Sessions untouched this long are dropped.
const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let admin = Router::new()
        .route("/stats", get(handle_stats))
        .route("/responses", get(handle_list))
        .route("/responses/{id}", get(handle_show))
        .route("/export", get(handle_export))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/health", get(handle_health))
        .route("/sessions", post(handle_create_session))
        .route(
            "/sessions/{id}",
            get(handle_get_session).delete(handle_delete_session),
        )
        .route("/sessions/{id}/inputs", put(handle_put_inputs))
        .route("/sessions/{id}/goto/{page}", post(handle_goto))
        .route("/sessions/{id}/submit", post(handle_submit))
        .nest("/admin", admin)
        .fallback(handle_not_found)
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Start the HTTP server on the given port.
pub async fn start_server<S, A>(
    port: u16,
    store: S,
    authenticator: A,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: RecordStore,
    A: Authenticator + 'static,
{
    let state = Arc::new(AppState {
        store: Arc::new(store),
        sessions: SessionRegistry::default(),
        authenticator: Arc::new(authenticator),
    });

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "feedback server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}
