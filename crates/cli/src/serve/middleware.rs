//! HTTP middleware: admin credential check.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use feedback_core::Credentials;

use super::state::AppState;

pub(crate) const ADMIN_USER_HEADER: &str = "x-admin-user";
pub(crate) const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Admin authentication middleware, applied to the `/admin` routes only.
///
/// Requests must carry both `X-Admin-User` and `X-Admin-Password`, and the
/// pair must be accepted by the configured authenticator.
pub(crate) async fn admin_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let headers = request.headers();
    let (user, password) = match (
        header(headers, ADMIN_USER_HEADER),
        header(headers, ADMIN_PASSWORD_HEADER),
    ) {
        (Some(u), Some(p)) => (u, p),
        _ => {
            return super::json_error(StatusCode::UNAUTHORIZED, "authentication required")
                .into_response()
        }
    };

    let credentials = Credentials::new(user, password);
    if !state.authenticator.authenticate(&credentials) {
        tracing::warn!(user = %credentials.username, "rejected admin request");
        return super::json_error(StatusCode::FORBIDDEN, "Invalid username or password")
            .into_response();
    }

    next.run(request).await
}
