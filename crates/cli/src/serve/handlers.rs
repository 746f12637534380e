//! Core HTTP route handlers: health and form sessions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use feedback_core::{gate, FlowError, FormInputs};

use super::json_error;
use super::state::{AppState, SessionSlot};

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "open_sessions": state.sessions.len().await,
    });
    (StatusCode::OK, Json(response))
}

fn flow_status(error: &FlowError) -> StatusCode {
    match error {
        FlowError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FlowError::NoSuchPage(_) => StatusCode::NOT_FOUND,
        FlowError::NotADataPage(_) => StatusCode::BAD_REQUEST,
        FlowError::TerminalRequiresSubmit
        | FlowError::NotOnFinalPage { .. }
        | FlowError::IncompletePages { .. }
        | FlowError::AlreadySubmitted => StatusCode::CONFLICT,
    }
}

fn flow_error(error: &FlowError) -> Response {
    (flow_status(error), Json(error.to_json_value())).into_response()
}

fn session_not_found(id: &str) -> Response {
    json_error(StatusCode::NOT_FOUND, &format!("session '{}' not found", id)).into_response()
}

/// Everything a client needs to draw the current page.
fn snapshot(id: &str, slot: &SessionSlot) -> serde_json::Value {
    let page = slot.session.current_page();
    serde_json::json!({
        "id": id,
        "page": page.number(),
        "title": page.title(),
        "submitted": slot.session.is_submitted(),
        "progress": slot.session.progress(),
        "gate": gate::evaluate(page, &slot.inputs),
        "inputs": slot.inputs,
    })
}

/// POST /sessions
pub(crate) async fn handle_create_session(State(state): State<Arc<AppState>>) -> Response {
    let Some((id, slot)) = state.sessions.create().await else {
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "too many open sessions, try again later",
        )
        .into_response();
    };
    tracing::debug!(session = %id, "session opened");
    let slot = slot.lock().await;
    (StatusCode::CREATED, Json(snapshot(&id, &slot))).into_response()
}

/// GET /sessions/{id}
pub(crate) async fn handle_get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(slot) = state.sessions.get(&id).await else {
        return session_not_found(&id);
    };
    let slot = slot.lock().await;
    (StatusCode::OK, Json(snapshot(&id, &slot))).into_response()
}

/// PUT /sessions/{id}/inputs
///
/// Replaces the live inputs wholesale and returns the gate for the current
/// page. Nothing is validated or merged until the client navigates.
pub(crate) async fn handle_put_inputs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(inputs): Json<FormInputs>,
) -> Response {
    let Some(slot) = state.sessions.get(&id).await else {
        return session_not_found(&id);
    };
    let mut slot = slot.lock().await;
    if slot.session.is_submitted() {
        return flow_error(&FlowError::AlreadySubmitted);
    }
    slot.inputs = inputs;
    let gate_state = gate::evaluate(slot.session.current_page(), &slot.inputs);
    (StatusCode::OK, Json(serde_json::json!({ "gate": gate_state }))).into_response()
}

/// POST /sessions/{id}/goto/{page}
pub(crate) async fn handle_goto(
    State(state): State<Arc<AppState>>,
    Path((id, page)): Path<(String, u8)>,
) -> Response {
    let Some(slot) = state.sessions.get(&id).await else {
        return session_not_found(&id);
    };
    let mut guard = slot.lock().await;
    let slot = &mut *guard;
    match slot.session.go_to(page, &slot.inputs) {
        Ok(_) => (StatusCode::OK, Json(snapshot(&id, slot))).into_response(),
        Err(e) => flow_error(&e),
    }
}

/// POST /sessions/{id}/submit
///
/// Storage failures do not fail the request: the receipt carries
/// `durable: false` instead. A submitted session is closed.
pub(crate) async fn handle_submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(slot) = state.sessions.get(&id).await else {
        return session_not_found(&id);
    };
    let mut guard = slot.lock().await;
    let slot = &mut *guard;
    let result = slot.session.submit(&slot.inputs, state.store.as_ref()).await;
    drop(guard);
    match result {
        Ok(receipt) => {
            state.sessions.remove(&id).await;
            tracing::debug!(session = %id, durable = receipt.durable, "session submitted");
            (StatusCode::OK, Json(receipt)).into_response()
        }
        Err(e) => flow_error(&e),
    }
}

/// DELETE /sessions/{id}
pub(crate) async fn handle_delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    if state.sessions.remove(&id).await {
        tracing::debug!(session = %id, "session closed");
        StatusCode::NO_CONTENT.into_response()
    } else {
        session_not_found(&id)
    }
}
