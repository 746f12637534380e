//! Admin dashboard routes. Mounted under `/admin` behind
//! [`admin_auth_middleware`](super::middleware::admin_auth_middleware).

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use feedback_core::{export, query, DetailView, ExportError, RecordFilter, SortKey};
use serde::Deserialize;
use time::OffsetDateTime;

use super::json_error;
use super::state::AppState;

/// Query string of `GET /admin/responses`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ListParams {
    year: Option<String>,
    search: Option<String>,
    sort: Option<String>,
}

/// GET /admin/stats
pub(crate) async fn handle_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let records = state.store.fetch_all().await;
    let stats = query::stats(&records, OffsetDateTime::now_utc());
    let response = serde_json::json!({
        "count": stats.count,
        "averageSatisfaction": stats.average_satisfaction,
        "averageLabel": stats.average_label(),
        "latest": stats.latest_label(),
        "responseRate": stats.response_rate,
        "responseRateLabel": stats.response_rate_label(),
    });
    (StatusCode::OK, Json(response))
}

/// GET /admin/responses?year=&search=&sort=
pub(crate) async fn handle_list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let records = state.store.fetch_all().await;
    let criteria = RecordFilter {
        year: params.year,
        search: params.search,
    };
    let key = params
        .sort
        .as_deref()
        .map(SortKey::parse)
        .unwrap_or_default();
    let shown = query::sort(&query::filter(&records, &criteria), key);
    let response = serde_json::json!({
        "count": shown.len(),
        "responses": shown,
    });
    (StatusCode::OK, Json(response))
}

/// GET /admin/responses/{id}
pub(crate) async fn handle_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let records = state.store.fetch_all().await;
    match query::find_by_id(&records, &id) {
        Some(record) => {
            let response = serde_json::json!({
                "record": record,
                "detail": DetailView::new(record),
            });
            (StatusCode::OK, Json(response)).into_response()
        }
        None => json_error(StatusCode::NOT_FOUND, &format!("response '{}' not found", id))
            .into_response(),
    }
}

/// GET /admin/export
pub(crate) async fn handle_export(State(state): State<Arc<AppState>>) -> Response {
    let records = state.store.fetch_all().await;
    match export::to_csv(&records) {
        Ok(csv) => {
            let filename = export::export_filename(OffsetDateTime::now_utc().date());
            tracing::info!(rows = records.len(), %filename, "export served");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                csv,
            )
                .into_response()
        }
        Err(e @ ExportError::NoData) => {
            json_error(StatusCode::NOT_FOUND, &e.to_string()).into_response()
        }
    }
}
