//! HTTP request handlers for the status server.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};

use super::AppState;
use crate::report;

/// Rendered HTML status page.
pub async fn handle_status_page(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.load() {
        Ok(Some(snapshot)) => match report::render_html(&snapshot) {
            Ok(page) => Html(page).into_response(),
            Err(e) => {
                tracing::error!("rendering status page: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "render failed").into_response()
            }
        },
        Ok(None) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Html("<h1>No snapshot yet</h1><p>Waiting for the first monitoring run.</p>".to_string()),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("loading snapshot: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Raw snapshot JSON, the same artifact the run persists.
pub async fn handle_status_json(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.load() {
        Ok(Some(snapshot)) => Json(snapshot).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "no snapshot yet").into_response(),
        Err(e) => {
            tracing::error!("loading snapshot: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
