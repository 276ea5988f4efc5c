//! # API Endpoint Handlers

use super::{
    AppState,
    types::{FormResponse, HealthResponse, ListResponse, PopupResponse, RemoveRequest, RemoveResponse},
};
use crate::popup::{decode_payload, handle_popup};
use crate::store::save_list;
use axum::{Json, body::Bytes, extract::State, http::StatusCode, response::IntoResponse};
use trigdeps_core::{DependencyList, HtmlRowRenderer, RowRenderer, TrigDepsError, TriggerId};

/// Map a core error to an HTTP status.
fn status_for(error: &TrigDepsError) -> StatusCode {
    match error {
        TrigDepsError::InvalidBatch(_) | TrigDepsError::InvalidTriggerId(_) => {
            StatusCode::BAD_REQUEST
        }
        TrigDepsError::MissingContext | TrigDepsError::InvalidConfig(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        TrigDepsError::SerializationError(_) | TrigDepsError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Write the list to the snapshot file, if the server has one.
fn persist(state: &AppState, list: &DependencyList) -> Result<(), TrigDepsError> {
    match &state.store {
        Some(path) => save_list(list, path),
        None => Ok(()),
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// LIST HANDLERS
// =============================================================================

/// Current list in display order.
pub async fn list_handler(State(state): State<AppState>) -> impl IntoResponse {
    let list = state.list.read().await;
    (StatusCode::OK, Json(ListResponse::from(&*list)))
}

/// Every row rendered, for the initial page.
pub async fn rows_handler(State(state): State<AppState>) -> impl IntoResponse {
    let list = state.list.read().await;
    (StatusCode::OK, Json(HtmlRowRenderer.render_all(&*list)))
}

/// Fields the containing form submits.
pub async fn form_handler(State(state): State<AppState>) -> impl IntoResponse {
    let list = state.list.read().await;
    (StatusCode::OK, Json(FormResponse::from(&*list)))
}

// =============================================================================
// POPUP HANDLER
// =============================================================================

/// Merge a batch returned by the selection popup.
///
/// The body is decoded here rather than by the `Json` extractor so that a
/// body that is not JSON falls under the malformed-batch policy.
pub async fn popup_handler(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let payload = match decode_payload(&body, state.policy) {
        Ok(payload) => payload,
        Err(e) => return (status_for(&e), Json(PopupResponse::error(e.to_string()))),
    };

    let mut list = state.list.write().await;
    let before = (*list).clone();

    let appended = match handle_popup(&state.merger, &mut list, &payload, state.policy) {
        Ok(appended) => appended,
        Err(e) => {
            return (status_for(&e), Json(PopupResponse::error(e.to_string())));
        }
    };

    if !appended.is_empty() {
        if let Err(e) = persist(&state, &list) {
            // Memory must match the snapshot, or a retry would skip these rows.
            *list = before;
            tracing::error!(event = "persist_failure", error = %e, "Failed to save state");
            return (status_for(&e), Json(PopupResponse::error(e.to_string())));
        }
    }

    let rows = HtmlRowRenderer.render_all(&appended);
    (StatusCode::OK, Json(PopupResponse::success(rows, list.len())))
}

// =============================================================================
// REMOVE HANDLER
// =============================================================================

/// Remove one dependency. Unknown ids succeed with `removed: false`.
pub async fn remove_handler(
    State(state): State<AppState>,
    Json(request): Json<RemoveRequest>,
) -> impl IntoResponse {
    let triggerid = match TriggerId::parse(request.triggerid) {
        Ok(id) => id,
        Err(e) => return (status_for(&e), Json(RemoveResponse::error(e.to_string()))),
    };

    let mut list = state.list.write().await;
    let before = (*list).clone();
    let removed = state.merger.remove(&mut list, &triggerid).is_some();

    if removed {
        if let Err(e) = persist(&state, &list) {
            *list = before;
            tracing::error!(event = "persist_failure", error = %e, "Failed to save state");
            return (status_for(&e), Json(RemoveResponse::error(e.to_string())));
        }
        tracing::info!(event = "dependency_removed", triggerid = %triggerid, "Removed dependency");
    }

    (StatusCode::OK, Json(RemoveResponse::success(removed)))
}
