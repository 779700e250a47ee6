//! Session history endpoints

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::{attach_session, resolve_session};
use crate::session::{clear_session_cookie, session_id_from_headers, HistoryEntry};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session: Uuid,
    /// Newest first
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    /// False when the cookie named no live session
    pub ended: bool,
}

/// GET /api/history
///
/// Every retained entry for the caller's session
pub async fn get_history(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session, created) = resolve_session(&state, &headers).await;
    let entries = state.sessions.history(session).await;

    let response = Json(HistoryResponse { session, entries }).into_response();
    attach_session(response, session, created)
}

/// DELETE /api/session
///
/// Drops the session and its history, and expires the cookie
pub async fn end_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ended = match session_id_from_headers(&headers) {
        Some(id) => state.sessions.end(id).await,
        None => false,
    };

    let mut response = Json(EndSessionResponse { ended }).into_response();
    clear_session_cookie(&mut response);
    response
}
