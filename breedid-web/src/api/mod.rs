//! HTTP API handlers for breedid-web

pub mod buildinfo;
pub mod classify;
pub mod gallery;
pub mod health;
pub mod history;
pub mod ui;

pub use buildinfo::get_build_info;
pub use classify::classify_json;
pub use gallery::get_gallery;
pub use health::health_routes;
pub use history::{end_session, get_history};
pub use ui::{classify_form, serve_index};

use axum::http::HeaderMap;
use axum::response::Response;
use uuid::Uuid;

use crate::session::{session_id_from_headers, set_session_cookie};
use crate::AppState;

/// Session for this request; `true` when it was just created
pub(crate) async fn resolve_session(state: &AppState, headers: &HeaderMap) -> (Uuid, bool) {
    state
        .sessions
        .resolve(session_id_from_headers(headers))
        .await
}

/// Set the cookie only when the session is new
pub(crate) fn attach_session(mut response: Response, id: Uuid, created: bool) -> Response {
    if created {
        set_session_cookie(&mut response, id);
    }
    response
}
