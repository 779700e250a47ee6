//! HTML form routes
//!
//! Errors on the form route are rendered inside the page, with the status
//! the JSON API would use.

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use base64::{engine::general_purpose, Engine as _};
use breedid_classifier::BreedInfo;
use tracing::warn;
use uuid::Uuid;

use super::{attach_session, resolve_session};
use crate::render::{render_page, PageView, ResultView};
use crate::upload::read_upload;
use crate::workflow::{process_upload, UploadOutcome};
use crate::AppState;

/// GET /
///
/// Renders the page with the session's recent history and the gallery
pub async fn serve_index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session, created) = resolve_session(&state, &headers).await;
    let view = page_view(&state, session, None, None).await;
    attach_session(Html(render_page(&view)).into_response(), session, created)
}

/// POST /classify
///
/// Multipart form upload; renders the page with the result
pub async fn classify_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let (session, created) = resolve_session(&state, &headers).await;

    let outcome = match read_upload(&mut multipart).await {
        Ok(upload) => process_upload(&state, session, upload).await,
        Err(e) => Err(e),
    };

    let (status, result, error) = match outcome {
        Ok(outcome) => (StatusCode::OK, Some(result_view(&outcome)), None),
        Err(e) => {
            e.log();
            (e.status(), None, Some(e.to_string()))
        }
    };

    let view = page_view(&state, session, result, error).await;
    let mut response = Html(render_page(&view)).into_response();
    *response.status_mut() = status;
    attach_session(response, session, created)
}

fn result_view(outcome: &UploadOutcome) -> ResultView {
    let accepted = outcome.classification.result.accepted_label();
    match (accepted, &outcome.entry) {
        (Some(label), Some(entry)) => ResultView::Accepted {
            display_label: label.display_name(),
            confidence: outcome.classification.result.confidence_percent(),
            info: outcome
                .classification
                .info
                .clone()
                .unwrap_or(BreedInfo::UNKNOWN),
            image_file: entry.file_name(),
        },
        _ => ResultView::Rejected {
            preview: outcome.preview.as_deref().map(jpeg_data_uri),
        },
    }
}

fn jpeg_data_uri(bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", general_purpose::STANDARD.encode(bytes))
}

async fn page_view(
    state: &AppState,
    session: Uuid,
    result: Option<ResultView>,
    error: Option<String>,
) -> PageView {
    let gallery = match state.gallery.recent(state.config.gallery.display_limit) {
        Ok(files) => files,
        Err(e) => {
            warn!("Failed to list gallery {}: {}", state.gallery.dir().display(), e);
            Vec::new()
        }
    };

    let history = state
        .sessions
        .recent(session, state.config.history.display_limit)
        .await;

    PageView {
        breeds: state
            .classifier
            .labels()
            .iter()
            .map(|label| label.display_name())
            .collect(),
        result,
        error,
        gallery,
        history,
    }
}
