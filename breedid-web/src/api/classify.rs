//! JSON classification endpoint

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use breedid_classifier::{BreedInfo, LabelScore};
use serde::Serialize;

use super::{attach_session, resolve_session};
use crate::error::ApiResult;
use crate::render::{REJECTION_DETAIL, REJECTION_TITLE};
use crate::upload::read_upload;
use crate::workflow::{process_upload, UploadOutcome};
use crate::AppState;

/// Classification response
///
/// Rejected results carry only `accepted`, `message` and `detail`.
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<BreedInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<LabelScore>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<&'static str>,
}

impl From<UploadOutcome> for ClassifyResponse {
    fn from(outcome: UploadOutcome) -> Self {
        let classification = outcome.classification;
        match classification.result.accepted_label() {
            Some(label) => ClassifyResponse {
                accepted: true,
                label: Some(label.as_str().to_string()),
                display_label: Some(label.display_name()),
                confidence: Some(classification.result.confidence_percent()),
                info: classification.info.clone(),
                image: outcome.entry.map(|entry| entry.file_name()),
                scores: Some(classification.scores),
                message: None,
                detail: None,
            },
            None => ClassifyResponse {
                accepted: false,
                label: None,
                display_label: None,
                confidence: None,
                info: None,
                image: None,
                scores: None,
                message: Some(REJECTION_TITLE),
                detail: Some(REJECTION_DETAIL),
            },
        }
    }
}

/// POST /api/classify
///
/// Multipart upload (`image` field); returns [`ClassifyResponse`]
pub async fn classify_json(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let (session, created) = resolve_session(&state, &headers).await;

    let upload = read_upload(&mut multipart).await?;
    let outcome = process_upload(&state, session, upload).await?;

    let response = Json(ClassifyResponse::from(outcome)).into_response();
    Ok(attach_session(response, session, created))
}
