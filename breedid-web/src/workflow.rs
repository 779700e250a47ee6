//! Upload → classification → gallery/history
//!
//! On accept the image is stored in the gallery and a [`HistoryEntry`] is
//! appended to the session. On reject nothing is written; the decoded image
//! is handed back as JPEG so the page can still show it.

use breedid_classifier::Classification;
use breedid_common::time;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::gallery::encode_jpeg;
use crate::session::HistoryEntry;
use crate::upload::{check_extension, Upload};
use crate::AppState;

/// Result of processing one upload
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub classification: Classification,
    /// Set only for accepted uploads
    pub entry: Option<HistoryEntry>,
    /// JPEG bytes of a rejected upload
    pub preview: Option<Vec<u8>>,
}

/// Run one upload through the pipeline
///
/// Uploads are processed one at a time; CPU-bound work runs on the
/// blocking pool.
pub async fn process_upload(
    state: &AppState,
    session: Uuid,
    upload: Upload,
) -> ApiResult<UploadOutcome> {
    check_extension(&upload.file_name)?;

    let _guard = state.pipeline_lock.lock().await;

    let classifier = state.classifier.clone();
    let gallery = state.gallery.clone();
    let file_name = upload.file_name;
    let bytes = upload.bytes;

    let (classification, stored, preview) = tokio::task::spawn_blocking(move || -> ApiResult<_> {
        let image = classifier.decode(&bytes)?;
        let classification = classifier.classify(&image)?;

        if classification.is_accepted() {
            let at = time::now();
            let path = gallery.save(&image, &at)?;
            Ok((classification, Some((time::format_stamp(&at), path)), None))
        } else {
            Ok((classification, None, Some(encode_jpeg(&image)?)))
        }
    })
    .await
    .map_err(|e| ApiError::Internal(format!("classification task failed: {}", e)))??;

    let entry = match (stored, classification.result.accepted_label()) {
        (Some((timestamp, image_path)), Some(label)) => {
            let entry = HistoryEntry {
                timestamp,
                label: label.display_name(),
                confidence: classification.result.confidence_percent(),
                image_path,
            };
            if !state.sessions.append(session, entry.clone()).await {
                debug!("Session {} ended during upload, history not recorded", session);
            }
            info!(
                "Upload '{}' classified as {} ({}), stored {}",
                file_name,
                entry.label,
                entry.confidence,
                entry.file_name()
            );
            Some(entry)
        }
        _ => {
            info!("Upload '{}' not recognized", file_name);
            None
        }
    };

    Ok(UploadOutcome {
        classification,
        entry,
        preview,
    })
}
