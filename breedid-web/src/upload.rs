//! Multipart upload extraction and file-type filtering

use axum::extract::Multipart;

use crate::error::{ApiError, ApiResult};

/// Form field carrying the image
pub const UPLOAD_FIELD: &str = "image";

/// Accepted upload extensions (case-insensitive)
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// One uploaded file
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Pull the `image` field out of a multipart body
///
/// Other fields are ignored. A missing or empty file is a bad request.
pub async fn read_upload(multipart: &mut Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("no file uploaded".to_string()));
        }

        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::BadRequest(format!(
        "missing '{}' file field",
        UPLOAD_FIELD
    )))
}

/// Reject anything that is not a jpg/jpeg/png by name
pub fn check_extension(file_name: &str) -> ApiResult<()> {
    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    if ALLOWED_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
    {
        Ok(())
    } else {
        Err(ApiError::UnsupportedMediaType(format!(
            "'{}' (allowed: {})",
            file_name,
            ALLOWED_EXTENSIONS.join(", ")
        )))
    }
}
