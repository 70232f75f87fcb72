use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use std::collections::HashMap;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A multipart upload: at most one file plus its text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Reads every part; the first part named `file_field` is taken as the file.
    pub async fn read(multipart: &mut Multipart, file_field: &str) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| rejection(e, "Invalid multipart payload"))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == file_field {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| name.clone());
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| rejection(e, "Failed to read uploaded file"))?;

                if form.file.is_none() {
                    log::info!("Received upload {} ({} bytes)", file_name, bytes.len());
                    form.file = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| rejection(e, &format!("Failed to read field {name}")))?;
            form.fields.entry(name).or_insert(value);
        }

        Ok(form)
    }

    /// A text field, treating empty values as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn owned_text(&self, name: &str) -> Option<String> {
        self.text(name).map(str::to_string)
    }
}

// Body-limit hits surface as multipart errors; keep them apart from malformed input.
fn rejection(error: MultipartError, context: &str) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        log::warn!("{}: upload exceeds the body limit", context);
        ApiError::PayloadTooLarge
    } else {
        ApiError::bad_request(format!("{context}: {error}"))
    }
}
