//! Staging of uploaded files on local disk.
//!
//! A staged file lives at `<upload_dir>/<sanitized name>` and is removed when
//! the [`StagedUpload`] is dropped, whichever way the request ends.

use crate::error::ApiError;
use regex::Regex;
use std::io::{self, Write};
use std::path::Path;
use std::sync::OnceLock;
use tempfile::NamedTempFile;

const FALLBACK_NAME: &str = "upload";

pub struct StagedUpload {
    file: NamedTempFile,
    file_name: String,
}

impl StagedUpload {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        log::debug!("Removing staged upload {}", self.file.path().display());
    }
}

fn unsafe_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid file name pattern"))
}

/// Reduces a client-supplied name to a single safe path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = unsafe_chars().replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Writes `bytes` to the upload directory under the sanitized name.
///
/// An existing file with the same name is a conflict, not an overwrite.
pub fn stage_upload(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<StagedUpload, ApiError> {
    let file_name = sanitize_file_name(file_name);

    std::fs::create_dir_all(dir)
        .map_err(|e| ApiError::Internal(format!("Failed to create upload directory: {e}")))?;

    let mut file = tempfile::Builder::new()
        .prefix(&file_name)
        .rand_bytes(0)
        .tempfile_in(dir)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => {
                log::warn!("Upload {} already exists in {}", file_name, dir.display());
                ApiError::Conflict("File already exists".to_string())
            }
            _ => ApiError::Internal(format!("Failed to stage upload: {e}")),
        })?;

    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| ApiError::Internal(format!("Failed to write upload: {e}")))?;

    log::info!("Staged upload at {}", file.path().display());
    Ok(StagedUpload { file, file_name })
}
