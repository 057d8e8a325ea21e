use actix_multipart::Multipart;
use futures::stream::TryStreamExt;
use std::collections::HashMap;

use crate::utils::error::ApiError;

/// Largest single file accepted in a form (10 MB)
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
/// Largest text field accepted in a form
const MAX_TEXT_BYTES: usize = 64 * 1024;
/// Text fields accepted in one form
const MAX_TEXT_FIELDS: usize = 32;

/// File fields a form accepts, how many files each may carry, and the
/// byte budget for the whole body. Checked while the stream is read.
#[derive(Debug, Clone, Copy)]
pub struct FormLimits {
    pub files: &'static [(&'static str, usize)],
    pub max_total_bytes: usize,
}

impl FormLimits {
    fn max_files(&self, field: &str) -> Option<usize> {
        self.files.iter().find(|(name, _)| *name == field).map(|(_, max)| *max)
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A parsed multipart form: text fields by name plus every file part
#[derive(Debug, Default)]
pub struct FormData {
    pub text: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl FormData {
    /// Trimmed, non-empty text value
    pub fn value(&self, name: &str) -> Option<String> {
        self.text
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn files_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a UploadedFile> + 'a {
        self.files.iter().filter(move |f| f.field == name)
    }
}

fn invalid_body(e: impl std::fmt::Display) -> ApiError {
    ApiError::Validation(format!("Invalid multipart body: {}", e))
}

/// Drains a multipart stream. A part with a filename is a file; anything
/// else is read as UTF-8 text. Fails with 400 as soon as a file arrives in
/// a field `limits` doesn't list, a field exceeds its file count, or the
/// body outgrows `limits.max_total_bytes`.
pub async fn read_form(mut payload: Multipart, limits: &FormLimits) -> Result<FormData, ApiError> {
    let mut form = FormData::default();
    let mut file_counts: HashMap<String, usize> = HashMap::new();
    let mut total_bytes = 0usize;

    while let Some(mut field) = payload.try_next().await.map_err(invalid_body)? {
        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().unwrap_or_default().to_string(),
                cd.get_filename().map(|f| f.to_string()),
            ),
            None => (String::new(), None),
        };

        let limit = if filename.is_some() {
            let max = limits
                .max_files(&name)
                .ok_or_else(|| ApiError::Validation(format!("Unexpected file field '{}'", name)))?;
            let count = file_counts.entry(name.clone()).or_insert(0);
            *count += 1;
            if *count > max {
                return Err(ApiError::Validation(format!(
                    "A maximum of {} file(s) is allowed in '{}'",
                    max, name
                )));
            }
            MAX_FILE_BYTES
        } else {
            if form.text.len() >= MAX_TEXT_FIELDS {
                return Err(ApiError::Validation(format!(
                    "A maximum of {} text fields is allowed",
                    MAX_TEXT_FIELDS
                )));
            }
            MAX_TEXT_BYTES
        };
        let content_type = field.content_type().map(|m| m.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(invalid_body)? {
            if bytes.len() + chunk.len() > limit {
                return Err(ApiError::Validation(format!(
                    "Field '{}' exceeds the {} byte limit",
                    name, limit
                )));
            }
            total_bytes += chunk.len();
            if total_bytes > limits.max_total_bytes {
                return Err(ApiError::Validation(format!(
                    "Form exceeds the {} byte limit",
                    limits.max_total_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if filename.is_some() {
            if !bytes.is_empty() {
                form.files.push(UploadedFile {
                    field: name,
                    filename,
                    content_type,
                    bytes,
                });
            }
        } else {
            let value = String::from_utf8(bytes)
                .map_err(|_| ApiError::Validation(format!("Field '{}' is not valid UTF-8", name)))?;
            form.text.insert(name, value);
        }
    }

    Ok(form)
}
