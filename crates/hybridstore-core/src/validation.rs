//! Upload precondition checks
//!
//! Violations surface as `UploadError::Validation` and are never retried.

use crate::config::UploadPolicy;
use crate::error::UploadError;
use crate::models::UploadRequest;

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), UploadError> {
    if file_size == 0 {
        return Err(UploadError::Validation("File is empty".to_string()));
    }
    if file_size > max_size {
        return Err(UploadError::Validation(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Normalize MIME type by stripping parameters (e.g. "text/plain; charset=utf-8" -> "text/plain").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Validate content type against allowlist. Compares normalized MIME type only (no parameter bypass).
pub fn validate_content_type(
    content_type: &str,
    allowed_types: &[String],
) -> Result<(), UploadError> {
    let normalized = normalize_mime_type(content_type).to_lowercase();
    if !allowed_types
        .iter()
        .any(|ct| normalized == ct.to_lowercase())
    {
        return Err(UploadError::Validation(format!(
            "Invalid content type. Allowed types: {}",
            allowed_types.join(", ")
        )));
    }
    Ok(())
}

/// Validate file extension and return it lowercased.
pub fn validate_file_extension(
    filename: &str,
    allowed_extensions: &[String],
) -> Result<String, UploadError> {
    let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    if extension.is_empty() || extension == filename.to_lowercase() {
        return Err(UploadError::Validation(
            "Filename has no extension".to_string(),
        ));
    }

    if !allowed_extensions.contains(&extension) {
        return Err(UploadError::Validation(format!(
            "Invalid file extension. Allowed extensions: {}",
            allowed_extensions.join(", ")
        )));
    }

    Ok(extension)
}

/// Sanitize filename to prevent path traversal and invalid characters.
/// Returns an error if the filename contains path traversal attempts.
pub fn sanitize_filename(filename: &str) -> Result<String, UploadError> {
    const MAX_FILENAME_LENGTH: usize = 255;

    let path = std::path::Path::new(filename);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if filename_only.contains("..") {
        return Err(UploadError::Validation(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized.len() < 3 {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

/// Run all preconditions for a request against the policy.
/// Returns the (sanitized filename, extension) pair the stored record will use.
pub fn validate_request(
    request: &UploadRequest,
    policy: &UploadPolicy,
) -> Result<(String, String), UploadError> {
    validate_file_size(request.data.len(), policy.max_file_size_bytes)?;
    validate_content_type(&request.content_type, &policy.allowed_content_types)?;
    let extension = validate_file_extension(&request.filename, &policy.allowed_extensions)?;
    let safe_filename = sanitize_filename(&request.filename)?;
    Ok((safe_filename, extension))
}
