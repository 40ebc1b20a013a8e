//! Shared key generation for storage backends.
//!
//! Key format: `uploads/{file_id}.{ext}`.

use uuid::Uuid;

/// Generate a storage key for the given file id and extension.
///
/// All backends must use this format so a record's key is valid on either
/// backend regardless of which one accepted the upload.
pub fn generate_storage_key(file_id: Uuid, extension: &str) -> String {
    format!("uploads/{}.{}", file_id, extension)
}
