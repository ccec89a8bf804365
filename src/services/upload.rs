// SPDX-License-Identifier: MIT

//! Image upload handling for challenge proofs and profile pictures.
//!
//! Files land in the configured upload directory under a timestamped name
//! and are served statically at `/uploads/...`.

use crate::error::{AppError, Result};
use ring::rand::{SecureRandom, SystemRandom};
use std::path::Path;

/// Maximum proof images per challenge submission.
pub const MAX_IMAGES_PER_SUBMISSION: usize = 11;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Build a collision-resistant stored filename from an upload's original
/// name. Only the extension of the original name is kept; the nonce keeps
/// uploads from the same millisecond apart.
pub fn stored_filename(
    original: &str,
    timestamp_millis: u128,
    index: usize,
    nonce: u32,
) -> Result<String> {
    let extension = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| {
            AppError::BadRequest(format!("Uploaded file '{}' has no extension", original))
        })?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unsupported image type '.{}'",
            extension
        )));
    }

    Ok(format!(
        "{}_{}_{:08x}.{}",
        timestamp_millis, index, nonce, extension
    ))
}

/// Write one uploaded image to disk and return its public `/uploads` path.
pub async fn save_image(
    upload_dir: &str,
    original_name: &str,
    index: usize,
    data: &[u8],
) -> Result<String> {
    if data.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Uploaded file '{}' is empty",
            original_name
        )));
    }

    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let mut nonce = [0u8; 4];
    SystemRandom::new()
        .fill(&mut nonce)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to generate upload nonce")))?;

    let filename = stored_filename(original_name, millis, index, u32::from_be_bytes(nonce))?;
    let disk_path = Path::new(upload_dir).join(&filename);

    tokio::fs::write(&disk_path, data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to store upload: {}", e)))?;

    tracing::debug!(file = %filename, bytes = data.len(), "Stored uploaded image");
    Ok(format!("/uploads/{}", filename))
}
