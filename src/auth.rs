//! Cookie credential storage.
//!
//! The forum cookie is a free-form string kept in a local file, read once at
//! process start and sent as the `Cookie` header on every request.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

/// Read the stored cookie. Returns `None` when the file is missing,
/// unreadable, or empty; read failures are logged but never fatal.
#[must_use]
pub fn read_cookie(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let trimmed = contents.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(e) => {
            warn!(path = %path.display(), "Failed to read cookie file: {e}");
            None
        }
    }
}

/// Write the cookie file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_cookie(path: &Path, cookie: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cookie directory: {}", parent.display())
            })?;
        }
    }
    std::fs::write(path, cookie)
        .with_context(|| format!("Failed to write cookie file: {}", path.display()))
}
