//! Guarded file writes for generated pages and exports.

use std::fs::{create_dir_all, write};
use std::path::Path;

use tracing::debug;

use crate::error::AppError;

/// Largest payload `safe_write` accepts (10 MiB).
pub const MAX_WRITE_BYTES: usize = 10 * 1024 * 1024;

const MAX_FILENAME_LEN: usize = 255;

/// Reduce `name` to a bare file name made of `[A-Za-z0-9._-]`.
///
/// Any directory components are dropped first, so `../../etc/passwd`
/// becomes `passwd`. The result is capped at 255 characters and may be empty.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    base.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .take(MAX_FILENAME_LEN)
        .collect()
}

/// Write UTF-8 `content` to `path`, creating parent directories.
///
/// Refuses payloads larger than [`MAX_WRITE_BYTES`].
pub fn safe_write(path: &Path, content: &str) -> Result<(), AppError> {
    if content.len() > MAX_WRITE_BYTES {
        return Err(AppError::io(format!(
            "Refusing to write '{}': {} bytes exceeds the {} byte limit.",
            path.display(),
            content.len(),
            MAX_WRITE_BYTES
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create directory '{}': {e}", parent.display())))?;
    }
    write(path, content).map_err(|e| AppError::io(format!("Failed to write '{}': {e}", path.display())))?;
    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}
