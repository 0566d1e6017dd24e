//! Static output tree writer.
//!
//! Documents are serialized as compact JSON with Unicode preserved
//! unescaped. The output root is destroyed and recreated at the start of
//! every run, so nothing from a previous registry survives.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use kbpress_shared::{PublishError, Result};

/// Destroy the output root if present and recreate it empty.
pub fn reset_dir(root: &Path) -> Result<()> {
    if root.exists() {
        std::fs::remove_dir_all(root).map_err(|e| PublishError::io(root, e))?;
    }
    std::fs::create_dir_all(root).map_err(|e| PublishError::io(root, e))?;
    debug!(path = %root.display(), "output root reset");
    Ok(())
}

/// Serialize a document to `path`, creating parent directories as needed
/// and overwriting any existing file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PublishError::io(parent, e))?;
    }

    let body = serde_json::to_string(value).map_err(|e| {
        PublishError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })?;

    std::fs::write(path, body).map_err(|e| PublishError::io(path, e))?;
    debug!(path = %path.display(), "document written");
    Ok(())
}
