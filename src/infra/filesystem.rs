//! Filesystem operations
//!
//! Handles file and directory operations.

use std::path::Path;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
///
/// Returns whether anything was removed.
pub fn remove_dir_all(path: &Path) -> Result<bool, FilesystemError> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    Ok(true)
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Move every entry of `from` into `to`, then remove the empty `from`
pub fn hoist_dir_contents(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    let move_error = |error: std::io::Error| FilesystemError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        error: error.to_string(),
    };

    for entry in std::fs::read_dir(from).map_err(move_error)? {
        let entry = entry.map_err(move_error)?;
        let target = to.join(entry.file_name());
        std::fs::rename(entry.path(), &target).map_err(|e| FilesystemError::Move {
            from: entry.path(),
            to: target.clone(),
            error: e.to_string(),
        })?;
    }

    std::fs::remove_dir(from).map_err(|e| FilesystemError::RemoveDir {
        path: from.to_path_buf(),
        error: e.to_string(),
    })
}
