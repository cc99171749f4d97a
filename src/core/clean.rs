//! Clean logic
//!
//! Removes build trees: either one preset's binary directory or the whole
//! `build/` root.

use std::path::{Path, PathBuf};

use crate::config::defaults::BUILD_ROOT;
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Result of clean operation
#[derive(Debug, Default)]
pub struct CleanResult {
    /// Directories that were removed
    pub removed: Vec<PathBuf>,
    /// Directories that didn't exist (skipped)
    pub skipped: Vec<PathBuf>,
}

impl CleanResult {
    fn record(&mut self, path: &Path, removed: bool) {
        if removed {
            self.removed.push(path.to_path_buf());
        } else {
            self.skipped.push(path.to_path_buf());
        }
    }
}

/// Remove a single preset's binary directory
///
/// A missing directory is not an error; it ends up in `skipped`.
pub fn clean_preset(binary_dir: &Path) -> Result<CleanResult, FilesystemError> {
    let mut result = CleanResult::default();
    let removed = filesystem::remove_dir_all(binary_dir)?;
    if removed {
        tracing::info!("Cleaned build directory: {}", binary_dir.display());
    }
    result.record(binary_dir, removed);
    Ok(result)
}

/// Remove every preset's build output under `<project_root>/build`
pub fn clean_all(project_root: &Path) -> Result<CleanResult, FilesystemError> {
    let build_root = project_root.join(BUILD_ROOT);
    let mut result = CleanResult::default();
    let removed = filesystem::remove_dir_all(&build_root)?;
    if removed {
        tracing::info!("Cleaned all build directories");
    } else {
        tracing::info!("No build directory to clean");
    }
    result.record(&build_root, removed);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_preset_removes_binary_dir() {
        let project = TempDir::new().unwrap();
        let debug = project.path().join("build/debug");
        let release = project.path().join("build/release");
        std::fs::create_dir_all(debug.join("CMakeFiles")).unwrap();
        std::fs::create_dir_all(&release).unwrap();

        let result = clean_preset(&debug).unwrap();

        assert!(!debug.exists());
        assert!(release.exists());
        assert_eq!(result.removed, vec![debug]);
    }

    #[test]
    fn test_clean_preset_missing_is_skipped() {
        let project = TempDir::new().unwrap();
        let debug = project.path().join("build/debug");

        let result = clean_preset(&debug).unwrap();

        assert!(result.removed.is_empty());
        assert_eq!(result.skipped, vec![debug]);
    }

    #[test]
    fn test_clean_all_removes_build_root() {
        let project = TempDir::new().unwrap();
        std::fs::create_dir_all(project.path().join("build/debug")).unwrap();
        std::fs::create_dir_all(project.path().join("packages")).unwrap();

        let result = clean_all(project.path()).unwrap();

        assert!(!project.path().join("build").exists());
        assert!(project.path().join("packages").exists());
        assert_eq!(result.removed.len(), 1);
    }

    #[test]
    fn test_clean_all_without_build_root() {
        let project = TempDir::new().unwrap();

        let result = clean_all(project.path()).unwrap();

        assert!(result.removed.is_empty());
        assert_eq!(result.skipped.len(), 1);
    }
}
