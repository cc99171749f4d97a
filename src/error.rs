//! Error types for picobuild
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Preset catalog errors
#[derive(Error, Debug)]
pub enum PresetError {
    /// The presets document does not exist
    #[error("CMakePresets.json not found at '{path}'")]
    ConfigNotFound { path: PathBuf },

    /// The presets document is not shaped the way we expect
    #[error("Malformed presets file '{path}': {message}")]
    MalformedConfig { path: PathBuf, message: String },

    /// No build preset with this name
    #[error("Invalid preset '{name}'. Available presets: {}", available.join(", "))]
    UnknownPreset {
        name: String,
        available: Vec<String>,
    },

    /// Build preset points at a configure preset that does not exist
    #[error("Build preset '{build}' references unknown configure preset '{configure}'")]
    DanglingReference { build: String, configure: String },
}

/// Download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network error
    #[error("Network error downloading '{url}': {error}")]
    NetworkError { url: String, error: String },

    /// Checksum verification failed
    #[error("Checksum mismatch for '{file}': expected {expected}, got {actual}")]
    ChecksumFailed {
        file: String,
        expected: String,
        actual: String,
    },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },
}

/// Toolchain provisioning errors
#[derive(Error, Debug)]
pub enum ToolchainError {
    /// The expected executable is still missing after provisioning
    #[error("{toolchain} executable not found at '{path}'")]
    ToolchainUnavailable { toolchain: String, path: PathBuf },

    /// The release archive could not be fetched
    #[error("Failed to download {toolchain}: {source}")]
    DownloadFailed {
        toolchain: String,
        #[source]
        source: DownloadError,
    },

    /// The release archive could not be unpacked
    #[error("Failed to extract '{archive}': {error}")]
    ExtractionFailed { archive: PathBuf, error: String },

    /// Filesystem error while laying out the cache
    #[error("Toolchain cache error: {0}")]
    Filesystem(#[from] FilesystemError),
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to move a directory entry
    #[error("Failed to move '{from}' to '{to}': {error}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },
}

/// Pipeline phase errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Preset lookup failed
    #[error(transparent)]
    Preset(#[from] PresetError),

    /// Toolchain could not be provisioned
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    /// External tool exited with a non-zero status or could not be started
    #[error("{phase} failed ({status}){}", format_stderr(.stderr))]
    ExternalToolFailed {
        phase: String,
        status: String,
        stderr: String,
    },

    /// Archive creation failed
    #[error("Failed to create package: {error}")]
    PackagingFailed { error: String },

    /// Build directory removal failed
    #[error("Failed to clean build directory: {0}")]
    CleanFailed(#[source] FilesystemError),
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Settings file errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read settings file
    #[error("Failed to read settings file '{path}': {error}")]
    ReadError { path: PathBuf, error: String },

    /// Failed to parse settings file
    #[error("Failed to parse settings file '{path}': {error}")]
    ParseError { path: PathBuf, error: String },
}

/// Top-level picobuild error type
#[derive(Error, Debug)]
pub enum PicobuildError {
    /// Preset error
    #[error("Preset error: {0}")]
    Preset(#[from] PresetError),

    /// Toolchain error
    #[error("Toolchain error: {0}")]
    Toolchain(#[from] ToolchainError),

    /// Pipeline error
    #[error("Build pipeline failed: {0}")]
    Pipeline(#[from] PipelineError),

    /// Settings error
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_preset_lists_available() {
        let err = PresetError::UnknownPreset {
            name: "nonexistent".to_string(),
            available: vec!["debug".to_string(), "release".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("nonexistent"));
        assert!(message.contains("debug, release"));
    }

    #[test]
    fn test_external_tool_failed_includes_stderr() {
        let err = PipelineError::ExternalToolFailed {
            phase: "CMake configure".to_string(),
            status: "exit code 1".to_string(),
            stderr: "  CMake Error: no compiler\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "CMake configure failed (exit code 1): CMake Error: no compiler"
        );
    }

    #[test]
    fn test_external_tool_failed_without_stderr() {
        let err = PipelineError::ExternalToolFailed {
            phase: "CMake build".to_string(),
            status: "exit code 2".to_string(),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "CMake build failed (exit code 2)");
    }
}
