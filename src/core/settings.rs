//! Project settings
//!
//! Reads optional overrides from `picobuild.toml` at the project root. Every
//! section and field is optional; anything left out falls back to the
//! built-in defaults.
//!
//! ```toml
//! [project]
//! package_prefix = "sensors_rpi_pico"
//!
//! [packaging]
//! output_dir = "dist"
//!
//! [toolchain]
//! cache_dir = "C:/picobuild/toolchains"
//! mirror = "https://mirror.example.com/toolchains"
//!
//! [toolchain.sha256]
//! gcc = "..."
//! ninja = "..."
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::defaults::{PACKAGES_DIR, PACKAGE_PREFIX, SETTINGS_FILE};
use crate::error::SettingsError;

/// Settings for one project
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Project identity
    #[serde(default)]
    pub project: ProjectSettings,

    /// Package output
    #[serde(default)]
    pub packaging: PackagingSettings,

    /// Toolchain provisioning
    #[serde(default)]
    pub toolchain: ToolchainSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectSettings {
    /// Prefix of package archive names
    pub package_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackagingSettings {
    /// Archive output directory, relative to the project root
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolchainSettings {
    /// Toolchain cache root, relative to the project root
    pub cache_dir: Option<PathBuf>,

    /// Base URL serving the release archives under their upstream names
    pub mirror: Option<String>,

    /// Pinned archive checksums keyed by `gcc`, `clang`, `embedded-clang`
    /// or `ninja`
    #[serde(default)]
    pub sha256: BTreeMap<String, String>,
}

impl Settings {
    /// Load `picobuild.toml` from the project root
    pub fn load(project_root: &Path) -> Result<Self, SettingsError> {
        Self::load_from_path(&project_root.join(SETTINGS_FILE))
    }

    /// Load settings from a specific path
    ///
    /// If the file doesn't exist, returns the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::ReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| SettingsError::ParseError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Effective package name prefix
    pub fn package_prefix(&self) -> &str {
        self.project
            .package_prefix
            .as_deref()
            .unwrap_or(PACKAGE_PREFIX)
    }

    /// Effective package output directory
    pub fn output_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(
            self.packaging
                .output_dir
                .as_deref()
                .unwrap_or(Path::new(PACKAGES_DIR)),
        )
    }

    /// Toolchain cache root, if one is configured
    pub fn cache_dir(&self, project_root: &Path) -> Option<PathBuf> {
        self.toolchain
            .cache_dir
            .as_ref()
            .map(|dir| project_root.join(dir))
    }
}
