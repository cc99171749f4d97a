//! Build output packaging
//!
//! Collects the firmware images a build left in its binary directory and
//! bundles them, together with `version.txt` when there is one, into a
//! timestamped `.tar.gz` under the packages directory.

use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::defaults::{
    ARTIFACT_EXTENSIONS, DEFAULT_BUILD_TYPE, PACKAGES_DIR, PACKAGE_PREFIX, VERSION_FILE,
};
use crate::error::PipelineError;
use crate::infra::archive;

/// Timestamp format used in package names
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Result of a packaging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    /// An archive was written
    Created {
        /// Path of the archive
        archive: PathBuf,
        /// Entry names inside the archive
        files: Vec<String>,
    },
    /// The build directory held no firmware images
    NothingToPackage,
}

/// Writes package archives for a project
#[derive(Debug, Clone)]
pub struct Packager {
    prefix: String,
    output_dir: PathBuf,
}

impl Packager {
    /// Packager writing to `<project_root>/packages`
    pub fn new(project_root: &Path) -> Self {
        Self {
            prefix: PACKAGE_PREFIX.to_string(),
            output_dir: project_root.join(PACKAGES_DIR),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    /// Directory archives are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Package the outputs of `build_dir`, stamped with the local time
    pub fn package(
        &self,
        build_dir: &Path,
        preset: &str,
        build_type: Option<&str>,
    ) -> Result<PackageOutcome, PipelineError> {
        self.package_at(build_dir, preset, build_type, Local::now().naive_local())
    }

    /// Package the outputs of `build_dir` with an explicit timestamp
    pub fn package_at(
        &self,
        build_dir: &Path,
        preset: &str,
        build_type: Option<&str>,
        timestamp: NaiveDateTime,
    ) -> Result<PackageOutcome, PipelineError> {
        if !build_dir.is_dir() {
            return Err(PipelineError::PackagingFailed {
                error: format!("Build directory not found: {}", build_dir.display()),
            });
        }

        let outputs = find_build_outputs(build_dir);
        if outputs.is_empty() {
            tracing::warn!("No build outputs found in {}", build_dir.display());
            return Ok(PackageOutcome::NothingToPackage);
        }

        let name = self.package_name(preset, build_type, timestamp);
        let archive_path = self.output_dir.join(format!("{name}.tar.gz"));

        let mut entries: Vec<(PathBuf, String)> = outputs
            .into_iter()
            .filter_map(|path| {
                let file_name = path.file_name()?.to_string_lossy().into_owned();
                Some((path, format!("{name}/{file_name}")))
            })
            .collect();

        let version = build_dir.join(VERSION_FILE);
        if version.is_file() {
            entries.push((version, format!("{name}/{VERSION_FILE}")));
        }

        std::fs::create_dir_all(&self.output_dir)
            .and_then(|()| archive::create_tar_gz(&archive_path, &entries))
            .map_err(|e| PipelineError::PackagingFailed {
                error: e.to_string(),
            })?;

        tracing::info!("Package created: {}", archive_path.display());
        Ok(PackageOutcome::Created {
            archive: archive_path,
            files: entries.into_iter().map(|(_, name)| name).collect(),
        })
    }

    /// `<prefix>_<preset>_<build type>_<YYYYmmdd_HHMMSS>`
    pub fn package_name(
        &self,
        preset: &str,
        build_type: Option<&str>,
        timestamp: NaiveDateTime,
    ) -> String {
        let build_type = build_type.unwrap_or(DEFAULT_BUILD_TYPE).to_lowercase();
        format!(
            "{}_{preset}_{build_type}_{}",
            self.prefix,
            timestamp.format(TIMESTAMP_FORMAT)
        )
    }
}

/// Firmware images directly inside `build_dir`, sorted by path
pub fn find_build_outputs(build_dir: &Path) -> Vec<PathBuf> {
    let mut outputs: Vec<PathBuf> = WalkDir::new(build_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ARTIFACT_EXTENSIONS.iter().any(|a| ext == *a))
        })
        .map(walkdir::DirEntry::into_path)
        .collect();
    outputs.sort();
    outputs
}
