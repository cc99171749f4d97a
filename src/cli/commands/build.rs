//! Build command implementation
//!
//! Wires the preset catalog, settings, toolchain provisioner, CMake and the
//! packager into a [`Pipeline`] and runs one preset.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::output::{status, ConsoleReporter};
use crate::config::defaults::PRESETS_FILE;
use crate::core::package::{PackageOutcome, Packager};
use crate::core::pipeline::{Pipeline, PipelineOptions};
use crate::core::preset::PresetCatalog;
use crate::core::settings::Settings;
use crate::error::PicobuildError;
use crate::infra::cmake::CMake;
use crate::infra::provision::ToolchainProvisioner;

/// Build options
pub struct BuildOptions {
    /// Build preset to run
    pub preset: String,
    /// Optional phases
    pub pipeline: PipelineOptions,
    /// Toolchain cache override from the command line or environment
    pub toolchain_dir: Option<PathBuf>,
    /// Download mirror override from the command line or environment
    pub mirror: Option<String>,
    /// Verbose output disables the spinner
    pub verbose: bool,
}

/// Execute the build pipeline for one preset
pub async fn execute(project_dir: &Path, options: BuildOptions) -> Result<()> {
    let catalog = PresetCatalog::load(&project_dir.join(PRESETS_FILE))
        .map_err(PicobuildError::from)
        .context("Failed to load presets")?;
    let settings = Settings::load(project_dir)
        .map_err(PicobuildError::from)
        .context("Failed to load settings")?;

    let mut provisioner = ToolchainProvisioner::for_current_host()
        .with_mirror(options.mirror.or_else(|| settings.toolchain.mirror.clone()));
    for (key, sha256) in &settings.toolchain.sha256 {
        provisioner = provisioner.with_checksum(key, sha256);
    }

    let packager = Packager::new(project_dir)
        .with_prefix(settings.package_prefix())
        .with_output_dir(settings.output_dir(project_dir));
    let tool = CMake::new(project_dir);
    let reporter = ConsoleReporter::new(!options.verbose);
    let toolchain_dir = options
        .toolchain_dir
        .or_else(|| settings.cache_dir(project_dir));

    tracing::info!("Using preset: {}", options.preset);
    let mut pipeline = Pipeline::new(
        &catalog,
        project_dir,
        &tool,
        &provisioner,
        &packager,
        &reporter,
    )
    .with_toolchain_dir(toolchain_dir);

    let report = pipeline
        .run(&options.preset, options.pipeline)
        .await
        .map_err(PicobuildError::from)
        .with_context(|| format!("Build of preset '{}' failed", options.preset))?;

    match &report.package {
        PackageOutcome::Created { archive, files } => {
            println!(
                "{} Package created: {} ({} files)",
                status::SUCCESS,
                archive.display(),
                files.len()
            );
        }
        PackageOutcome::NothingToPackage => {
            println!("{} No build outputs to package", status::WARNING);
        }
    }
    println!(
        "{} Build pipeline completed for preset '{}'",
        status::SUCCESS,
        report.preset
    );

    Ok(())
}
