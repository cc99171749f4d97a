//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::defaults::DEFAULT_PRESET;
use crate::core::pipeline::PipelineOptions;
use commands::build::BuildOptions;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("VERGEN_GIT_SHA"),
    "\nbuilt: ",
    env!("VERGEN_BUILD_DATE"),
);

/// Picobuild - CMake preset builds for Raspberry Pi Pico firmware
///
/// Configures, builds, tests and packages a preset from CMakePresets.json,
/// downloading the ARM cross toolchain on Windows when needed.
#[derive(Parser, Debug)]
#[command(name = "picobuild")]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// Build preset to run
    #[arg(long, default_value = DEFAULT_PRESET)]
    pub preset: String,

    /// Remove the preset's build directory before configuring
    #[arg(long)]
    pub clean: bool,

    /// Remove every build directory and exit
    #[arg(long)]
    pub clean_all: bool,

    /// Skip configure and build; package existing outputs
    #[arg(long)]
    pub package_only: bool,

    /// Run the test target after building
    #[arg(long)]
    pub run_tests: bool,

    /// Run tests with coverage (implies --run-tests)
    #[arg(long)]
    pub run_coverage: bool,

    /// List available presets and exit
    #[arg(long)]
    pub list_presets: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Project root containing CMakePresets.json
    #[arg(long, env = "PICOBUILD_PROJECT_DIR")]
    pub project_dir: Option<PathBuf>,

    /// Toolchain cache directory
    #[arg(long, env = "PICOBUILD_TOOLCHAIN_DIR")]
    pub toolchain_dir: Option<PathBuf>,

    /// Base URL to download toolchain archives from
    #[arg(long, env = "PICOBUILD_TOOLCHAIN_MIRROR")]
    pub toolchain_mirror: Option<String>,
}

impl Cli {
    /// Execute the requested action
    ///
    /// `--clean-all` wins over `--list-presets`, which wins over a build.
    pub async fn run(self) -> Result<()> {
        let project_dir = match self.project_dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };

        if self.clean_all {
            return commands::clean::execute(&project_dir);
        }

        if self.list_presets {
            return commands::list::execute(&project_dir);
        }

        commands::build::execute(
            &project_dir,
            BuildOptions {
                preset: self.preset,
                pipeline: PipelineOptions {
                    clean: self.clean,
                    package_only: self.package_only,
                    run_tests: self.run_tests,
                    run_coverage: self.run_coverage,
                },
                toolchain_dir: self.toolchain_dir,
                mirror: self.toolchain_mirror,
                verbose: self.verbose,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["picobuild"]).unwrap();
        assert_eq!(cli.preset, "release");
        assert!(!cli.clean && !cli.clean_all && !cli.package_only);
        assert!(!cli.run_tests && !cli.run_coverage && !cli.list_presets);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "picobuild",
            "--preset",
            "msys2-gcc",
            "--clean",
            "--run-coverage",
            "-v",
            "--toolchain-dir",
            "/opt/toolchains",
        ])
        .unwrap();
        assert_eq!(cli.preset, "msys2-gcc");
        assert!(cli.clean);
        assert!(cli.run_coverage);
        assert!(cli.verbose);
        assert_eq!(cli.toolchain_dir, Some(PathBuf::from("/opt/toolchains")));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["picobuild", "--jobs", "4"]).is_err());
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
