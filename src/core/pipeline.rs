//! Build pipeline
//!
//! Drives one preset through clean, configure, build, test, coverage and
//! packaging. Each phase runs at most once; the first failing phase ends the
//! run and nothing after it (packaging included) is attempted.
//!
//! ```text
//! Idle -> Cleaning -> Configuring -> Building -> Testing -> CoveragePass -> Packaging -> Done
//!   \________\____________\____________\___________\____________\______________\-> Failed
//! ```

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::defaults::{MSYS2_ROOT, TOOLCHAIN_SUBDIR};
use crate::core::clean;
use crate::core::package::{PackageOutcome, Packager};
use crate::core::preset::{ConfigurePreset, PresetCatalog};
use crate::core::toolchain::{CrossPreset, ToolchainDescriptor};
use crate::core::toolchain_file;
use crate::error::{PipelineError, ToolchainError};
use crate::infra::cmake::{BuildTool, EnvOverlay, ToolOutput};
use crate::infra::provision::{Resolution, ToolchainProvisioner};

/// A step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Clean,
    Configure,
    Build,
    Test,
    Coverage,
    Package,
}

impl Phase {
    /// State the pipeline is in while this phase runs
    pub fn state(self) -> PipelineState {
        match self {
            Self::Clean => PipelineState::Cleaning,
            Self::Configure => PipelineState::Configuring,
            Self::Build => PipelineState::Building,
            Self::Test => PipelineState::Testing,
            Self::Coverage => PipelineState::CoveragePass,
            Self::Package => PipelineState::Packaging,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clean => "Clean",
            Self::Configure => "Configure",
            Self::Build => "Build",
            Self::Test => "Test",
            Self::Coverage => "Coverage",
            Self::Package => "Package",
        };
        f.write_str(name)
    }
}

/// Pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Cleaning,
    Configuring,
    Building,
    Testing,
    CoveragePass,
    Packaging,
    /// Terminal success
    Done,
    /// Terminal failure
    Failed,
}

/// Which optional phases to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Remove the preset's binary directory first
    pub clean: bool,
    /// Skip configure, build and test; only package
    pub package_only: bool,
    /// Run the test target after building
    pub run_tests: bool,
    /// Run a coverage pass after testing
    pub run_coverage: bool,
}

impl PipelineOptions {
    /// Whether the test phase runs; coverage implies tests
    pub fn runs_tests(&self) -> bool {
        self.run_tests || self.run_coverage
    }
}

/// Receives phase progress
pub trait Reporter {
    /// A phase is about to run
    fn phase_started(&self, phase: Phase, preset: &str);

    /// A phase has finished
    fn phase_finished(&self, phase: Phase, success: bool);

    /// Something was skipped that the user should know about
    fn warning(&self, message: &str);
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Build preset that was run
    pub preset: String,
    /// Phases in the order they ran
    pub phases: Vec<Phase>,
    /// Packaging result
    pub package: PackageOutcome,
}

/// Runs build presets of one project
pub struct Pipeline<'a> {
    catalog: &'a PresetCatalog,
    project_root: PathBuf,
    tool: &'a dyn BuildTool,
    provisioner: &'a ToolchainProvisioner,
    packager: &'a Packager,
    reporter: &'a dyn Reporter,
    toolchain_dir: Option<PathBuf>,
    state: PipelineState,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        catalog: &'a PresetCatalog,
        project_root: &Path,
        tool: &'a dyn BuildTool,
        provisioner: &'a ToolchainProvisioner,
        packager: &'a Packager,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            catalog,
            project_root: project_root.to_path_buf(),
            tool,
            provisioner,
            packager,
            reporter,
            toolchain_dir: None,
            state: PipelineState::Idle,
        }
    }

    /// Cache toolchains here instead of `<binary_dir>/toolchain`
    #[must_use]
    pub fn with_toolchain_dir(mut self, toolchain_dir: Option<PathBuf>) -> Self {
        self.toolchain_dir = toolchain_dir;
        self
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run `preset` to completion
    pub async fn run(
        &mut self,
        preset: &str,
        options: PipelineOptions,
    ) -> Result<PipelineReport, PipelineError> {
        self.state = PipelineState::Idle;
        match self.execute(preset, options).await {
            Ok(report) => {
                self.state = PipelineState::Done;
                Ok(report)
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    async fn execute(
        &mut self,
        preset: &str,
        options: PipelineOptions,
    ) -> Result<PipelineReport, PipelineError> {
        let configure = self.catalog.resolve_build_preset(preset)?.clone();
        let binary_dir = configure.binary_dir_for(&self.project_root);
        let mut phases = Vec::new();

        if options.clean {
            self.enter(Phase::Clean, preset, &mut phases);
            let result = clean::clean_preset(&binary_dir).map_err(PipelineError::CleanFailed);
            self.finish(Phase::Clean, result)?;
        }

        if options.package_only {
            tracing::info!("Package-only mode: skipping configure and build");
        } else {
            self.enter(Phase::Configure, preset, &mut phases);
            let result = self.configure(&configure, &binary_dir).await;
            let build_env = self.finish(Phase::Configure, result)?;

            self.enter(Phase::Build, preset, &mut phases);
            let output = self.tool.build(preset, &build_env);
            self.finish(Phase::Build, check(Phase::Build, output))?;

            if options.runs_tests() {
                self.enter(Phase::Test, preset, &mut phases);
                let output = self.tool.test(preset, &[]);
                self.finish(Phase::Test, check(Phase::Test, output))?;
            }

            if options.run_coverage {
                self.enter(Phase::Coverage, preset, &mut phases);
                let result = match self.tool.coverage(&binary_dir) {
                    Some(output) => check(Phase::Coverage, output),
                    None => {
                        self.reporter.warning(
                            "No coverage tool found (OpenCppCoverage or gcov+lcov), skipping coverage",
                        );
                        Ok(())
                    }
                };
                self.finish(Phase::Coverage, result)?;
            }
        }

        self.enter(Phase::Package, preset, &mut phases);
        let result = self.package(preset, &binary_dir);
        let package = self.finish(Phase::Package, result)?;

        Ok(PipelineReport {
            preset: preset.to_string(),
            phases,
            package,
        })
    }

    fn enter(&mut self, phase: Phase, preset: &str, phases: &mut Vec<Phase>) {
        self.state = phase.state();
        phases.push(phase);
        self.reporter.phase_started(phase, preset);
    }

    fn finish<T>(
        &self,
        phase: Phase,
        result: Result<T, PipelineError>,
    ) -> Result<T, PipelineError> {
        self.reporter.phase_finished(phase, result.is_ok());
        result
    }

    /// Provision the cross toolchain if the preset needs one, then configure
    ///
    /// Returns the environment overlay for the build and test phases.
    async fn configure(
        &self,
        configure: &ConfigurePreset,
        binary_dir: &Path,
    ) -> Result<EnvOverlay, PipelineError> {
        let mut args = Vec::new();
        let mut configure_env = EnvOverlay::new();
        let mut build_env = EnvOverlay::new();

        if let Some(cross) = CrossPreset::from_name(&configure.name) {
            let cache_root = self
                .toolchain_dir
                .clone()
                .unwrap_or_else(|| binary_dir.join(TOOLCHAIN_SUBDIR));

            match self
                .provisioner
                .resolve(cross.toolchain_kind(), &cache_root)
                .await?
            {
                Resolution::Ready(toolchain) => {
                    let ninja = self.provisioner.resolve_ninja(&cache_root).await?;
                    toolchain_file::write(&configure.name, &toolchain, binary_dir)
                        .map_err(ToolchainError::from)?;

                    if let Some(ninja) = &ninja {
                        args.push(format!(
                            "-DCMAKE_MAKE_PROGRAM={}",
                            ninja.to_string_lossy().replace('\\', "/")
                        ));
                    }
                    configure_env = configure_overlay(cross, &toolchain, ninja.as_deref());
                    build_env = build_overlay(cross, &toolchain, ninja.as_deref());
                }
                Resolution::NotApplicable => {
                    tracing::debug!("Using host compilers for preset '{}'", configure.name);
                }
            }
        }

        check(
            Phase::Configure,
            self.tool.configure(&configure.name, &args, &configure_env),
        )?;
        Ok(build_env)
    }

    fn package(&self, preset: &str, binary_dir: &Path) -> Result<PackageOutcome, PipelineError> {
        let build_type = self.catalog.build_type(preset)?;
        self.packager
            .package(binary_dir, preset, build_type.as_deref())
    }
}

/// Turn a non-zero exit into a phase failure
fn check(phase: Phase, output: ToolOutput) -> Result<(), PipelineError> {
    if output.success {
        Ok(())
    } else {
        Err(PipelineError::ExternalToolFailed {
            phase: phase.to_string(),
            status: output.status,
            stderr: output.stderr,
        })
    }
}

/// Environment the build step of a cross preset runs in
///
/// Same as the configure overlay, with the toolchain `bin/` also put first
/// on `PATH` for `msys2-clang` so its ARM-aware binutils win.
pub fn build_overlay(
    cross: CrossPreset,
    toolchain: &ToolchainDescriptor,
    ninja: Option<&Path>,
) -> EnvOverlay {
    let mut overlay = configure_overlay(cross, toolchain, ninja);
    if cross == CrossPreset::Msys2Clang {
        overlay.insert(
            0,
            ("PATH".to_string(), prepend_path(&[toolchain.bin_dir()])),
        );
    }
    overlay
}

/// Environment the configure step of a cross preset runs in
pub fn configure_overlay(
    cross: CrossPreset,
    toolchain: &ToolchainDescriptor,
    ninja: Option<&Path>,
) -> EnvOverlay {
    let msystem = ("MSYSTEM".to_string(), "MINGW64".to_string());
    match cross {
        CrossPreset::Msys2Clang => vec![
            msystem,
            ("PICO_CLANG_RUNTIMES".to_string(), "arm-none-eabi".to_string()),
        ],
        CrossPreset::Msys2Gcc => {
            let mut dirs = vec![toolchain.bin_dir()];
            dirs.extend(ninja.and_then(Path::parent).map(Path::to_path_buf));
            dirs.push(PathBuf::from(format!("{MSYS2_ROOT}/mingw64/bin")));
            dirs.push(PathBuf::from(format!("{MSYS2_ROOT}/usr/bin")));
            vec![msystem, ("PATH".to_string(), prepend_path(&dirs))]
        }
    }
}

/// `PATH` with `dirs` placed in front of the inherited value
fn prepend_path(dirs: &[PathBuf]) -> String {
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let all = dirs
        .iter()
        .cloned()
        .chain(std::env::split_paths(&inherited));
    std::env::join_paths(all)
        .unwrap_or_else(|_| OsString::from(&inherited))
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::toolchain::{HostPlatform, ToolchainKind};

    fn gcc() -> ToolchainDescriptor {
        ToolchainDescriptor::new(
            ToolchainKind::ArmGnuGcc,
            PathBuf::from("/cache/arm-gnu-toolchain"),
            &HostPlatform::WindowsX86_64,
        )
    }

    #[test]
    fn test_coverage_implies_tests() {
        let options = PipelineOptions {
            run_coverage: true,
            ..PipelineOptions::default()
        };
        assert!(options.runs_tests());
        assert!(!PipelineOptions::default().runs_tests());
    }

    #[test]
    fn test_clang_overlay() {
        let overlay = configure_overlay(CrossPreset::Msys2Clang, &gcc(), None);
        assert_eq!(
            overlay,
            vec![
                ("MSYSTEM".to_string(), "MINGW64".to_string()),
                ("PICO_CLANG_RUNTIMES".to_string(), "arm-none-eabi".to_string()),
            ]
        );
    }

    #[cfg(windows)]
    #[test]
    fn test_gcc_overlay_prefixes_path() {
        let overlay = configure_overlay(
            CrossPreset::Msys2Gcc,
            &gcc(),
            Some(Path::new("/cache/ninja/ninja.exe")),
        );

        assert_eq!(overlay[0], ("MSYSTEM".to_string(), "MINGW64".to_string()));
        let (key, path) = &overlay[1];
        assert_eq!(key, "PATH");
        let dirs: Vec<PathBuf> = std::env::split_paths(path).collect();
        assert_eq!(dirs[0], PathBuf::from("/cache/arm-gnu-toolchain/bin"));
        assert_eq!(dirs[1], PathBuf::from("/cache/ninja"));
        assert_eq!(dirs[2], PathBuf::from("C:/msys64/mingw64/bin"));
        assert_eq!(dirs[3], PathBuf::from("C:/msys64/usr/bin"));
    }

    #[test]
    fn test_clang_build_overlay_keeps_runtime_selector() {
        let toolchain = ToolchainDescriptor::new(
            ToolchainKind::LlvmEmbedded,
            PathBuf::from("/cache/embedded-clang"),
            &HostPlatform::WindowsX86_64,
        );
        let overlay = build_overlay(CrossPreset::Msys2Clang, &toolchain, None);

        let keys: Vec<&str> = overlay.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["PATH", "MSYSTEM", "PICO_CLANG_RUNTIMES"]);
        assert_eq!(
            std::env::split_paths(&overlay[0].1).next(),
            Some(PathBuf::from("/cache/embedded-clang/bin"))
        );
    }

    #[test]
    fn test_gcc_build_overlay_matches_configure() {
        let ninja = Path::new("/cache/ninja/ninja.exe");
        assert_eq!(
            build_overlay(CrossPreset::Msys2Gcc, &gcc(), Some(ninja)),
            configure_overlay(CrossPreset::Msys2Gcc, &gcc(), Some(ninja))
        );
    }

    #[test]
    fn test_prepend_path() {
        let path = prepend_path(&[PathBuf::from("/opt/arm/bin"), PathBuf::from("/opt/ninja")]);
        let dirs: Vec<PathBuf> = std::env::split_paths(&path).collect();
        assert_eq!(dirs[0], PathBuf::from("/opt/arm/bin"));
        assert_eq!(dirs[1], PathBuf::from("/opt/ninja"));
    }

    #[test]
    fn test_phase_states() {
        assert_eq!(Phase::Coverage.state(), PipelineState::CoveragePass);
        assert_eq!(Phase::Package.to_string(), "Package");
    }
}
