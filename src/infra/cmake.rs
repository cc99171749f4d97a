//! External build tool invocation
//!
//! The pipeline talks to CMake (and the coverage tools) through the
//! [`BuildTool`] trait so tests can substitute a recording fake. Every call
//! is one blocking process; its exit status is the only success signal.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::defaults::TEST_EXECUTABLE;

/// Environment variables layered over the inherited environment
pub type EnvOverlay = Vec<(String, String)>;

/// Outcome of one external process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Exit status, or why the process could not be started
    pub status: String,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ToolOutput {
    /// A successful run with no output
    pub fn ok() -> Self {
        Self {
            success: true,
            status: "exit status: 0".to_string(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// A run that failed with the given status and stderr
    pub fn failed(status: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            status: status.into(),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Configure, build, test and coverage operations of a CMake project
pub trait BuildTool {
    /// `cmake --preset <preset> <extra_args>`
    fn configure(&self, preset: &str, extra_args: &[String], env: &[(String, String)])
        -> ToolOutput;

    /// `cmake --build --preset <preset>`
    fn build(&self, preset: &str, env: &[(String, String)]) -> ToolOutput;

    /// `cmake --build --preset <preset> --target test`
    fn test(&self, preset: &str, env: &[(String, String)]) -> ToolOutput;

    /// Run a coverage pass over `build_dir`
    ///
    /// Returns `None` when no coverage tool is available.
    fn coverage(&self, build_dir: &Path) -> Option<ToolOutput>;
}

/// [`BuildTool`] backed by the `cmake` executable on `PATH`
#[derive(Debug, Clone)]
pub struct CMake {
    program: PathBuf,
    project_root: PathBuf,
}

impl CMake {
    /// Drive the project at `project_root`
    pub fn new(project_root: &Path) -> Self {
        Self {
            program: PathBuf::from("cmake"),
            project_root: project_root.to_path_buf(),
        }
    }

    /// Use a specific `cmake` executable
    #[must_use]
    pub fn with_program(mut self, program: PathBuf) -> Self {
        self.program = program;
        self
    }

    fn run_cmake(&self, args: &[String], env: &[(String, String)]) -> ToolOutput {
        let mut cmd = Command::new(&self.program);
        cmd.args(args).current_dir(&self.project_root);
        run(cmd, env)
    }

    fn open_cpp_coverage(&self, tool: &Path, test_exe: &Path) -> ToolOutput {
        let root = &self.project_root;
        let mut cmd = Command::new(tool);
        cmd.current_dir(root)
            .arg("--sources")
            .arg(root)
            .arg("--excluded_sources")
            .arg(root.join("tests"))
            .arg("--excluded_sources")
            .arg(root.join("build"))
            .arg("--excluded_sources")
            .arg(root.join("lib"))
            .arg("--")
            .arg(test_exe)
            .arg("--gtest_output=xml:coverage.xml");
        run(cmd, &[])
    }
}

impl BuildTool for CMake {
    fn configure(
        &self,
        preset: &str,
        extra_args: &[String],
        env: &[(String, String)],
    ) -> ToolOutput {
        let mut args = vec!["--preset".to_string(), preset.to_string()];
        args.extend_from_slice(extra_args);
        self.run_cmake(&args, env)
    }

    fn build(&self, preset: &str, env: &[(String, String)]) -> ToolOutput {
        let args = ["--build", "--preset", preset].map(String::from);
        self.run_cmake(&args, env)
    }

    fn test(&self, preset: &str, env: &[(String, String)]) -> ToolOutput {
        let args = ["--build", "--preset", preset, "--target", "test"].map(String::from);
        self.run_cmake(&args, env)
    }

    fn coverage(&self, build_dir: &Path) -> Option<ToolOutput> {
        let test_exe = [
            build_dir.join(format!("{TEST_EXECUTABLE}.exe")),
            build_dir.join(TEST_EXECUTABLE),
        ]
        .into_iter()
        .find(|path| path.is_file());

        if let (Ok(tool), Some(test_exe)) = (which::which("OpenCppCoverage"), &test_exe) {
            tracing::info!("Running coverage with OpenCppCoverage");
            return Some(self.open_cpp_coverage(&tool, test_exe));
        }

        if which::which("gcov").is_ok() {
            if let Ok(lcov) = which::which("lcov") {
                tracing::info!("Running coverage with gcov/lcov");
                let mut cmd = Command::new(lcov);
                cmd.current_dir(build_dir)
                    .arg("--capture")
                    .arg("--directory")
                    .arg(build_dir)
                    .args(["--output-file", "coverage.info"])
                    .args(["--test-name", TEST_EXECUTABLE]);
                return Some(run(cmd, &[]));
            }
        }

        None
    }
}

/// Run a prepared command to completion with an environment overlay
fn run(mut cmd: Command, env: &[(String, String)]) -> ToolOutput {
    for (key, value) in env {
        cmd.env(key, value);
    }

    tracing::debug!("Running {:?}", cmd);
    let output = match cmd.output() {
        Ok(output) => output,
        Err(e) => {
            return ToolOutput::failed(
                format!("could not start {}", cmd.get_program().to_string_lossy()),
                e.to_string(),
            )
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !stdout.trim().is_empty() {
        tracing::debug!("{}", stdout.trim_end());
    }

    ToolOutput {
        success: output.status.success(),
        status: output.status.to_string(),
        stdout,
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
