//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a project with the sample `CMakePresets.json`
    pub fn with_presets() -> Self {
        let project = Self::new();
        project.create_file("CMakePresets.json", SAMPLE_PRESETS);
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Names of the archives in `packages/`
    pub fn packages(&self) -> Vec<String> {
        let dir = self.dir.path().join("packages");
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Run picobuild against this project
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_picobuild"))
            .current_dir(self.path())
            .args(args)
            .env_remove("PICOBUILD_PROJECT_DIR")
            .env_remove("PICOBUILD_TOOLCHAIN_DIR")
            .env_remove("PICOBUILD_TOOLCHAIN_MIRROR")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute picobuild")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry names of a `.tar.gz` archive
pub fn archive_entries(path: &std::path::Path) -> Vec<String> {
    let file = std::fs::File::open(path).expect("Failed to open archive");
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    let mut names: Vec<String> = archive
        .entries()
        .expect("Failed to read archive")
        .map(|entry| {
            entry
                .unwrap()
                .path()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// Sample presets document: two host presets and the two cross presets
pub const SAMPLE_PRESETS: &str = r#"{
  "version": 6,
  "configurePresets": [
    {
      "name": "base",
      "hidden": true,
      "generator": "Ninja",
      "cacheVariables": { "PICO_BOARD": "pico2" }
    },
    {
      "name": "debug",
      "inherits": "base",
      "displayName": "Debug",
      "description": "Host debug build with tests",
      "binaryDir": "${sourceDir}/build/debug",
      "cacheVariables": { "CMAKE_BUILD_TYPE": "Debug", "BUILD_TESTS": true }
    },
    {
      "name": "release",
      "inherits": ["base"],
      "description": "Firmware release build",
      "binaryDir": "${sourceDir}/build/release",
      "cacheVariables": { "CMAKE_BUILD_TYPE": { "type": "STRING", "value": "Release" } }
    },
    {
      "name": "msys2-gcc",
      "inherits": "release",
      "binaryDir": "${sourceDir}/build/msys2-gcc",
      "cacheVariables": { "CMAKE_TOOLCHAIN_FILE": "${sourceDir}/build/msys2-gcc/toolchain.cmake" }
    },
    {
      "name": "msys2-clang",
      "inherits": "release",
      "binaryDir": "${sourceDir}/build/msys2-clang"
    }
  ],
  "buildPresets": [
    { "name": "debug", "configurePreset": "debug" },
    { "name": "release", "configurePreset": "release" },
    { "name": "msys2-gcc", "configurePreset": "msys2-gcc" },
    { "name": "msys2-clang", "configurePreset": "msys2-clang" }
  ]
}
"#;
