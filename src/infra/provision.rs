//! Toolchain provisioning
//!
//! Resolves an ARM cross toolchain into a cache directory, downloading and
//! unpacking the pinned release when it is not there yet.
//!
//! # Resolution order
//!
//! 1. The compiler already exists under `cache_root/<install dir>/bin`:
//!    use it. This check is what makes repeated runs cheap.
//! 2. Plain Clang only: look for an existing install (known MSYS2 paths,
//!    a lookup through the MSYS2 shell, then `PATH`). A candidate only
//!    counts if `objcopy` sits next to the compiler.
//! 3. Download the release archive, unpack it, and hoist the single
//!    versioned top-level directory into the install directory.
//! 4. If the compiler is still missing, the toolchain is unavailable.
//!
//! The pinned archives are Windows builds, so on any other host the
//! provisioner steps aside and CMake finds its own compilers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::defaults::{MSYS2_ROOT, SHELL_PROBE_TIMEOUT};
use crate::config::urls::NINJA_VERSION;
use crate::core::toolchain::{
    detect_host_platform, ninja_source, ArchiveSource, HostPlatform, ToolchainDescriptor,
    ToolchainKind, CLANG_COMPANION_TOOL, NINJA_INSTALL_DIR,
};
use crate::error::ToolchainError;
use crate::infra::download::DownloadManager;
use crate::infra::{archive, filesystem};

/// Settings key for a pinned Ninja checksum
pub const NINJA_KEY: &str = "ninja";

/// Where MSYS2 UCRT64 Clang usually lives
const KNOWN_CLANG_PATHS: &[&str] = &[
    "C:/msys64/ucrt64/bin/clang.exe",
    "C:/msys2/ucrt64/bin/clang.exe",
];

/// Outcome of resolving a toolchain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Toolchain is installed and ready
    Ready(ToolchainDescriptor),
    /// Provisioning does not apply on this host
    NotApplicable,
}

/// Resolves and installs cross toolchains
#[derive(Debug, Clone)]
pub struct ToolchainProvisioner {
    host: HostPlatform,
    downloader: DownloadManager,
    mirror: Option<String>,
    checksums: HashMap<String, String>,
    known_clang_paths: Vec<PathBuf>,
    msys_bash: PathBuf,
    search_path: bool,
}

impl ToolchainProvisioner {
    /// Create a provisioner for the given host
    pub fn new(host: HostPlatform) -> Self {
        Self {
            host,
            downloader: DownloadManager::new(),
            mirror: None,
            checksums: HashMap::new(),
            known_clang_paths: KNOWN_CLANG_PATHS.iter().map(PathBuf::from).collect(),
            msys_bash: PathBuf::from(format!("{MSYS2_ROOT}/usr/bin/bash.exe")),
            search_path: true,
        }
    }

    /// Create a provisioner for the machine we are running on
    pub fn for_current_host() -> Self {
        Self::new(detect_host_platform())
    }

    /// Fetch archives from `<mirror>/<file name>` instead of upstream
    #[must_use]
    pub fn with_mirror(mut self, mirror: Option<String>) -> Self {
        self.mirror = mirror;
        self
    }

    /// Pin the SHA256 of an archive, keyed by toolchain key or `ninja`
    #[must_use]
    pub fn with_checksum(mut self, key: &str, sha256: &str) -> Self {
        self.checksums.insert(key.to_string(), sha256.to_string());
        self
    }

    /// Replace the list of known Clang install locations
    #[must_use]
    pub fn with_known_clang_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.known_clang_paths = paths;
        self
    }

    /// Use a different MSYS2 bash for the shell lookup
    #[must_use]
    pub fn with_msys_bash(mut self, bash: PathBuf) -> Self {
        self.msys_bash = bash;
        self
    }

    /// Never consult `PATH` when looking for existing tools
    #[must_use]
    pub fn without_path_search(mut self) -> Self {
        self.search_path = false;
        self
    }

    /// Host this provisioner resolves for
    pub fn host(&self) -> &HostPlatform {
        &self.host
    }

    /// Resolve a toolchain of `kind` under `cache_root`
    pub async fn resolve(
        &self,
        kind: ToolchainKind,
        cache_root: &Path,
    ) -> Result<Resolution, ToolchainError> {
        if !self.host.is_windows() {
            tracing::debug!("Toolchain provisioning not applicable on {}", self.host);
            return Ok(Resolution::NotApplicable);
        }

        let install_dir = cache_root.join(kind.install_dir());
        let descriptor = ToolchainDescriptor::new(kind, install_dir.clone(), &self.host);

        if descriptor.is_installed() {
            tracing::info!("Downloaded {} toolchain already exists", kind.install_dir());
            return Ok(Resolution::Ready(descriptor));
        }

        if kind.probes_existing() {
            if let Some(found) = self.probe_existing_clang().await {
                return Ok(Resolution::Ready(found));
            }
            tracing::info!("Clang not found in MSYS2 UCRT64 or PATH, downloading {kind}");
        }

        self.install(
            &kind.to_string(),
            &kind.source(),
            kind.extracted_prefixes(),
            self.checksums.get(kind.key()).map(String::as_str),
            &install_dir,
        )
        .await?;

        if !descriptor.is_installed() {
            tracing::error!(
                "{} executable not found at {} after extraction",
                kind,
                descriptor.cc.display()
            );
            return Err(ToolchainError::ToolchainUnavailable {
                toolchain: kind.to_string(),
                path: descriptor.cc,
            });
        }

        tracing::info!("{kind} installed at {}", install_dir.display());
        Ok(Resolution::Ready(descriptor))
    }

    /// Resolve the Ninja build program, returning the executable path
    pub async fn resolve_ninja(&self, cache_root: &Path) -> Result<Option<PathBuf>, ToolchainError> {
        if !self.host.is_windows() {
            return Ok(None);
        }

        if self.search_path {
            if let Ok(ninja) = which::which("ninja") {
                tracing::info!("Found existing Ninja at {}", ninja.display());
                return Ok(Some(ninja));
            }
        }

        let install_dir = cache_root.join(NINJA_INSTALL_DIR);
        let ninja = install_dir.join(self.host.exe("ninja"));
        if ninja.is_file() {
            tracing::info!("Downloaded Ninja already exists");
            return Ok(Some(ninja));
        }

        let name = format!("Ninja {NINJA_VERSION}");
        self.install(
            &name,
            &ninja_source(),
            &[],
            self.checksums.get(NINJA_KEY).map(String::as_str),
            &install_dir,
        )
        .await?;

        if !ninja.is_file() {
            return Err(ToolchainError::ToolchainUnavailable {
                toolchain: name,
                path: ninja,
            });
        }

        tracing::info!("Ninja installed at {}", ninja.display());
        Ok(Some(ninja))
    }

    /// Download, unpack and flatten a release archive into `install_dir`
    async fn install(
        &self,
        name: &str,
        source: &ArchiveSource,
        prefixes: &[&str],
        checksum: Option<&str>,
        install_dir: &Path,
    ) -> Result<(), ToolchainError> {
        // Only reached when the executable is missing, so anything here is a
        // leftover from an interrupted install.
        if filesystem::remove_dir_all(install_dir)? {
            tracing::warn!("Removed incomplete install at {}", install_dir.display());
        }
        filesystem::create_dir_all(install_dir)?;

        let url = source.resolve_url(self.mirror.as_deref());
        let archive_path = install_dir.join(&source.file_name);

        tracing::info!("Downloading {name}...");
        self.downloader
            .download_verified(&url, &archive_path, checksum)
            .await
            .map_err(|source| ToolchainError::DownloadFailed {
                toolchain: name.to_string(),
                source,
            })?;

        archive::extract(&archive_path, install_dir)?;

        if let Err(e) = std::fs::remove_file(&archive_path) {
            tracing::warn!("Could not remove {}: {e}", archive_path.display());
        }

        if let Some(extracted) = archive::find_extracted_dir(install_dir, prefixes) {
            tracing::debug!("Hoisting {} into {}", extracted.display(), install_dir.display());
            filesystem::hoist_dir_contents(&extracted, install_dir)?;
        }

        Ok(())
    }

    /// Look for an existing Clang install that ships GNU `objcopy`
    async fn probe_existing_clang(&self) -> Option<ToolchainDescriptor> {
        for candidate in &self.known_clang_paths {
            if candidate.is_file() {
                if let Some(found) = self.validate_clang(candidate, "MSYS2 UCRT64") {
                    return Some(found);
                }
            }
        }

        if let Some(candidate) = self.msys_shell_lookup().await {
            if let Some(found) = self.validate_clang(&candidate, "MSYS2 UCRT64") {
                return Some(found);
            }
        }

        if self.search_path {
            if let Ok(candidate) = which::which("clang") {
                if let Some(found) = self.validate_clang(&candidate, "PATH") {
                    return Some(found);
                }
            }
        }

        None
    }

    /// Accept a Clang executable only if the companion tool is next to it
    fn validate_clang(&self, clang: &Path, origin: &str) -> Option<ToolchainDescriptor> {
        let bin = clang.parent()?;
        let root = bin.parent()?;
        let companion = bin.join(self.host.exe(CLANG_COMPANION_TOOL));

        if companion.is_file() {
            tracing::info!("Found {origin} Clang with objcopy at {}", root.display());
            Some(
                ToolchainDescriptor::new(ToolchainKind::LlvmClang, root.to_path_buf(), &self.host)
                    .with_objcopy(companion),
            )
        } else {
            tracing::info!("Found {origin} Clang at {} but missing objcopy", root.display());
            None
        }
    }

    /// Ask the MSYS2 UCRT64 shell where `clang.exe` is
    async fn msys_shell_lookup(&self) -> Option<PathBuf> {
        if !self.msys_bash.is_file() {
            return None;
        }

        let path = std::env::var("PATH").unwrap_or_default();
        let mut command = tokio::process::Command::new(&self.msys_bash);
        command
            .arg("-c")
            .arg(r#"p=$(which clang.exe 2>/dev/null) && cygpath -m "$p""#)
            .env("MSYSTEM", "UCRT64")
            .env(
                "PATH",
                format!("{MSYS2_ROOT}/ucrt64/bin;{MSYS2_ROOT}/usr/bin;{path}"),
            )
            .kill_on_drop(true);

        let output = match tokio::time::timeout(SHELL_PROBE_TIMEOUT, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::debug!("Failed to check MSYS2 UCRT64 clang: {e}");
                return None;
            }
            Err(_) => {
                tracing::debug!("MSYS2 UCRT64 clang lookup timed out");
                return None;
            }
        };

        if !output.status.success() {
            return None;
        }

        let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if found.is_empty() {
            return None;
        }

        let clang = PathBuf::from(found);
        clang.is_file().then_some(clang)
    }
}
