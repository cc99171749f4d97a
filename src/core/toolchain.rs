//! Toolchain model
//!
//! The closed set of ARM cross toolchains picobuild knows how to provision,
//! where each one is downloaded from, and the descriptor of an installed
//! toolchain. Nothing in here touches the filesystem or network; see
//! [`crate::infra::provision`] for that.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::urls;

/// Host platform identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostPlatform {
    /// Windows on x86_64
    WindowsX86_64,
    /// Linux on x86_64
    LinuxX86_64,
    /// Any other host, as `<os>-<arch>`
    Unknown(String),
}

impl HostPlatform {
    /// Whether this is the host the pinned toolchain archives are built for
    pub fn is_windows(&self) -> bool {
        matches!(self, Self::WindowsX86_64)
            || matches!(self, Self::Unknown(s) if s.starts_with("windows"))
    }

    /// Executable file suffix on this host
    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }

    /// File name of an executable on this host
    pub fn exe(&self, name: &str) -> String {
        format!("{name}{}", self.exe_suffix())
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostPlatform::WindowsX86_64 => write!(f, "windows-x86_64"),
            HostPlatform::LinuxX86_64 => write!(f, "linux-x86_64"),
            HostPlatform::Unknown(s) => write!(f, "{s}"),
        }
    }
}

/// Detect the current host platform
pub fn detect_host_platform() -> HostPlatform {
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;

    match (os, arch) {
        ("windows", "x86_64") => HostPlatform::WindowsX86_64,
        ("linux", "x86_64") => HostPlatform::LinuxX86_64,
        _ => HostPlatform::Unknown(format!("{os}-{arch}")),
    }
}

/// A pinned release archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    /// Upstream URL
    pub url: String,
    /// File name of the archive, also used under a mirror
    pub file_name: String,
}

impl ArchiveSource {
    fn new(url: String) -> Self {
        let file_name = url.rsplit('/').next().unwrap_or(&url).to_string();
        Self { url, file_name }
    }

    /// URL to fetch from, honoring an optional mirror base
    pub fn resolve_url(&self, mirror: Option<&str>) -> String {
        match mirror {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), self.file_name),
            None => self.url.clone(),
        }
    }
}

/// Kinds of cross toolchain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolchainKind {
    /// ARM GNU Toolchain (`arm-none-eabi-gcc`)
    ArmGnuGcc,
    /// Stock LLVM/Clang, preferably an existing MSYS2 UCRT64 install
    LlvmClang,
    /// LLVM Embedded Toolchain for Arm, with its own runtimes and binutils
    LlvmEmbedded,
}

impl ToolchainKind {
    /// All kinds, for iteration
    pub const ALL: [ToolchainKind; 3] = [Self::ArmGnuGcc, Self::LlvmClang, Self::LlvmEmbedded];

    /// Key used in settings files
    pub fn key(self) -> &'static str {
        match self {
            Self::ArmGnuGcc => "gcc",
            Self::LlvmClang => "clang",
            Self::LlvmEmbedded => "embedded-clang",
        }
    }

    /// Directory under the cache root the toolchain is installed into
    pub fn install_dir(self) -> &'static str {
        match self {
            Self::ArmGnuGcc => "arm-gnu-toolchain",
            Self::LlvmClang => "clang",
            Self::LlvmEmbedded => "embedded-clang",
        }
    }

    /// Pinned release version
    pub fn version(self) -> &'static str {
        match self {
            Self::ArmGnuGcc => urls::ARM_GNU_VERSION,
            Self::LlvmClang => urls::LLVM_VERSION,
            Self::LlvmEmbedded => urls::LLVM_EMBEDDED_VERSION,
        }
    }

    /// Release archive for the Windows host
    pub fn source(self) -> ArchiveSource {
        let version = self.version();
        ArchiveSource::new(match self {
            Self::ArmGnuGcc => format!(
                "{}/{version}/binrel/arm-gnu-toolchain-{version}-mingw-w64-i686-arm-none-eabi.zip",
                urls::ARM_GNU_BASE
            ),
            Self::LlvmClang => format!(
                "{}/llvmorg-{version}/clang+llvm-{version}-x86_64-pc-windows-msvc.tar.xz",
                urls::LLVM_BASE
            ),
            Self::LlvmEmbedded => format!(
                "{}/release-{version}/LLVM-ET-Arm-{version}-Windows-x86_64.zip",
                urls::LLVM_EMBEDDED_BASE
            ),
        })
    }

    /// Name prefixes of the top-level directory the archive unpacks to
    pub fn extracted_prefixes(self) -> &'static [&'static str] {
        match self {
            Self::ArmGnuGcc => &["arm-gnu-toolchain-"],
            Self::LlvmClang => &["clang+llvm-"],
            Self::LlvmEmbedded => &["LLVMEmbeddedToolchainForArm-", "LLVM-ET-Arm-"],
        }
    }

    /// Whether existing installations are searched before downloading
    pub fn probes_existing(self) -> bool {
        matches!(self, Self::LlvmClang)
    }

    fn tool_names(self) -> ToolNames {
        match self {
            Self::ArmGnuGcc => ToolNames {
                cc: "arm-none-eabi-gcc",
                cxx: "arm-none-eabi-g++",
                ar: "arm-none-eabi-ar",
                objcopy: "arm-none-eabi-objcopy",
            },
            Self::LlvmClang | Self::LlvmEmbedded => ToolNames {
                cc: "clang",
                cxx: "clang++",
                ar: "llvm-ar",
                objcopy: "llvm-objcopy",
            },
        }
    }

    /// Compiler executable the presence check looks for
    pub fn compiler(self, host: &HostPlatform) -> String {
        host.exe(self.tool_names().cc)
    }
}

impl fmt::Display for ToolchainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArmGnuGcc => write!(f, "ARM GNU Toolchain {}", self.version()),
            Self::LlvmClang => write!(f, "LLVM/Clang {}", self.version()),
            Self::LlvmEmbedded => {
                write!(f, "LLVM Embedded Toolchain for Arm {}", self.version())
            }
        }
    }
}

struct ToolNames {
    cc: &'static str,
    cxx: &'static str,
    ar: &'static str,
    objcopy: &'static str,
}

/// Companion tool a probed Clang install must ship next to the compiler
pub const CLANG_COMPANION_TOOL: &str = "objcopy";

/// Ninja install directory under the cache root
pub const NINJA_INSTALL_DIR: &str = "ninja";

/// Ninja release archive for the Windows host
pub fn ninja_source() -> ArchiveSource {
    ArchiveSource::new(format!(
        "{}/v{}/ninja-win.zip",
        urls::NINJA_BASE,
        urls::NINJA_VERSION
    ))
}

/// A resolved, installed toolchain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainDescriptor {
    /// Kind of toolchain
    pub kind: ToolchainKind,
    /// Installation root (contains `bin/`)
    pub root: PathBuf,
    /// C compiler
    pub cc: PathBuf,
    /// C++ compiler
    pub cxx: PathBuf,
    /// Archiver
    pub ar: PathBuf,
    /// Object copy tool
    pub objcopy: PathBuf,
}

impl ToolchainDescriptor {
    /// Descriptor for a toolchain laid out the standard way under `root`
    pub fn new(kind: ToolchainKind, root: PathBuf, host: &HostPlatform) -> Self {
        let names = kind.tool_names();
        let bin = root.join("bin");
        Self {
            kind,
            cc: bin.join(host.exe(names.cc)),
            cxx: bin.join(host.exe(names.cxx)),
            ar: bin.join(host.exe(names.ar)),
            objcopy: bin.join(host.exe(names.objcopy)),
            root,
        }
    }

    /// Replace the object copy tool, for installs that ship GNU binutils
    #[must_use]
    pub fn with_objcopy(mut self, objcopy: PathBuf) -> Self {
        self.objcopy = objcopy;
        self
    }

    /// The `bin/` directory of the installation
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Whether the compiler exists on disk
    pub fn is_installed(&self) -> bool {
        self.cc.is_file()
    }

    /// Root of the installation
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Presets that cross-compile with a provisioned toolchain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossPreset {
    /// `msys2-gcc`: ARM GNU Toolchain driven from MSYS2 MINGW64
    Msys2Gcc,
    /// `msys2-clang`: LLVM Embedded Toolchain driven from MSYS2 MINGW64
    Msys2Clang,
}

impl CrossPreset {
    /// Recognise a configure preset by name
    pub fn from_name(configure_preset: &str) -> Option<Self> {
        match configure_preset {
            "msys2-gcc" => Some(Self::Msys2Gcc),
            "msys2-clang" => Some(Self::Msys2Clang),
            _ => None,
        }
    }

    /// Toolchain this preset compiles with
    pub fn toolchain_kind(self) -> ToolchainKind {
        match self {
            Self::Msys2Gcc => ToolchainKind::ArmGnuGcc,
            Self::Msys2Clang => ToolchainKind::LlvmEmbedded,
        }
    }
}
