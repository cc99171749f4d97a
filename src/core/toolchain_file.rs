//! CMake toolchain file generation
//!
//! Writes `toolchain.cmake` for the two cross presets. Each preset gets a
//! fixed set of Cortex-M33 flags (soft-float Thumb with section splitting);
//! every other preset is left to CMake's own compiler detection.

use std::path::{Path, PathBuf};

use crate::config::defaults::TOOLCHAIN_FILE;
use crate::core::toolchain::{CrossPreset, ToolchainDescriptor};
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Write the toolchain file for `configure_preset` into `destination_dir`
///
/// Returns the path of the written file, or `None` when the preset needs no
/// toolchain file or the toolchain is not installed.
pub fn write(
    configure_preset: &str,
    toolchain: &ToolchainDescriptor,
    destination_dir: &Path,
) -> Result<Option<PathBuf>, FilesystemError> {
    let Some(preset) = CrossPreset::from_name(configure_preset) else {
        return Ok(None);
    };

    if !toolchain.root.is_dir() || !toolchain.is_installed() {
        tracing::error!(
            "{} not found at {} for {configure_preset}, skipping toolchain file",
            toolchain.kind,
            toolchain.root.display()
        );
        return Ok(None);
    }

    tracing::info!("Creating toolchain file for preset '{configure_preset}'");
    let content = render(preset, toolchain);
    let path = destination_dir.join(TOOLCHAIN_FILE);
    filesystem::write_file(&path, &content)?;
    tracing::info!("Created toolchain file: {}", path.display());

    Ok(Some(path))
}

/// Render the toolchain file body for a cross preset
pub fn render(preset: CrossPreset, toolchain: &ToolchainDescriptor) -> String {
    match preset {
        CrossPreset::Msys2Gcc => render_gcc(toolchain),
        CrossPreset::Msys2Clang => render_clang(toolchain),
    }
}

/// Path as CMake wants it, with forward slashes
fn cmake_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn render_gcc(toolchain: &ToolchainDescriptor) -> String {
    let cc = cmake_path(&toolchain.cc);
    let cxx = cmake_path(&toolchain.cxx);
    let ar = cmake_path(&toolchain.ar);
    let objcopy = cmake_path(&toolchain.objcopy);
    let flags = "-mcpu=cortex-m33 -mthumb -mfloat-abi=soft -ffunction-sections -fdata-sections \
                 -fno-stack-protector -fno-stack-clash-protection -fcf-protection=none \
                 -fno-PIE -fno-PIC -U_FORTIFY_SOURCE";

    format!(
        r#"
set(CMAKE_SYSTEM_NAME PICO)
set(CMAKE_SYSTEM_PROCESSOR cortex-m33)
set(CMAKE_C_COMPILER "{cc}")
set(CMAKE_CXX_COMPILER "{cxx}")
set(CMAKE_ASM_COMPILER "{cc}")
set(CMAKE_AR "{ar}")
set(CMAKE_OBJCOPY "{objcopy}")
set(CMAKE_C_COMPILER_TARGET arm-none-eabi)
set(CMAKE_CXX_COMPILER_TARGET arm-none-eabi)
set(CMAKE_ASM_COMPILER_TARGET arm-none-eabi)
set(CMAKE_C_FLAGS "{flags}")
set(CMAKE_CXX_FLAGS "{flags}")
set(CMAKE_C_FLAGS_RELEASE "-O2 -g")
set(CMAKE_CXX_FLAGS_RELEASE "-O2 -g")
set(CMAKE_ASM_FLAGS "-mcpu=cortex-m33 -mthumb")
set(CMAKE_EXE_LINKER_FLAGS "-Wl,--build-id=none")
set(CMAKE_TRY_COMPILE_TARGET_TYPE STATIC_LIBRARY)
"#
    )
}

fn render_clang(toolchain: &ToolchainDescriptor) -> String {
    let root = cmake_path(&toolchain.root);
    let cc = cmake_path(&toolchain.cc);
    let cxx = cmake_path(&toolchain.cxx);
    let ar = cmake_path(&toolchain.ar);
    let objcopy = cmake_path(&toolchain.objcopy);
    let bin = cmake_path(&toolchain.bin_dir());
    let exe = toolchain
        .cc
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let flags = "--target=arm-none-eabi -mcpu=cortex-m33 -mthumb -mfloat-abi=soft \
                 -Wno-override-module -ffunction-sections -fdata-sections";

    format!(
        r#"
set(CMAKE_SYSTEM_NAME PICO)
set(CMAKE_SYSTEM_PROCESSOR cortex-m33)
set(CMAKE_C_COMPILER "{cc}")
set(CMAKE_CXX_COMPILER "{cxx}")
set(CMAKE_ASM_COMPILER "{cc}")
set(CMAKE_AR "{ar}")
set(CMAKE_OBJCOPY "{objcopy}")
set(CMAKE_OBJDUMP "{bin}/llvm-objdump{exe}")
set(CMAKE_READELF "{bin}/llvm-readelf{exe}")
set(CMAKE_C_COMPILER_TARGET arm-none-eabi)
set(CMAKE_CXX_COMPILER_TARGET arm-none-eabi)
set(CMAKE_ASM_COMPILER_TARGET arm-none-eabi)
set(CMAKE_SYSROOT "{root}/lib/clang-runtimes/arm-none-eabi/armv8m.main_soft_nofp")
set(CMAKE_C_FLAGS "${{CMAKE_C_FLAGS}} {flags}")
set(CMAKE_CXX_FLAGS "${{CMAKE_CXX_FLAGS}} {flags}")
set(CMAKE_ASM_FLAGS "${{CMAKE_ASM_FLAGS}} --target=arm-none-eabi -mcpu=cortex-m33 -mthumb -mfloat-abi=soft")
set(CMAKE_EXE_LINKER_FLAGS "${{CMAKE_EXE_LINKER_FLAGS}} -Wl,--build-id=none -nostdlib")
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::toolchain::{HostPlatform, ToolchainKind};
    use tempfile::TempDir;

    fn installed(dir: &Path, kind: ToolchainKind) -> ToolchainDescriptor {
        let toolchain = ToolchainDescriptor::new(
            kind,
            dir.join(kind.install_dir()),
            &HostPlatform::WindowsX86_64,
        );
        std::fs::create_dir_all(toolchain.bin_dir()).unwrap();
        std::fs::write(&toolchain.cc, "").unwrap();
        toolchain
    }

    #[test]
    fn test_unknown_preset_is_noop() {
        let dir = TempDir::new().unwrap();
        let toolchain = installed(dir.path(), ToolchainKind::ArmGnuGcc);

        let written = write("release", &toolchain, dir.path()).unwrap();

        assert!(written.is_none());
        assert!(!dir.path().join(TOOLCHAIN_FILE).exists());
    }

    #[test]
    fn test_gcc_toolchain_file() {
        let dir = TempDir::new().unwrap();
        let toolchain = installed(dir.path(), ToolchainKind::ArmGnuGcc);

        let path = write("msys2-gcc", &toolchain, dir.path()).unwrap().unwrap();
        let content = std::fs::read_to_string(path).unwrap();

        assert!(content.contains("set(CMAKE_SYSTEM_PROCESSOR cortex-m33)"));
        assert!(content.contains("arm-none-eabi-gcc.exe"));
        assert!(content.contains("-mcpu=cortex-m33 -mthumb -mfloat-abi=soft"));
        assert!(content.contains("-ffunction-sections -fdata-sections"));
        assert!(content.contains("CMAKE_TRY_COMPILE_TARGET_TYPE STATIC_LIBRARY"));
        assert!(!content.contains('\\'));
    }

    #[test]
    fn test_clang_toolchain_file() {
        let dir = TempDir::new().unwrap();
        let toolchain = installed(dir.path(), ToolchainKind::LlvmEmbedded);

        let path = write("msys2-clang", &toolchain, dir.path()).unwrap().unwrap();
        let content = std::fs::read_to_string(path).unwrap();

        assert!(content.contains("--target=arm-none-eabi"));
        assert!(content.contains("llvm-objcopy.exe"));
        assert!(content.contains("llvm-objdump.exe"));
        assert!(content.contains("clang-runtimes/arm-none-eabi/armv8m.main_soft_nofp"));
        assert!(content.contains("${CMAKE_C_FLAGS}"));
        assert!(content.contains("-nostdlib"));
    }

    #[test]
    fn test_missing_toolchain_is_skipped() {
        let dir = TempDir::new().unwrap();
        let toolchain = ToolchainDescriptor::new(
            ToolchainKind::LlvmEmbedded,
            dir.path().join("embedded-clang"),
            &HostPlatform::WindowsX86_64,
        );

        let written = write("msys2-clang", &toolchain, dir.path()).unwrap();

        assert!(written.is_none());
        assert!(!dir.path().join(TOOLCHAIN_FILE).exists());
    }
}
