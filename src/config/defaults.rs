//! Default configuration values

use std::time::Duration;

/// Preset document read from the project root
pub const PRESETS_FILE: &str = "CMakePresets.json";

/// Optional project settings file
pub const SETTINGS_FILE: &str = "picobuild.toml";

/// Build preset used when none is given on the command line
pub const DEFAULT_PRESET: &str = "release";

/// Placeholder CMake expands to the source root
pub const SOURCE_DIR_PLACEHOLDER: &str = "${sourceDir}";

/// Root of all per-preset binary directories, relative to the project
pub const BUILD_ROOT: &str = "build";

/// Archive output directory, relative to the project
pub const PACKAGES_DIR: &str = "packages";

/// Prefix of every package archive name
pub const PACKAGE_PREFIX: &str = "sensors_rpi_pico";

/// Build type assumed when a preset does not set `CMAKE_BUILD_TYPE`
pub const DEFAULT_BUILD_TYPE: &str = "Release";

/// Extensions of firmware images picked up by the packager
pub const ARTIFACT_EXTENSIONS: &[&str] = &["elf", "bin", "hex", "uf2"];

/// Version file bundled next to the artifacts when present
pub const VERSION_FILE: &str = "version.txt";

/// Toolchain cache directory inside a preset's binary directory
pub const TOOLCHAIN_SUBDIR: &str = "toolchain";

/// Generated cross-compilation descriptor
pub const TOOLCHAIN_FILE: &str = "toolchain.cmake";

/// Upper bound for the MSYS2 shell lookup
pub const SHELL_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Unit test executable produced by the test presets
pub const TEST_EXECUTABLE: &str = "sensors_tests";

/// HTTP request timeout for toolchain downloads
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// HTTP connect timeout for toolchain downloads
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// MSYS2 install root on Windows hosts
pub const MSYS2_ROOT: &str = "C:/msys64";
