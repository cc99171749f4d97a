//! Toolchain download sources
//!
//! Every source is pinned to an exact release. Archives are the Windows
//! host builds; see [`crate::infra::provision`] for the host gating.

/// ARM GNU Toolchain release
pub const ARM_GNU_VERSION: &str = "14.3.rel1";

/// ARM GNU Toolchain download base
pub const ARM_GNU_BASE: &str = "https://armkeil.blob.core.windows.net/developer/Files/downloads/gnu";

/// LLVM/Clang release
pub const LLVM_VERSION: &str = "18.1.8";

/// LLVM project release download base
pub const LLVM_BASE: &str = "https://github.com/llvm/llvm-project/releases/download";

/// LLVM Embedded Toolchain for Arm release
pub const LLVM_EMBEDDED_VERSION: &str = "19.1.5";

/// LLVM Embedded Toolchain for Arm download base
pub const LLVM_EMBEDDED_BASE: &str =
    "https://github.com/ARM-software/LLVM-embedded-toolchain-for-Arm/releases/download";

/// Ninja release
pub const NINJA_VERSION: &str = "1.12.1";

/// Ninja download base
pub const NINJA_BASE: &str = "https://github.com/ninja-build/ninja/releases/download";
