//! Core business logic module
//!
//! Preset resolution, the toolchain model, and the build pipeline. Process
//! spawning and network access live in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`preset`] - `CMakePresets.json` parsing and lookup
//! - [`toolchain`] - Toolchain kinds, sources and installed descriptors
//! - [`toolchain_file`] - `toolchain.cmake` generation for cross presets
//! - [`pipeline`] - Clean/configure/build/test/coverage/package driver
//! - [`package`] - Build output archiving
//! - [`clean`] - Build directory removal
//! - [`settings`] - Optional `picobuild.toml` overrides

pub mod clean;
pub mod package;
pub mod pipeline;
pub mod preset;
pub mod settings;
pub mod toolchain;
pub mod toolchain_file;
