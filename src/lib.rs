//! Picobuild - preset-driven CMake builds for Raspberry Pi Pico firmware
//!
//! Wraps a project's `CMakePresets.json` with toolchain provisioning for the
//! Windows cross presets, an optional test and coverage pass, and packaging
//! of the resulting firmware images.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Presets, toolchain model, pipeline and packaging
//! - [`infra`] - Infrastructure layer (network, filesystem, processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
