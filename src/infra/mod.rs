//! Infrastructure layer
//!
//! Handles all I/O operations: network, filesystem, archives, and external
//! processes.

pub mod archive;
pub mod cmake;
pub mod download;
pub mod filesystem;
pub mod provision;
