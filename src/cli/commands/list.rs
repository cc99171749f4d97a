//! CLI implementation for `picobuild --list-presets`

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::defaults::PRESETS_FILE;
use crate::core::preset::PresetCatalog;
use crate::error::PicobuildError;

const UNKNOWN_BUILD_TYPE: &str = "Unknown";

/// Print every build preset with its display name, description and build type
pub fn execute(project_dir: &Path) -> Result<()> {
    let catalog = PresetCatalog::load(&project_dir.join(PRESETS_FILE))
        .map_err(PicobuildError::from)
        .context("Failed to load presets")?;

    println!("Available presets:");
    for summary in catalog.summaries() {
        println!("  {}", summary.name);
        println!("    Display Name: {}", summary.display_name);
        if !summary.description.is_empty() {
            println!("    Description: {}", summary.description);
        }
        println!(
            "    Build Type: {}",
            summary.build_type.as_deref().unwrap_or(UNKNOWN_BUILD_TYPE)
        );
    }

    Ok(())
}
