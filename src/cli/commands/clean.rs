//! CLI implementation for `picobuild --clean-all`

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::status;
use crate::core::clean::clean_all;
use crate::error::{PicobuildError, PipelineError};

/// Remove every build directory of the project
pub fn execute(project_dir: &Path) -> Result<()> {
    let result = clean_all(project_dir)
        .map_err(PipelineError::CleanFailed)
        .map_err(PicobuildError::from)
        .context("Failed to clean build artifacts")?;

    if result.removed.is_empty() {
        println!("{} Nothing to clean", status::SUCCESS);
    } else {
        println!("{} Cleaned build artifacts:", status::SUCCESS);
        for dir in &result.removed {
            println!("  Removed {}/", dir.display());
        }
    }

    Ok(())
}
