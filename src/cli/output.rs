//! Output formatting and progress indicators
//!
//! Status lines, the per-phase spinner, and error display.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::pipeline::{Phase, Reporter};

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Print an error and its causes to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  Caused by: {cause}");
    }
}

/// [`Reporter`] that prints phase progress to the terminal
///
/// While a phase runs a spinner is shown, unless spinners are disabled
/// (verbose mode, where log lines would tear it).
pub struct ConsoleReporter {
    spinners: bool,
    active: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new(spinners: bool) -> Self {
        Self {
            spinners,
            active: Mutex::new(None),
        }
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.active.lock().ok().and_then(|mut active| active.take())
    }
}

impl Reporter for ConsoleReporter {
    fn phase_started(&self, phase: Phase, preset: &str) {
        let message = format!("{phase} ({preset})...");
        if self.spinners {
            if let Ok(mut active) = self.active.lock() {
                *active = Some(create_spinner(&message));
            }
        } else {
            println!("{} {message}", status::INFO);
        }
    }

    fn phase_finished(&self, phase: Phase, success: bool) {
        if let Some(spinner) = self.take_spinner() {
            spinner.finish_and_clear();
        }
        if success {
            println!("{} {phase} complete", status::SUCCESS);
        } else {
            println!("{} {phase} failed", status::ERROR);
        }
    }

    fn warning(&self, message: &str) {
        let print = || eprintln!("{} {message}", status::WARNING);
        match self.active.lock().ok().as_deref().and_then(Option::as_ref) {
            Some(spinner) => spinner.suspend(print),
            None => print(),
        }
    }
}
