//! UI/Progress presentation layer
//!
//! This module handles:
//! - The interactive status line shown while installing and testing
//! - Silent progress when stderr is not a terminal
//! - Rendering the final summary ([`summary`])
//!
//! All progress reporting goes through the [`ProgressReporter`] trait, so the
//! pipeline never touches the terminal directly.

pub mod summary;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter trait for long-running phases
pub trait ProgressReporter {
    /// Begin a phase (e.g. "Installing") over `total` packages
    fn start_phase(&mut self, phase: &str, total: u64);

    /// Show what is being worked on right now
    fn update(&mut self, item: &str);

    /// One package done
    fn inc(&mut self);

    /// Clear the status line at the end of a phase
    fn finish_phase(&mut self);
}

/// Interactive status line backed by an indicatif progress bar
#[derive(Default)]
pub struct InteractiveProgressReporter {
    bar: Option<ProgressBar>,
}

impl InteractiveProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for InteractiveProgressReporter {
    fn start_phase(&mut self, phase: &str, total: u64) {
        if let Some(previous) = self.bar.take() {
            previous.finish_and_clear();
        }

        let style = ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(total);
        bar.set_style(style);
        bar.set_prefix(phase.to_string());
        self.bar = Some(bar);
    }

    fn update(&mut self, item: &str) {
        if let Some(ref bar) = self.bar {
            // Truncate long names for display
            let display = if item.chars().count() > 60 {
                let tail: String = item.chars().skip(item.chars().count() - 57).collect();
                format!("...{tail}")
            } else {
                item.to_string()
            };
            bar.set_message(display);
        }
    }

    fn inc(&mut self) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    fn finish_phase(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Silent progress reporter
///
/// No-op implementation used when stderr is not a terminal and in tests.
#[derive(Default)]
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start_phase(&mut self, _phase: &str, _total: u64) {}

    fn update(&mut self, _item: &str) {}

    fn inc(&mut self) {}

    fn finish_phase(&mut self) {}
}
