//! Error types and handling for exportprobe
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Errors fall into two groups:
//! - run-level errors (feed, configuration, run files) abort the run
//! - per-package errors ([`ProbeError::is_per_package`]) are caught around a
//!   single install or load call and turn into "exclude this package"
//!
//! Convenience constructors live in sub-modules by area:
//! - [`fs`]: File system errors
//! - [`package`]: Per-package install/load errors

pub mod fs;
pub mod package;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for exportprobe operations
#[derive(Error, Diagnostic, Debug)]
pub enum ProbeError {
    // Popularity feed errors
    #[error("Popularity feed unavailable at {url}: {reason}")]
    #[diagnostic(
        code(exportprobe::feed::unavailable),
        help("Check network access, or place a cached ranking at .cache/npmrank.json")
    )]
    FeedUnavailable { url: String, reason: String },

    #[error("Failed to parse popularity ranking from {source_name}: {reason}")]
    #[diagnostic(
        code(exportprobe::feed::parse_failed),
        help("Delete the cached ranking to fetch a fresh copy")
    )]
    FeedParseFailed { source_name: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(exportprobe::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Failed to parse sandbox manifest: {path}: {reason}")]
    #[diagnostic(
        code(exportprobe::config::manifest_parse_failed),
        help("Remove the sandbox directory to start from a fresh manifest")
    )]
    ManifestParseFailed { path: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(exportprobe::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(exportprobe::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(exportprobe::fs::io_error))]
    IoError { message: String },

    // Subprocess errors
    #[error("Failed to start '{program}': {reason}")]
    #[diagnostic(
        code(exportprobe::process::spawn_failed),
        help("Set EXPORTPROBE_NODE / EXPORTPROBE_NPM to the executables to use")
    )]
    ProcessSpawnFailed { program: String, reason: String },

    // Per-package errors
    #[error("Failed to install {packages}: {reason}")]
    #[diagnostic(code(exportprobe::package::install_failed))]
    InstallFailed { packages: String, reason: String },

    #[error("Failed to load package '{package}': {reason}")]
    #[diagnostic(code(exportprobe::package::load_failed))]
    LoadFailed { package: String, reason: String },

    #[error("Loading package '{package}' timed out after {seconds}s")]
    #[diagnostic(code(exportprobe::package::load_timed_out))]
    LoadTimedOut { package: String, seconds: u64 },

    #[error("Harness output for '{package}' is invalid: {reason}")]
    #[diagnostic(code(exportprobe::package::harness_output_invalid))]
    HarnessOutputInvalid { package: String, reason: String },

    #[error("Package '{package}' has no readme")]
    #[diagnostic(code(exportprobe::package::readme_missing))]
    ReadmeMissing { package: String },

    #[error("Readme pattern for '{package}' is invalid: {reason}")]
    #[diagnostic(code(exportprobe::package::readme_pattern_invalid))]
    ReadmePatternInvalid { package: String, reason: String },
}

impl ProbeError {
    /// Whether this error belongs to a single package and must never abort the run
    pub fn is_per_package(&self) -> bool {
        matches!(
            self,
            ProbeError::InstallFailed { .. }
                | ProbeError::LoadFailed { .. }
                | ProbeError::LoadTimedOut { .. }
                | ProbeError::HarnessOutputInvalid { .. }
                | ProbeError::ReadmeMissing { .. }
                | ProbeError::ReadmePatternInvalid { .. }
        )
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        ProbeError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ProbeError {
    fn from(err: serde_json::Error) -> Self {
        ProbeError::IoError {
            message: format!("JSON error: {err}"),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, ProbeError>;
