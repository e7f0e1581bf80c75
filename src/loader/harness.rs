//! Per-package harness script
//!
//! The harness is written into the package's sandbox right before it runs
//! and removed again when the [`HarnessScript`] guard goes out of scope,
//! whether the load succeeded, threw or timed out.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// File name of the harness inside a sandbox
pub const HARNESS_FILE: &str = "run-test.mjs";

const TEMPLATE: &str = include_str!("harness.mjs");

const PLACEHOLDER: &str = "__TARGET__";

/// Harness source targeting `package`
///
/// The package name is embedded as a JSON string literal, which is also a
/// valid JavaScript string literal.
pub fn render(package: &str) -> Result<String> {
    let literal = serde_json::to_string(package)?;
    Ok(TEMPLATE.replace(PLACEHOLDER, &literal))
}

/// A harness script on disk, deleted on drop
#[derive(Debug)]
pub struct HarnessScript {
    path: PathBuf,
}

impl HarnessScript {
    /// Write the harness for `package` into `sandbox`
    pub fn write(sandbox: &Path, package: &str) -> Result<Self> {
        let path = sandbox.join(HARNESS_FILE);
        std::fs::write(&path, render(package)?)
            .map_err(|e| crate::error::fs::write_failed(&path, e))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for HarnessScript {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::trace!(path = %self.path.display(), error = %e, "harness already removed");
        }
    }
}
