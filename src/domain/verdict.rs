//! Per-package verdicts and run results

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Result of comparing the two export surfaces of one package
///
/// `detected_names` and `missing_names` partition `expected_names`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub name: String,
    pub expected_names: Vec<String>,
    pub detected_names: Vec<String>,
    pub missing_names: Vec<String>,
    pub pass: bool,
    pub transpiled: bool,
    pub readme_encourages_named_exports: bool,
}

/// An installed package and the sandbox it was installed into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub sandbox: PathBuf,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, sandbox: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            sandbox: sandbox.into(),
        }
    }

    /// Directory the package was installed into
    pub fn install_dir(&self) -> PathBuf {
        let mut dir = self.sandbox.join("node_modules");
        for segment in self.name.split('/') {
            dir.push(segment);
        }
        dir
    }
}

/// Verdicts of one run, in processing order
pub type RunResult = Vec<Verdict>;
