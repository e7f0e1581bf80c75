//! Package loading
//!
//! Loads one installed package through both module interfaces and returns
//! the two export surfaces. Every package is loaded in its own `node`
//! process, so module caches and any loader patching a package performs die
//! with that process and cannot leak into the next package.
//!
//! - [`harness`]: the script run inside the sandbox

pub mod harness;

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use serde::Deserialize;

use crate::common::process::{RunOutcome, run_with_timeout};
use crate::domain::{ExportSurface, InheritedBindings, PackageRecord, RawSurface};
use crate::error::package::{harness_output_invalid, load_failed};
use crate::error::{ProbeError, Result};

use harness::HarnessScript;

/// Export surfaces of one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSurfaces {
    /// Surface of the dynamically loaded (CommonJS) form
    pub expected: ExportSurface,
    /// Surface of the statically imported (ESM) form
    pub actual: ExportSurface,
    /// The dynamic form carries a transpilation marker
    pub transpiled: bool,
}

/// Loads a package through both module interfaces
pub trait ModuleLoader {
    fn load(&self, record: &PackageRecord) -> Result<LoadedSurfaces>;
}

/// Raw harness output
#[derive(Debug, Deserialize)]
pub struct HarnessReport {
    pub dynamic: RawSurface,
    #[serde(rename = "static")]
    pub imported: RawSurface,
}

impl HarnessReport {
    /// Parse the report from harness stdout
    ///
    /// Packages may print while loading, so only the last non-empty line is
    /// taken as the report.
    pub fn parse(package: &str, stdout: &str) -> Result<Self> {
        let line = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| harness_output_invalid(package, "no output"))?;
        serde_json::from_str(line).map_err(|e| harness_output_invalid(package, e.to_string()))
    }

    /// Apply the enumeration policy to both raw surfaces
    pub fn into_surfaces(self, inherited: InheritedBindings) -> LoadedSurfaces {
        LoadedSurfaces {
            expected: ExportSurface::enumerate(&self.dynamic, inherited),
            actual: ExportSurface::enumerate(&self.imported, InheritedBindings::Exclude),
            transpiled: self.dynamic.transpiled,
        }
    }
}

/// Runs the harness with `node`, one process per package
pub struct NodeHarnessLoader {
    node: PathBuf,
    timeout: Duration,
    inherited: InheritedBindings,
}

impl NodeHarnessLoader {
    pub fn new(node: impl Into<PathBuf>, timeout: Duration, inherited: InheritedBindings) -> Self {
        Self {
            node: node.into(),
            timeout,
            inherited,
        }
    }
}

impl ModuleLoader for NodeHarnessLoader {
    fn load(&self, record: &PackageRecord) -> Result<LoadedSurfaces> {
        let script = HarnessScript::write(&record.sandbox, &record.name)?;

        let mut command = Command::new(&self.node);
        command
            .current_dir(&record.sandbox)
            .arg(script.path());

        let output = match run_with_timeout(command, self.timeout)? {
            RunOutcome::TimedOut => {
                return Err(ProbeError::LoadTimedOut {
                    package: record.name.clone(),
                    seconds: self.timeout.as_secs(),
                });
            }
            RunOutcome::Exited(output) if !output.success() => {
                return Err(load_failed(&record.name, output.stderr_tail()));
            }
            RunOutcome::Exited(output) => output,
        };

        let report = HarnessReport::parse(&record.name, &output.stdout)?;
        Ok(report.into_surfaces(self.inherited))
    }
}
