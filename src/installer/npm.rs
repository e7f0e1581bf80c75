//! Package manager invocation

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::common::process::{RunOutcome, run_with_timeout};
use crate::error::{Result, package::install_failed};

/// Installs packages into a sandbox's dependency tree
///
/// Failure is signalled through `Err`; the caller decides whether that
/// excludes a package or triggers a fallback.
pub trait PackageManager {
    fn install(&self, sandbox: &Path, packages: &[String]) -> Result<()>;
}

/// `npm install` run as a subprocess
pub struct Npm {
    program: PathBuf,
    timeout: Duration,
}

impl Npm {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl PackageManager for Npm {
    fn install(&self, sandbox: &Path, packages: &[String]) -> Result<()> {
        let mut command = Command::new(&self.program);
        command
            .current_dir(sandbox)
            .args(["install", "--no-audit", "--no-fund", "--save"])
            .args(packages);

        match run_with_timeout(command, self.timeout)? {
            RunOutcome::Exited(output) if output.success() => Ok(()),
            RunOutcome::Exited(output) => Err(install_failed(packages, output.stderr_tail())),
            RunOutcome::TimedOut => Err(install_failed(
                packages,
                format!("timed out after {}s", self.timeout.as_secs()),
            )),
        }
    }
}
