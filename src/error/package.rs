//! Per-package errors

use super::ProbeError;

/// Creates an install failed error for one or more packages
pub fn install_failed(packages: &[String], reason: impl Into<String>) -> ProbeError {
    ProbeError::InstallFailed {
        packages: packages.join(", "),
        reason: reason.into(),
    }
}

/// Creates a load failed error
pub fn load_failed(package: &str, reason: impl Into<String>) -> ProbeError {
    ProbeError::LoadFailed {
        package: package.to_string(),
        reason: reason.into(),
    }
}

/// Creates a harness output error
pub fn harness_output_invalid(package: &str, reason: impl Into<String>) -> ProbeError {
    ProbeError::HarnessOutputInvalid {
        package: package.to_string(),
        reason: reason.into(),
    }
}

/// Creates a readme pattern error
pub fn readme_pattern_invalid(package: &str, reason: impl Into<String>) -> ProbeError {
    ProbeError::ReadmePatternInvalid {
        package: package.to_string(),
        reason: reason.into(),
    }
}
