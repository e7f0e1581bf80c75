//! Export comparison
//!
//! Decides, for one package, which named bindings of the dynamically loaded
//! (CommonJS) surface were also detected on the statically imported (ESM)
//! surface. Pure and deterministic.

use crate::domain::{ExportSurface, Verdict};

/// Outcome of comparing two surfaces, before package metadata is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub expected: Vec<String>,
    pub detected: Vec<String>,
    pub missing: Vec<String>,
}

impl Comparison {
    pub fn pass(&self) -> bool {
        self.missing.is_empty()
    }

    /// Package exposes nothing but a default export
    pub fn is_default_only(&self) -> bool {
        self.expected.is_empty()
    }

    /// Attach package metadata to produce a [`Verdict`]
    pub fn into_verdict(
        self,
        name: impl Into<String>,
        transpiled: bool,
        readme_encourages_named_exports: bool,
    ) -> Verdict {
        let pass = self.pass();
        Verdict {
            name: name.into(),
            expected_names: self.expected,
            detected_names: self.detected,
            missing_names: self.missing,
            pass,
            transpiled,
            readme_encourages_named_exports,
        }
    }
}

/// Compare the source-of-truth surface against the surface under test
pub fn compare(expected: &ExportSurface, actual: &ExportSurface) -> Comparison {
    let (detected, missing): (Vec<&str>, Vec<&str>) =
        expected.iter().partition(|name| actual.contains(name));

    Comparison {
        expected: expected.iter().map(str::to_string).collect(),
        detected: detected.into_iter().map(str::to_string).collect(),
        missing: missing.into_iter().map(str::to_string).collect(),
    }
}

/// Log one package's comparison outcome at debug level
pub fn log_comparison(package: &str, comparison: &Comparison) {
    let expected = comparison.expected.len();
    if comparison.is_default_only() {
        tracing::debug!(package = %package, "only a default export");
    } else if comparison.pass() {
        tracing::debug!(package = %package, "all {expected} CommonJS named exports detected");
    } else {
        let detected = comparison.detected.len();
        let percent = detected * 100 / expected.max(1);
        tracing::debug!(
            package = %package,
            detected = %comparison.detected.join(", "),
            missing = %comparison.missing.join(", "),
            "{detected} of {expected} ({percent}%) CommonJS named exports detected"
        );
    }
}
