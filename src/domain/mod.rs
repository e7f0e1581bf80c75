//! Domain models for exportprobe
//!
//! This module contains pure domain objects: export surfaces, per-package
//! verdicts and the records that tie a package to its install sandbox.
//! These types perform no I/O.

pub mod surface;
pub mod verdict;

pub use surface::{BindingReflector, ExportSurface, InheritedBindings, RawSurface};
pub use verdict::{PackageRecord, RunResult, Verdict};
