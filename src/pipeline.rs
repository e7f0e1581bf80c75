//! End-to-end run orchestration
//!
//! The run proceeds strictly one package at a time:
//! 1. Select the most popular packages
//! 2. Install them into sandbox shards
//! 3. Read each readme for the named-export heuristic
//! 4. Load each package through both interfaces and compare the surfaces
//! 5. Store the results and aggregate them
//!
//! Per-package errors are caught around the single readme read or load that
//! raised them; the package then simply does not contribute a verdict.

use crate::comparator::{compare, log_comparison};
use crate::config::ProbeConfig;
use crate::corpus::{self, ExclusionList, RankingFeed};
use crate::domain::{PackageRecord, RunResult, Verdict};
use crate::error::Result;
use crate::installer::{BatchInstaller, PackageManager};
use crate::loader::ModuleLoader;
use crate::readme;
use crate::report::{AggregateReport, aggregate, results::write_results};
use crate::ui::ProgressReporter;

/// External systems the pipeline drives
pub struct Collaborators<'a> {
    pub feed: &'a dyn RankingFeed,
    pub manager: &'a dyn PackageManager,
    pub loader: &'a dyn ModuleLoader,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub results: RunResult,
    pub report: AggregateReport,
}

/// An installed package ready for testing
#[derive(Debug, Clone)]
pub struct Candidate {
    pub record: PackageRecord,
    pub readme_encourages_named_exports: bool,
}

/// Run the whole measurement for the top `count` packages
pub fn run(
    config: &ProbeConfig,
    count: usize,
    collaborators: &Collaborators<'_>,
    progress: &mut dyn ProgressReporter,
) -> Result<RunSummary> {
    let names = corpus::select(count, &config.ranking_cache(), collaborators.feed)?;
    tracing::info!(selected = names.len(), "selected packages");

    let exclusions = ExclusionList::new(config.extra_excluded.iter().cloned());
    let installed = BatchInstaller::new(
        collaborators.manager,
        &exclusions,
        config.sandbox_root(),
        config.shard_size,
    )
    .with_overrides(config.overrides.clone())
    .install(&names, progress)?;
    tracing::info!(installed = installed.len(), "installed packages");

    let candidates: Vec<Candidate> = analyze(installed)?
        .into_iter()
        .skip(config.skip_top)
        .collect();

    let results = test_candidates(collaborators.loader, &candidates, progress)?;
    write_results(&config.results_file(), &results)?;

    let report = aggregate(&results);
    Ok(RunSummary { results, report })
}

/// Apply the readme heuristic, dropping packages without a readme
pub fn analyze(installed: Vec<PackageRecord>) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::with_capacity(installed.len());
    for record in installed {
        match readme::analyze(&record) {
            Ok(signal) => candidates.push(Candidate {
                record,
                readme_encourages_named_exports: signal,
            }),
            Err(e) if e.is_per_package() => {
                tracing::debug!(package = %record.name, error = %e, "excluding package");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(candidates)
}

/// Load and compare one package
pub fn test_package(loader: &dyn ModuleLoader, candidate: &Candidate) -> Result<Verdict> {
    let name = &candidate.record.name;
    let surfaces = loader.load(&candidate.record)?;
    let comparison = compare(&surfaces.expected, &surfaces.actual);
    log_comparison(name, &comparison);
    Ok(comparison.into_verdict(
        name.clone(),
        surfaces.transpiled,
        candidate.readme_encourages_named_exports,
    ))
}

/// Test every candidate in order, skipping the ones that fail to load
pub fn test_candidates(
    loader: &dyn ModuleLoader,
    candidates: &[Candidate],
    progress: &mut dyn ProgressReporter,
) -> Result<RunResult> {
    progress.start_phase("Testing", candidates.len() as u64);

    let mut results = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        progress.update(&candidate.record.name);
        match test_package(loader, candidate) {
            Ok(verdict) => results.push(verdict),
            Err(e) if e.is_per_package() => {
                tracing::debug!(package = %candidate.record.name, error = %e, "excluding package");
            }
            Err(e) => {
                progress.finish_phase();
                return Err(e);
            }
        }
        progress.inc();
    }

    progress.finish_phase();
    Ok(results)
}

#[cfg(test)]
mod tests;
