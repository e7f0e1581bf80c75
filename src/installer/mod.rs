//! Batch installation into sandboxes
//!
//! This module handles:
//! - Filtering candidates through the static deny-list
//! - Placing the packages not yet installed into `shard-NNN` sandboxes
//! - Installing each shard in one operation, falling back to one package
//!   at a time (last to first) when the bulk install fails
//! - Persisting packages that fail to install, so later runs never retry them
//!
//! Install state is read from every shard manifest under the sandbox root
//! before anything is planned, so a package installed or marked
//! uninstallable by an earlier run is found wherever it lives. Re-running
//! against an existing sandbox is free.

pub mod npm;
pub mod shard;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::SandboxManifest;
use crate::corpus::ExclusionList;
use crate::domain::PackageRecord;
use crate::error::Result;
use crate::ui::ProgressReporter;

pub use npm::{Npm, PackageManager};
pub use shard::Shard;

use shard::Occupancy;

/// A shard sandbox found on disk
struct ExistingShard {
    index: usize,
    dir: PathBuf,
    manifest: SandboxManifest,
}

impl ExistingShard {
    /// Installed according to the manifest and on disk, and not marked uninstallable
    fn has_installed(&self, name: &str) -> bool {
        !self.manifest.is_uninstallable(name)
            && self.manifest.is_installed(name)
            && PackageRecord::new(name, &self.dir).install_dir().is_dir()
    }
}

/// Shard holding an installed copy of `name`
fn locate<'s>(shards: &'s [ExistingShard], name: &str) -> Option<&'s Path> {
    shards
        .iter()
        .find(|shard| shard.has_installed(name))
        .map(|shard| shard.dir.as_path())
}

/// Marked uninstallable in any shard
fn known_uninstallable(shards: &[ExistingShard], name: &str) -> bool {
    shards
        .iter()
        .any(|shard| shard.manifest.is_uninstallable(name))
}

/// Installs a candidate list into sharded sandboxes
pub struct BatchInstaller<'a> {
    manager: &'a dyn PackageManager,
    exclusions: &'a ExclusionList,
    root: PathBuf,
    shard_size: usize,
    overrides: BTreeMap<String, String>,
}

impl<'a> BatchInstaller<'a> {
    pub fn new(
        manager: &'a dyn PackageManager,
        exclusions: &'a ExclusionList,
        root: impl Into<PathBuf>,
        shard_size: usize,
    ) -> Self {
        Self {
            manager,
            exclusions,
            root: root.into(),
            shard_size,
            overrides: BTreeMap::new(),
        }
    }

    /// Forced transitive versions written into every shard manifest
    pub fn with_overrides(mut self, overrides: BTreeMap<String, String>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Install `candidates`, returning the packages that ended up installed
    ///
    /// Records come back in candidate order. Packages that cannot be
    /// installed are simply absent.
    pub fn install(
        &self,
        candidates: &[String],
        progress: &mut dyn ProgressReporter,
    ) -> Result<Vec<PackageRecord>> {
        let mut seen = HashSet::new();
        let wanted: Vec<String> = candidates
            .iter()
            .filter(|name| !self.exclusions.contains(name.as_str()))
            .filter(|name| seen.insert((*name).clone()))
            .cloned()
            .collect();

        progress.start_phase("Installing", wanted.len() as u64);

        let existing = self.scan()?;
        let pending: Vec<String> = wanted
            .iter()
            .filter(|name| !known_uninstallable(&existing, name))
            .filter(|name| locate(&existing, name).is_none())
            .cloned()
            .collect();
        for _ in pending.len()..wanted.len() {
            progress.inc();
        }

        if pending.is_empty() {
            tracing::debug!("all candidates already installed, skipping");
        }
        let occupancy: Vec<Occupancy> = existing
            .iter()
            .map(|shard| Occupancy {
                index: shard.index,
                used: shard.manifest.member_count(),
            })
            .collect();
        for shard in shard::plan(&self.root, &occupancy, &pending, self.shard_size) {
            self.install_shard(&shard, progress)?;
        }

        progress.finish_phase();

        let settled = self.scan()?;
        Ok(wanted
            .iter()
            .filter_map(|name| {
                locate(&settled, name).map(|dir| PackageRecord::new(name.clone(), dir))
            })
            .collect())
    }

    /// Every `shard-NNN` sandbox under the root, in index order
    fn scan(&self) -> Result<Vec<ExistingShard>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(crate::error::fs::read_failed(&self.root, e)),
        };

        let mut shards = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| crate::error::fs::read_failed(&self.root, e))?;
            let Some(index) = entry.file_name().to_str().and_then(shard::parse_index) else {
                continue;
            };
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let manifest = SandboxManifest::load(&dir)?
                .unwrap_or_else(|| SandboxManifest::new(BTreeMap::new()));
            shards.push(ExistingShard {
                index,
                dir,
                manifest,
            });
        }
        shards.sort_by_key(|shard| shard.index);
        Ok(shards)
    }

    fn install_shard(&self, shard: &Shard, progress: &mut dyn ProgressReporter) -> Result<()> {
        std::fs::create_dir_all(&shard.dir)
            .map_err(|e| crate::error::fs::write_failed(&shard.dir, e))?;
        let mut manifest = SandboxManifest::load_or_create(&shard.dir, &self.overrides)?;

        self.install_pending(shard, &mut manifest, progress)?;

        for _ in &shard.members {
            progress.inc();
        }
        Ok(())
    }

    fn install_pending(
        &self,
        shard: &Shard,
        manifest: &mut SandboxManifest,
        progress: &mut dyn ProgressReporter,
    ) -> Result<()> {
        let pending = &shard.members;
        progress.update(&format!(
            "shard {}: {} packages",
            shard.index,
            pending.len()
        ));

        manifest.prune_overrides(pending);
        manifest.save(&shard.dir)?;

        match self.manager.install(&shard.dir, pending) {
            Ok(()) => {
                manifest.merge_from_disk(&shard.dir)?;
                for name in pending {
                    manifest.record_installed(name);
                }
                manifest.save(&shard.dir)?;
                return Ok(());
            }
            Err(e) if !e.is_per_package() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    shard = shard.index,
                    error = %e,
                    "bulk install failed, installing packages one at a time"
                );
            }
        }

        for name in pending.iter().rev() {
            progress.update(name);
            match self.manager.install(&shard.dir, std::slice::from_ref(name)) {
                Ok(()) => {
                    manifest.merge_from_disk(&shard.dir)?;
                    manifest.record_installed(name);
                }
                Err(e) if !e.is_per_package() => return Err(e),
                Err(e) => {
                    tracing::debug!(package = %name, error = %e, "marking package uninstallable");
                    manifest.merge_from_disk(&shard.dir)?;
                    manifest.mark_uninstallable(name);
                }
            }
            manifest.save(&shard.dir)?;
        }
        Ok(())
    }
}
