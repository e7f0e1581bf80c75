//! Sandbox manifest (`package.json`)
//!
//! Each sandbox shard owns one manifest. Besides the installed dependencies it
//! records the packages that failed to install, so later runs skip them
//! without another attempt. The installer itself rewrites this file, so keys
//! we do not model are carried through untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::write_atomic;
use crate::error::{ProbeError, Result};

/// Manifest file name inside a sandbox
pub const MANIFEST_FILE: &str = "package.json";

/// Sandbox `package.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxManifest {
    #[serde(default = "default_private")]
    pub private: bool,

    /// Module type of the harness script living in the sandbox
    #[serde(rename = "type", default = "default_module_type")]
    pub module_type: String,

    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    /// Packages that failed to install in a previous attempt
    #[serde(default)]
    pub uninstallable: BTreeMap<String, bool>,

    /// Forced versions for transitive dependencies
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_private() -> bool {
    true
}

fn default_module_type() -> String {
    "module".to_string()
}

impl SandboxManifest {
    /// Fresh manifest with the given transitive overrides
    pub fn new(overrides: BTreeMap<String, String>) -> Self {
        Self {
            private: true,
            module_type: default_module_type(),
            dependencies: BTreeMap::new(),
            uninstallable: BTreeMap::new(),
            overrides,
            extra: serde_json::Map::new(),
        }
    }

    pub fn path(sandbox: &Path) -> PathBuf {
        sandbox.join(MANIFEST_FILE)
    }

    /// Parse a manifest from a JSON string
    pub fn from_json(json: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ProbeError::ManifestParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load the sandbox manifest, if one exists
    pub fn load(sandbox: &Path) -> Result<Option<Self>> {
        let path = Self::path(sandbox);
        match std::fs::read_to_string(&path) {
            Ok(json) => Self::from_json(&json, &path).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(crate::error::fs::read_failed(&path, e)),
        }
    }

    /// Load the sandbox manifest, creating it when absent
    ///
    /// An existing manifest keeps its contents but picks up the configured
    /// overrides.
    pub fn load_or_create(sandbox: &Path, overrides: &BTreeMap<String, String>) -> Result<Self> {
        let mut manifest = Self::load(sandbox)?.unwrap_or_else(|| Self::new(BTreeMap::new()));
        for (name, version) in overrides {
            manifest.overrides.insert(name.clone(), version.clone());
        }
        manifest.prune_overrides(&[]);
        manifest.save(sandbox)?;
        Ok(manifest)
    }

    pub fn save(&self, sandbox: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(&Self::path(sandbox), &format!("{json}\n"))
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    pub fn is_uninstallable(&self, name: &str) -> bool {
        self.uninstallable.get(name).copied().unwrap_or(false)
    }

    /// Packages recorded in this manifest, installed or uninstallable
    pub fn member_count(&self) -> usize {
        let failed = self
            .uninstallable
            .iter()
            .filter(|(name, failed)| **failed && !self.dependencies.contains_key(*name))
            .count();
        self.dependencies.len() + failed
    }

    /// Drop overrides naming a direct dependency, recorded or about to be installed
    ///
    /// npm rejects an override whose spec differs from the direct
    /// dependency's spec (EOVERRIDE), which would fail every later install.
    pub fn prune_overrides(&mut self, incoming: &[String]) {
        let dependencies = &self.dependencies;
        self.overrides
            .retain(|name, _| !dependencies.contains_key(name) && !incoming.contains(name));
    }

    /// Record a successful install unless the installer already did
    pub fn record_installed(&mut self, name: &str) {
        self.dependencies
            .entry(name.to_string())
            .or_insert_with(|| "*".to_string());
    }

    pub fn mark_uninstallable(&mut self, name: &str) {
        self.uninstallable.insert(name.to_string(), true);
    }

    /// Re-read the on-disk manifest after an installer run and merge our records into it
    ///
    /// The installer may have rewritten dependency entries; those win.
    pub fn merge_from_disk(&mut self, sandbox: &Path) -> Result<()> {
        if let Some(on_disk) = Self::load(sandbox)? {
            let ours = std::mem::replace(self, on_disk);
            for (name, version) in ours.dependencies {
                self.dependencies.entry(name).or_insert(version);
            }
            for (name, flag) in ours.uninstallable {
                self.uninstallable.entry(name).or_insert(flag);
            }
            for (name, version) in ours.overrides {
                self.overrides.entry(name).or_insert(version);
            }
        }
        Ok(())
    }
}
