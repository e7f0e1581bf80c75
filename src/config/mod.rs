//! Run configuration
//!
//! [`ProbeConfig`] is the single explicit configuration value handed to the
//! pipeline. It is built from `EXPORTPROBE_*` environment variables; the
//! only positional input is the package count on the command line.
//!
//! - [`manifest`]: the sandbox `package.json`

pub mod manifest;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::InheritedBindings;
use crate::error::{ProbeError, Result};

pub use manifest::SandboxManifest;

/// Popularity ranking published by npmrank
pub const DEFAULT_FEED_URL: &str = "https://anvaka.github.io/npmrank/online/npmrank.json";

/// Dependency resolution slows down sharply past a few hundred entries
pub const DEFAULT_SHARD_SIZE: usize = 200;

pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(600);

/// Sandbox root directory name under the working directory
pub const SANDBOX_DIR: &str = "test-app";

/// Ranking cache, relative to the working directory
pub const RANKING_CACHE: &str = ".cache/npmrank.json";

/// Results store, relative to the working directory
pub const RESULTS_FILE: &str = "results.json";

/// Everything a run needs to know, passed explicitly to the pipeline
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Directory holding the sandbox, the ranking cache and the results
    pub work_dir: PathBuf,
    /// Executable that runs the loader harness
    pub node: PathBuf,
    /// Package installer executable
    pub npm: PathBuf,
    pub feed_url: String,
    /// Maximum number of packages per sandbox manifest
    pub shard_size: usize,
    pub load_timeout: Duration,
    pub install_timeout: Duration,
    /// Installed packages dropped from the front of the test list
    pub skip_top: usize,
    pub inherited: InheritedBindings,
    /// Deny-list entries on top of the builtin module names
    pub extra_excluded: Vec<String>,
    /// Forced versions for transitive dependencies, written to every manifest
    pub overrides: BTreeMap<String, String>,
    /// Show the interactive status line
    pub progress: bool,
}

impl ProbeConfig {
    /// Defaults rooted at `work_dir`
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            node: PathBuf::from("node"),
            npm: PathBuf::from("npm"),
            feed_url: DEFAULT_FEED_URL.to_string(),
            shard_size: DEFAULT_SHARD_SIZE,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
            skip_top: 0,
            inherited: InheritedBindings::Include,
            extra_excluded: Vec::new(),
            // Native modules that no longer build on current Node
            overrides: BTreeMap::from([("iconv".to_string(), "*".to_string())]),
            progress: false,
        }
    }

    /// Build configuration from the process environment
    pub fn from_env(work_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut config = Self::from_lookup(work_dir, |key| std::env::var(key).ok())?;
        config.progress = console::Term::stderr().is_term();
        Ok(config)
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(work_dir: impl Into<PathBuf>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(work_dir);

        if let Some(node) = lookup("EXPORTPROBE_NODE") {
            config.node = PathBuf::from(node);
        }
        if let Some(npm) = lookup("EXPORTPROBE_NPM") {
            config.npm = PathBuf::from(npm);
        }
        if let Some(url) = lookup("EXPORTPROBE_FEED_URL") {
            config.feed_url = url;
        }
        if let Some(size) = lookup("EXPORTPROBE_SHARD_SIZE") {
            config.shard_size = parse_number("EXPORTPROBE_SHARD_SIZE", &size)?;
            if config.shard_size == 0 {
                return Err(ProbeError::ConfigInvalid {
                    message: "EXPORTPROBE_SHARD_SIZE must be greater than zero".to_string(),
                });
            }
        }
        if let Some(secs) = lookup("EXPORTPROBE_LOAD_TIMEOUT_SECS") {
            config.load_timeout =
                Duration::from_secs(parse_number("EXPORTPROBE_LOAD_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = lookup("EXPORTPROBE_INSTALL_TIMEOUT_SECS") {
            config.install_timeout =
                Duration::from_secs(parse_number("EXPORTPROBE_INSTALL_TIMEOUT_SECS", &secs)?);
        }
        if let Some(skip) = lookup("EXPORTPROBE_SKIP_TOP") {
            config.skip_top = parse_number("EXPORTPROBE_SKIP_TOP", &skip)?;
        }
        if let Some(flag) = lookup("EXPORTPROBE_OWN_ONLY") {
            if parse_flag("EXPORTPROBE_OWN_ONLY", &flag)? {
                config.inherited = InheritedBindings::Exclude;
            }
        }
        if let Some(list) = lookup("EXPORTPROBE_EXCLUDE") {
            config.extra_excluded = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(ToString::to_string)
                .collect();
        }

        Ok(config)
    }

    pub fn sandbox_root(&self) -> PathBuf {
        self.work_dir.join(SANDBOX_DIR)
    }

    pub fn ranking_cache(&self) -> PathBuf {
        self.work_dir.join(RANKING_CACHE)
    }

    pub fn results_file(&self) -> PathBuf {
        self.work_dir.join(RESULTS_FILE)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ProbeError::ConfigInvalid {
            message: format!("{key} must be a non-negative integer, got '{value}'"),
        })
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ProbeError::ConfigInvalid {
            message: format!("{key} must be a boolean, got '{value}'"),
        }),
    }
}

/// Atomically replace `path` with `contents`
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    use std::io::Write;

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| crate::error::fs::write_failed(path, e))?;

    let mut file = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| crate::error::fs::write_failed(path, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| crate::error::fs::write_failed(path, e))?;
    file.persist(path)
        .map_err(|e| crate::error::fs::write_failed(path, e.error))?;
    Ok(())
}
