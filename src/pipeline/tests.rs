//! Tests for the run pipeline

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use tempfile::TempDir;

use super::*;
use crate::domain::ExportSurface;
use crate::error::ProbeError;
use crate::error::package::{install_failed, load_failed};
use crate::loader::LoadedSurfaces;
use crate::report::Bucket;
use crate::ui::SilentProgressReporter;

struct StaticFeed(String);

impl RankingFeed for StaticFeed {
    fn fetch(&self) -> Result<String> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Creates `node_modules/<name>/README.md` with the configured readme
struct FakeManager {
    readmes: HashMap<String, String>,
    broken: HashSet<String>,
    calls: RefCell<usize>,
}

impl PackageManager for FakeManager {
    fn install(&self, sandbox: &Path, packages: &[String]) -> Result<()> {
        *self.calls.borrow_mut() += 1;
        if packages.iter().any(|p| self.broken.contains(p)) {
            return Err(install_failed(packages, "exit status: 1"));
        }
        for name in packages {
            let dir = PackageRecord::new(name.clone(), sandbox).install_dir();
            std::fs::create_dir_all(&dir).unwrap();
            if let Some(readme) = self.readmes.get(name) {
                std::fs::write(dir.join("README.md"), readme).unwrap();
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
enum Behaviour {
    Surfaces(&'static [&'static str], &'static [&'static str], bool),
    Throws,
    Hangs,
}

struct FakeLoader {
    behaviours: HashMap<String, Behaviour>,
    loaded: RefCell<Vec<String>>,
}

impl ModuleLoader for FakeLoader {
    fn load(&self, record: &PackageRecord) -> Result<LoadedSurfaces> {
        self.loaded.borrow_mut().push(record.name.clone());
        match self.behaviours.get(&record.name) {
            Some(Behaviour::Surfaces(dynamic, imported, transpiled)) => Ok(LoadedSurfaces {
                expected: ExportSurface::from_names(dynamic.iter().copied()),
                actual: ExportSurface::from_names(imported.iter().copied()),
                transpiled: *transpiled,
            }),
            Some(Behaviour::Throws) => Err(load_failed(&record.name, "window is not defined")),
            Some(Behaviour::Hangs) => Err(ProbeError::LoadTimedOut {
                package: record.name.clone(),
                seconds: 10,
            }),
            None => Err(ProbeError::ProcessSpawnFailed {
                program: "node".to_string(),
                reason: "not found".to_string(),
            }),
        }
    }
}

struct Fixture {
    temp: TempDir,
    config: ProbeConfig,
    manager: FakeManager,
    loader: FakeLoader,
}

impl Fixture {
    /// Packages ranked in the given order, each with a readme
    fn new(packages: &[(&str, &str, Behaviour)]) -> Self {
        let temp = TempDir::new().unwrap();
        let config = ProbeConfig::new(temp.path());

        let total = packages.len();
        let rank: serde_json::Map<String, serde_json::Value> = packages
            .iter()
            .enumerate()
            .map(|(i, (name, _, _))| ((*name).to_string(), serde_json::json!(total - i)))
            .collect();
        std::fs::create_dir_all(temp.path().join(".cache")).unwrap();
        std::fs::write(
            config.ranking_cache(),
            serde_json::json!({ "rank": rank }).to_string(),
        )
        .unwrap();

        let mut readmes = HashMap::new();
        let mut behaviours = HashMap::new();
        for (name, readme, behaviour) in packages {
            readmes.insert((*name).to_string(), (*readme).to_string());
            behaviours.insert((*name).to_string(), behaviour.clone());
        }

        Self {
            temp,
            config,
            manager: FakeManager {
                readmes,
                broken: HashSet::new(),
                calls: RefCell::new(0),
            },
            loader: FakeLoader {
                behaviours,
                loaded: RefCell::new(Vec::new()),
            },
        }
    }

    fn run(&self, count: usize) -> Result<RunSummary> {
        let feed = StaticFeed(String::new());
        let collaborators = Collaborators {
            feed: &feed,
            manager: &self.manager,
            loader: &self.loader,
        };
        run(&self.config, count, &collaborators, &mut SilentProgressReporter)
    }
}

#[test]
fn test_scenarios_end_to_end() {
    let fixture = Fixture::new(&[
        ("default-only", "docs", Behaviour::Surfaces(&[], &["default"], true)),
        (
            "all-named",
            "docs",
            Behaviour::Surfaces(&["a", "b"], &["a", "b", "default"], false),
        ),
        (
            "partial",
            "import { a } from 'partial';",
            Behaviour::Surfaces(&["a", "b", "c"], &["a"], false),
        ),
        ("browser-only", "docs", Behaviour::Throws),
        ("waits", "docs", Behaviour::Hangs),
    ]);

    let summary = fixture.run(10).unwrap();
    let names: Vec<&str> = summary.results.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["default-only", "all-named", "partial"]);

    let buckets: Vec<Bucket> = summary
        .results
        .iter()
        .map(crate::report::classify)
        .collect();
    assert_eq!(
        buckets,
        vec![
            Bucket::DefaultOnly,
            Bucket::AllDetected,
            Bucket::PartialWithIntent
        ]
    );

    assert_eq!(summary.report.overall.count, 3);
    assert_eq!(summary.report.readme_signaled.count, 1);
    assert_eq!(summary.report.transpiled.count, 1);
    assert_eq!(summary.report.transpiled.default_only, 1);

    let partial = &summary.results[2];
    assert_eq!(partial.detected_names, vec!["a"]);
    assert_eq!(partial.missing_names, vec!["b", "c"]);
}

#[test]
fn test_results_file_written() {
    let fixture = Fixture::new(&[("pkg", "docs", Behaviour::Surfaces(&["x"], &["x"], false))]);
    fixture.run(1).unwrap();

    let raw = std::fs::read_to_string(fixture.temp.path().join("results.json")).unwrap();
    let stored: Vec<Verdict> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].pass);
}

#[test]
fn test_package_without_readme_is_not_loaded() {
    let mut fixture = Fixture::new(&[
        ("documented", "docs", Behaviour::Surfaces(&["a"], &["a"], false)),
        ("undocumented", "", Behaviour::Surfaces(&["a"], &["a"], false)),
    ]);
    fixture.manager.readmes.remove("undocumented");

    let summary = fixture.run(2).unwrap();
    assert_eq!(summary.results.len(), 1);
    assert_eq!(fixture.loader.loaded.borrow().clone(), vec!["documented"]);
}

#[test]
fn test_uninstallable_package_is_absent() {
    let mut fixture = Fixture::new(&[
        ("good", "docs", Behaviour::Surfaces(&["a"], &[], false)),
        ("bad", "docs", Behaviour::Surfaces(&["a"], &["a"], false)),
    ]);
    fixture.manager.broken.insert("bad".to_string());

    let summary = fixture.run(2).unwrap();
    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.results[0].name, "good");
    assert_eq!(summary.report.overall.none_no_signal, 1);
}

#[test]
fn test_skip_top_drops_leading_packages() {
    let mut fixture = Fixture::new(&[
        ("first", "docs", Behaviour::Surfaces(&["a"], &["a"], false)),
        ("second", "docs", Behaviour::Surfaces(&["a"], &["a"], false)),
        ("third", "docs", Behaviour::Surfaces(&["a"], &["a"], false)),
    ]);
    fixture.config.skip_top = 2;

    let summary = fixture.run(3).unwrap();
    let names: Vec<&str> = summary.results.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["third"]);
}

#[test]
fn test_rerun_installs_nothing() {
    let fixture = Fixture::new(&[
        ("a", "docs", Behaviour::Surfaces(&["x"], &["x"], false)),
        ("b", "docs", Behaviour::Surfaces(&["x"], &["x"], false)),
    ]);
    let first = fixture.run(2).unwrap();
    let calls_after_first = *fixture.manager.calls.borrow();

    let second = fixture.run(2).unwrap();
    assert_eq!(*fixture.manager.calls.borrow(), calls_after_first);
    assert_eq!(first.report, second.report);
}

#[test]
fn test_loader_environment_failure_aborts_run() {
    let fixture = Fixture::new(&[("a", "docs", Behaviour::Surfaces(&["x"], &["x"], false))]);
    let loader = FakeLoader {
        behaviours: HashMap::new(),
        loaded: RefCell::new(Vec::new()),
    };

    let feed = StaticFeed(String::new());
    let collaborators = Collaborators {
        feed: &feed,
        manager: &fixture.manager,
        loader: &loader,
    };
    let err = run(&fixture.config, 1, &collaborators, &mut SilentProgressReporter).unwrap_err();
    assert!(matches!(err, ProbeError::ProcessSpawnFailed { .. }));
}
