//! Common test utilities for exportprobe integration tests
//!
//! A [`TestWorkspace`] carries a cached popularity ranking and shell-script
//! stand-ins for `node` and `npm`, so a whole run works offline.

use std::path::PathBuf;
use tempfile::TempDir;

/// Fake `npm`: logs each call, fails for `bad-*` packages and lays out
/// `node_modules/<name>/README.md` otherwise. Packages named `named-*` get a
/// readme showing named-export usage.
#[allow(dead_code)]
const FAKE_NPM: &str = r##"#!/bin/sh
echo "$*" >> "$FAKE_NPM_LOG"
shift 4
for pkg in "$@"; do
  case "$pkg" in
    bad-*) echo "npm ERR! 404 $pkg" >&2; exit 1 ;;
  esac
done
for pkg in "$@"; do
  mkdir -p "node_modules/$pkg"
  case "$pkg" in
    named-*) echo "import { a } from '$pkg';" > "node_modules/$pkg/README.md" ;;
    *) echo "# $pkg" > "node_modules/$pkg/README.md" ;;
  esac
done
"##;

/// Fake `node`: reads the target package out of the harness and prints a
/// canned report. `throw-*` packages fail to load.
#[allow(dead_code)]
const FAKE_NODE: &str = r##"#!/bin/sh
name=$(sed -n 's/^const TARGET = "\(.*\)";$/\1/p' "$1")
case "$name" in
  throw-*) echo "ReferenceError: window is not defined" >&2; exit 1 ;;
  default-*) echo '{"dynamic":{"own":[]},"static":{"own":["default"]}}' ;;
  named-*) echo '{"dynamic":{"own":["a","b","c"]},"static":{"own":["a","default"]}}' ;;
  *) echo '{"dynamic":{"own":["a","b"]},"static":{"own":["a","b","default"]}}' ;;
esac
"##;

/// A test workspace for integration tests
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Cache a ranking in which `packages` appear most popular first
    pub fn write_ranking(&self, packages: &[&str]) {
        let total = packages.len();
        let rank: serde_json::Map<String, serde_json::Value> = packages
            .iter()
            .enumerate()
            .map(|(i, name)| ((*name).to_string(), serde_json::json!(total - i)))
            .collect();
        self.write_file(
            ".cache/npmrank.json",
            &serde_json::json!({ "rank": rank }).to_string(),
        );
    }

    /// Install the fake `node` and `npm` executables
    #[cfg(unix)]
    pub fn install_fakes(&self) {
        use std::os::unix::fs::PermissionsExt;

        for (name, body) in [("bin/node", FAKE_NODE), ("bin/npm", FAKE_NPM)] {
            self.write_file(name, body);
            std::fs::set_permissions(
                self.path.join(name),
                std::fs::Permissions::from_mode(0o755),
            )
            .expect("Failed to make fake executable");
        }
    }

    pub fn node_bin(&self) -> PathBuf {
        self.path.join("bin/node")
    }

    pub fn npm_bin(&self) -> PathBuf {
        self.path.join("bin/npm")
    }

    /// File the fake `npm` appends its arguments to
    pub fn npm_log(&self) -> PathBuf {
        self.path.join("npm-calls.log")
    }

    /// Recorded `npm` invocations, one per line
    pub fn npm_calls(&self) -> Vec<String> {
        if !self.file_exists("npm-calls.log") {
            return Vec::new();
        }
        self.read_file("npm-calls.log")
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    /// Get path to exportprobe binary
    pub fn exportprobe_bin() -> PathBuf {
        PathBuf::from(env!("CARGO_BIN_EXE_exportprobe"))
    }
}
