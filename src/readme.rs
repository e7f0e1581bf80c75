//! Readme heuristic
//!
//! A readme "encourages named exports" when its usage examples destructure
//! the package, either through `import { ... } from '<name>'` or through
//! `{ ... } = require('<name>')`. Both patterns must sit on a single line.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::domain::PackageRecord;
use crate::error::{ProbeError, Result, package::readme_pattern_invalid};

/// Readme file names recognised, compared case-insensitively
const README_NAMES: &[&str] = &["readme.md", "readme.markdown"];

/// Locate the package readme inside its install directory
pub fn find_readme(package_dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(package_dir).ok()?;
    let mut found: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
            README_NAMES.contains(&name.as_str())
        })
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();

    // Prefer `.md` over `.markdown`, then a stable order
    found.sort_by_key(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        (README_NAMES.iter().position(|r| *r == name), path.clone())
    });
    found.into_iter().next()
}

/// Destructuring usage of `package`, as one alternation
fn named_usage(package: &str) -> Result<Regex> {
    let name = regex::escape(package);
    let pattern = format!(
        r#"import \{{.*\}} from ['"]{name}['"`]|\{{.*\}} = require\(['"`]{name}['"`]"#
    );
    Regex::new(&pattern).map_err(|e| readme_pattern_invalid(package, e.to_string()))
}

/// Whether `readme` shows named-export usage of `package`
pub fn encourages_named_exports(package: &str, readme: &str) -> Result<bool> {
    Ok(named_usage(package)?.is_match(readme))
}

/// Read the readme of an installed package and apply the heuristic
///
/// A package without a readme yields [`ProbeError::ReadmeMissing`].
pub fn analyze(record: &PackageRecord) -> Result<bool> {
    let missing = || ProbeError::ReadmeMissing {
        package: record.name.clone(),
    };
    let path = find_readme(&record.install_dir()).ok_or_else(missing)?;
    let bytes = std::fs::read(&path).map_err(|_| missing())?;
    encourages_named_exports(&record.name, &String::from_utf8_lossy(&bytes))
}
