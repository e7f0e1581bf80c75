//! Results store
//!
//! The full run result is written as one pretty-printed JSON array after
//! every run, replacing the previous file wholesale.

use std::path::Path;

use crate::config::write_atomic;
use crate::domain::Verdict;
use crate::error::Result;

pub fn write_results(path: &Path, verdicts: &[Verdict]) -> Result<()> {
    let json = serde_json::to_string_pretty(verdicts)?;
    write_atomic(path, &format!("{json}\n"))?;
    tracing::info!(path = %path.display(), count = verdicts.len(), "wrote results");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn verdict(name: &str) -> Verdict {
        Verdict {
            name: name.to_string(),
            expected_names: vec!["a".to_string()],
            detected_names: vec![],
            missing_names: vec!["a".to_string()],
            pass: false,
            transpiled: true,
            readme_encourages_named_exports: false,
        }
    }

    #[test]
    fn test_results_are_overwritten() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.json");

        write_results(&path, &[verdict("first"), verdict("second")]).unwrap();
        write_results(&path, &[verdict("third")]).unwrap();

        let parsed: Vec<Verdict> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "third");
    }
}
