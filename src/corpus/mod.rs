//! Corpus selection
//!
//! Ranks the universe of npm packages by popularity and slices off the top
//! `count`. The ranking comes from a local cache when present, otherwise from
//! the [`RankingFeed`], whose response is cached for future runs.
//!
//! - [`feed`]: popularity feed sources
//! - [`exclude`]: static deny-list consulted before any install

pub mod exclude;
pub mod feed;

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::config::write_atomic;
use crate::error::{ProbeError, Result};

pub use exclude::ExclusionList;
pub use feed::{HttpRankingFeed, RankingFeed};

#[derive(Debug, Deserialize)]
struct RankingDocument {
    rank: BTreeMap<String, serde_json::Value>,
}

/// Scores are numbers, occasionally numeric strings
fn score(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Package names ordered by descending popularity
///
/// Equal scores are ordered by name so the selection is stable.
pub fn rank_packages(raw: &str, source_name: &str) -> Result<Vec<String>> {
    let document: RankingDocument =
        serde_json::from_str(raw).map_err(|e| ProbeError::FeedParseFailed {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })?;

    let mut ranked: Vec<(String, f64)> = document
        .rank
        .into_iter()
        .filter_map(|(name, value)| score(&value).map(|s| (name, s)))
        .collect();
    ranked.sort_by(|(a_name, a_score), (b_name, b_score)| {
        b_score.total_cmp(a_score).then_with(|| a_name.cmp(b_name))
    });
    Ok(ranked.into_iter().map(|(name, _)| name).collect())
}

/// Read the cached ranking or fetch and cache a fresh one
fn load_ranking(cache: &Path, feed: &dyn RankingFeed) -> Result<String> {
    match std::fs::read_to_string(cache) {
        Ok(raw) => {
            tracing::debug!(cache = %cache.display(), "using cached popularity ranking");
            return Ok(raw);
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(crate::error::fs::read_failed(cache, e)),
    }

    tracing::info!(source = %feed.describe(), "fetching popularity ranking");
    let raw = feed.fetch()?;
    if let Err(e) = write_atomic(cache, &raw) {
        // The fetched data is still usable for this run
        tracing::warn!(error = %e, "could not cache popularity ranking");
    }
    Ok(raw)
}

/// Top `count` package names, most popular first
pub fn select(count: usize, cache: &Path, feed: &dyn RankingFeed) -> Result<Vec<String>> {
    let raw = load_ranking(cache, feed)?;
    let mut names = rank_packages(&raw, &cache.display().to_string())?;
    names.truncate(count);
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct CountingFeed {
        body: std::result::Result<String, String>,
        calls: Cell<usize>,
    }

    impl CountingFeed {
        fn ok(body: &str) -> Self {
            Self {
                body: Ok(body.to_string()),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                body: Err("offline".to_string()),
                calls: Cell::new(0),
            }
        }
    }

    impl RankingFeed for CountingFeed {
        fn fetch(&self) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            self.body.clone().map_err(|reason| ProbeError::FeedUnavailable {
                url: "test://feed".to_string(),
                reason,
            })
        }

        fn describe(&self) -> String {
            "test://feed".to_string()
        }
    }

    const RANKING: &str =
        r#"{"rank": {"react": 0.5, "lodash": 0.9, "chalk": 0.7, "debug": "0.7", "odd": null}}"#;

    #[test]
    fn test_rank_sorts_descending_with_name_tiebreak() {
        let names = rank_packages(RANKING, "test").unwrap();
        assert_eq!(names, vec!["lodash", "chalk", "debug", "react"]);
    }

    #[test]
    fn test_select_truncates() {
        let temp = TempDir::new().unwrap();
        let feed = CountingFeed::ok(RANKING);
        let names = select(2, &temp.path().join("rank.json"), &feed).unwrap();
        assert_eq!(names, vec!["lodash", "chalk"]);
    }

    #[test]
    fn test_fetch_is_cached_for_next_run() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join(".cache").join("npmrank.json");
        let feed = CountingFeed::ok(RANKING);

        select(10, &cache, &feed).unwrap();
        select(10, &cache, &feed).unwrap();

        assert_eq!(feed.calls.get(), 1);
        assert!(cache.exists());
    }

    #[test]
    fn test_cache_preferred_over_feed() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("npmrank.json");
        std::fs::write(&cache, r#"{"rank": {"only-cached": 1}}"#).unwrap();
        let feed = CountingFeed::failing();

        let names = select(5, &cache, &feed).unwrap();
        assert_eq!(names, vec!["only-cached"]);
        assert_eq!(feed.calls.get(), 0);
    }

    #[test]
    fn test_no_cache_and_no_feed_is_fatal() {
        let temp = TempDir::new().unwrap();
        let feed = CountingFeed::failing();
        let err = select(5, &temp.path().join("missing.json"), &feed).unwrap_err();
        assert!(matches!(err, ProbeError::FeedUnavailable { .. }));
        assert!(!err.is_per_package());
    }

    #[test]
    fn test_malformed_ranking_is_parse_error() {
        let err = rank_packages(r#"{"scores": {}}"#, "cache").unwrap_err();
        assert!(matches!(err, ProbeError::FeedParseFailed { .. }));
    }
}
