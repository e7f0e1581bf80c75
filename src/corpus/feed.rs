//! Popularity feed sources

use std::time::Duration;

use crate::error::{ProbeError, Result};

/// Source of the raw popularity ranking document
pub trait RankingFeed {
    /// Fetch the ranking document as text
    fn fetch(&self) -> Result<String>;

    /// Human readable origin, for logs
    fn describe(&self) -> String;
}

/// Ranking fetched over HTTPS
pub struct HttpRankingFeed {
    url: String,
    timeout: Duration,
}

impl HttpRankingFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(60),
        }
    }

    fn unavailable(&self, reason: impl ToString) -> ProbeError {
        ProbeError::FeedUnavailable {
            url: self.url.clone(),
            reason: reason.to_string(),
        }
    }
}

impl RankingFeed for HttpRankingFeed {
    fn fetch(&self) -> Result<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.unavailable(e))?;

        client
            .get(&self.url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(|e| self.unavailable(e))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
