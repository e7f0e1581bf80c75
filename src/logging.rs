//! Tracing subscriber setup
//!
//! Log lines go to stderr; stdout carries the summary only.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter variable checked before `RUST_LOG`
pub const LOG_ENV: &str = "EXPORTPROBE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Filter directive from the first variable that is set
fn directive<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(LOG_ENV)
        .or_else(|| lookup("RUST_LOG"))
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global subscriber; later calls are ignored
pub fn init() {
    let directive = directive(|key| std::env::var(key).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_variable_wins() {
        let value = directive(|key| match key {
            LOG_ENV => Some("debug".to_string()),
            "RUST_LOG" => Some("trace".to_string()),
            _ => None,
        });
        assert_eq!(value, "debug");
    }

    #[test]
    fn test_falls_back_to_rust_log() {
        let value = directive(|key| (key == "RUST_LOG").then(|| "info".to_string()));
        assert_eq!(value, "info");
    }

    #[test]
    fn test_defaults_to_warn() {
        assert_eq!(directive(|_| None), "warn");
    }
}
