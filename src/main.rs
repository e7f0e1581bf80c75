//! Exportprobe - CommonJS named export detection survey
//!
//! Installs the most popular npm packages into a local sandbox, loads each one
//! through both the CommonJS and the ESM interface, and reports how many of the
//! CommonJS named exports the ESM interface detects.

use clap::Parser;

mod cli;
mod common;
mod comparator;
mod config;
mod corpus;
mod domain;
mod error;
mod installer;
mod loader;
mod logging;
mod pipeline;
mod readme;
mod report;
mod ui;

use cli::Cli;
use config::ProbeConfig;
use corpus::HttpRankingFeed;
use error::Result;
use installer::Npm;
use loader::NodeHarnessLoader;
use pipeline::Collaborators;
use ui::{InteractiveProgressReporter, ProgressReporter, SilentProgressReporter};

fn run(count: usize) -> Result<()> {
    let work_dir = std::env::current_dir()
        .map_err(|e| error::fs::io_error(format!("Failed to resolve working directory: {e}")))?;
    let config = ProbeConfig::from_env(work_dir)?;

    let feed = HttpRankingFeed::new(config.feed_url.clone());
    let manager = Npm::new(config.npm.clone(), config.install_timeout);
    let loader = NodeHarnessLoader::new(config.node.clone(), config.load_timeout, config.inherited);
    let collaborators = Collaborators {
        feed: &feed,
        manager: &manager,
        loader: &loader,
    };

    let mut progress: Box<dyn ProgressReporter> = if config.progress {
        Box::new(InteractiveProgressReporter::new())
    } else {
        Box::new(SilentProgressReporter)
    };

    println!("Testing CommonJS named exports detection for top {count} packages...");
    let summary = pipeline::run(&config, count, &collaborators, progress.as_mut())?;
    tracing::info!(verdicts = summary.results.len(), "run complete");
    ui::summary::print(&summary.report);
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    if let Err(e) = run(cli.count) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
