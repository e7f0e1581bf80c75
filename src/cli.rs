//! CLI definitions using clap derive API

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};

/// Default number of packages to test
pub const DEFAULT_COUNT: usize = 3000;

/// Exportprobe - CommonJS named export detection survey
///
/// Measures how many CommonJS named exports the ESM import interface detects
/// across the most popular npm packages.
#[derive(Parser, Debug)]
#[command(
    name = "exportprobe",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Survey CommonJS named export detection across popular npm packages",
    long_about = "Exportprobe installs the most popular npm packages into a local sandbox, \
                  loads each one through both require() and import, and reports how many \
                  of the CommonJS named exports the ESM interface detects.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  exportprobe\n    \
                  exportprobe 500\n\n\
                  \x1b[1m\x1b[32mEnvironment:\x1b[0m\n    \
                  EXPORTPROBE_NODE, EXPORTPROBE_NPM            executables to run\n    \
                  EXPORTPROBE_FEED_URL                         popularity ranking source\n    \
                  EXPORTPROBE_SHARD_SIZE                       packages per sandbox shard\n    \
                  EXPORTPROBE_LOAD_TIMEOUT_SECS                per-package load timeout\n    \
                  EXPORTPROBE_INSTALL_TIMEOUT_SECS             per-call install timeout\n    \
                  EXPORTPROBE_SKIP_TOP                         leading packages to skip\n    \
                  EXPORTPROBE_OWN_ONLY                         ignore prototype bindings\n    \
                  EXPORTPROBE_EXCLUDE                          extra packages to skip\n    \
                  EXPORTPROBE_LOG                              log filter (e.g. debug)"
)]
pub struct Cli {
    /// Number of top packages to test
    #[arg(value_name = "COUNT", default_value_t = DEFAULT_COUNT)]
    pub count: usize,
}
