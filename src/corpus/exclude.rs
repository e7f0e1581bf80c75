//! Static deny-list
//!
//! Packages on this list are skipped before any install attempt. Node's
//! builtin module names shadow npm packages of the same name, so testing
//! them would measure the builtin rather than the package.

use std::collections::HashSet;

/// Node builtin modules
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "zlib",
];

/// Packages known to fail to build or to be noisy on load
#[derive(Debug, Clone)]
pub struct ExclusionList {
    names: HashSet<String>,
}

impl ExclusionList {
    /// Builtins plus any extra names
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = NODE_BUILTINS
            .iter()
            .map(|name| (*name).to_string())
            .chain(extra.into_iter().map(Into::into))
            .collect();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl Default for ExclusionList {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}
