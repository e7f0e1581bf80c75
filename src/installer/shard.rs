//! Sandbox shard layout
//!
//! Dependency resolution cost grows faster than linearly with manifest size,
//! so packages are spread across `shard-NNN` sandboxes of bounded size under
//! the sandbox root. The root itself never holds packages: a package keeps
//! its shard as the corpus grows, and no shard resolves modules through
//! another sandbox's `node_modules`.

use std::path::{Path, PathBuf};

const SHARD_PREFIX: &str = "shard-";

/// One sandbox directory and the packages to install into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    pub index: usize,
    pub dir: PathBuf,
    pub members: Vec<String>,
}

/// How full an existing shard already is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy {
    pub index: usize,
    /// Packages recorded in the shard, installed or uninstallable
    pub used: usize,
}

pub fn shard_dir(root: &Path, index: usize) -> PathBuf {
    root.join(format!("{SHARD_PREFIX}{index:03}"))
}

/// Index of a `shard-NNN` directory name
pub fn parse_index(name: &str) -> Option<usize> {
    let digits = name.strip_prefix(SHARD_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Assign `pending` packages to shards of at most `shard_size` packages
///
/// Existing shards are topped up in index order before new shards are
/// opened after the highest existing index. Shards that receive nothing are
/// left out.
pub fn plan(
    root: &Path,
    existing: &[Occupancy],
    pending: &[String],
    shard_size: usize,
) -> Vec<Shard> {
    let size = shard_size.max(1);
    let mut remaining = pending;
    let mut shards = Vec::new();

    for occupancy in existing {
        if remaining.is_empty() {
            break;
        }
        let room = size.saturating_sub(occupancy.used).min(remaining.len());
        if room == 0 {
            continue;
        }
        let (members, rest) = remaining.split_at(room);
        shards.push(Shard {
            index: occupancy.index,
            dir: shard_dir(root, occupancy.index),
            members: members.to_vec(),
        });
        remaining = rest;
    }

    let first_new = existing.iter().map(|o| o.index + 1).max().unwrap_or(0);
    shards.extend(
        remaining
            .chunks(size)
            .enumerate()
            .map(|(offset, members)| Shard {
                index: first_new + offset,
                dir: shard_dir(root, first_new + offset),
                members: members.to_vec(),
            }),
    );
    shards
}
