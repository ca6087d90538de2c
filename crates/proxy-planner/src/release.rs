//! Majority OS release of a model

use indexmap::IndexMap;
use std::fmt;
use topology_config::{Snapshot, is_container_id};
use tracing::{debug, warn};

/// Releases whose filebeat units still need the proxy's logging endpoint
pub const LEGACY_RELEASES: [&str; 2] = ["bionic", "xenial"];

/// Whether a release needs the legacy logging wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseClass {
    /// Logs are shipped through the proxy
    Legacy,
    /// Logs are shipped without the proxy
    Modern,
}

impl ReleaseClass {
    /// Classify a release name
    pub fn of(release: &str) -> Self {
        if LEGACY_RELEASES.contains(&release) {
            ReleaseClass::Legacy
        } else {
            ReleaseClass::Modern
        }
    }
}

impl fmt::Display for ReleaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseClass::Legacy => write!(f, "legacy"),
            ReleaseClass::Modern => write!(f, "modern"),
        }
    }
}

/// Most common release among the host machines of a snapshot
///
/// Machines are scanned in ascending id order (numeric ids first, by value,
/// then any other id lexicographically) and a tie goes to the release seen
/// first. Returns `None` when no host machine reports a release.
pub fn resolve_mode(snapshot: &Snapshot) -> Option<String> {
    for (id, machine) in snapshot.machines() {
        if !is_container_id(id) && machine.release().is_none() {
            warn!(
                "Machine {} in {} reports no release, skipping",
                id,
                snapshot.model_name()
            );
        }
    }

    let mut releases: Vec<(&str, &str)> = snapshot.machine_releases().collect();
    releases.sort_by_key(|&(id, _)| machine_order(id));

    let mut tally: IndexMap<&str, usize> = IndexMap::new();
    for (_, release) in releases {
        *tally.entry(release).or_default() += 1;
    }
    debug!("Release tally for {}: {:?}", snapshot.model_name(), tally);

    let mut mode: Option<(&str, usize)> = None;
    for (release, count) in tally {
        if mode.is_none_or(|(_, best)| count > best) {
            mode = Some((release, count));
        }
    }
    mode.map(|(release, _)| release.to_string())
}

fn machine_order(id: &str) -> (u8, u64, &str) {
    match id.parse::<u64>() {
        Ok(n) => (0, n, id),
        Err(_) => (1, 0, id),
    }
}
