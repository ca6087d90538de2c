//! Snapshot parser for `juju status --format yaml` output

use crate::{Application, ConfigError, Machine, Offer, Result, Snapshot};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use tracing::debug;

const STRING_ORIGIN: &str = "<string>";

/// Top-level document as it appears on disk
///
/// Every key is optional here so that a missing one can be reported as a
/// malformed snapshot naming the key, instead of a bare YAML error. Required
/// keys are `None` when absent and `Some(None)` when present but null.
#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default, deserialize_with = "present")]
    model: Option<Option<RawModel>>,
    #[serde(default, deserialize_with = "present")]
    applications: Option<Option<IndexMap<String, Application>>>,
    #[serde(default, deserialize_with = "present")]
    machines: Option<Option<IndexMap<String, Machine>>>,
    offers: Option<IndexMap<String, Offer>>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    #[serde(default, deserialize_with = "present")]
    name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    controller: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse a snapshot file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).map_err(|source| ConfigError::UnreadableSnapshot {
            path: path.display().to_string(),
            source,
        })?;
    parse_with_origin(&content, &path.display().to_string())
}

/// Parse a snapshot from a string
pub fn parse_str(content: &str) -> Result<Snapshot> {
    parse_with_origin(content, STRING_ORIGIN)
}

fn parse_with_origin(content: &str, origin: &str) -> Result<Snapshot> {
    let raw: RawSnapshot =
        serde_yaml::from_str(content).map_err(|e| malformed(origin, e.to_string()))?;
    let snapshot = validate_snapshot(raw, origin)?;

    debug!(
        "Loaded snapshot {}:{} from {} ({} machines, {} applications, {} offers)",
        snapshot.controller,
        snapshot.model_name,
        origin,
        snapshot.machines.len(),
        snapshot.applications.len(),
        snapshot.offers.len()
    );

    Ok(snapshot)
}

/// Check the required keys and build the read-only snapshot
fn validate_snapshot(raw: RawSnapshot, origin: &str) -> Result<Snapshot> {
    let model = required(raw.model, "model", origin)?;
    let controller = required(model.controller, "model.controller", origin)?;
    let model_name = required(model.name, "model.name", origin)?;
    let applications = required(raw.applications, "applications", origin)?;
    let machines = required(raw.machines, "machines", origin)?;

    Ok(Snapshot {
        controller,
        model_name,
        machines,
        applications,
        offers: raw.offers.unwrap_or_default(),
    })
}

fn required<T>(value: Option<Option<T>>, key: &str, origin: &str) -> Result<T> {
    match value {
        Some(Some(value)) => Ok(value),
        Some(None) => Err(malformed(
            origin,
            format!("required key '{key}' is empty or null"),
        )),
        None => Err(malformed(origin, format!("missing required key '{key}'"))),
    }
}

fn malformed(origin: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::MalformedSnapshot {
        origin: origin.to_string(),
        reason: reason.into(),
    }
}
