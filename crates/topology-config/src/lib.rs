//! # Topology Configuration
//!
//! Snapshot and registry parser for the COS proxy planner.
//!
//! This crate reads the YAML produced by `juju status --format yaml` into a
//! read-only [`Snapshot`], and provides the [`CapabilityRegistries`] that map
//! integration-capable charms to the relation endpoints they expose.

#![warn(missing_docs)]

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod parser;
pub mod registry;

pub use registry::{Capability, CapabilityRegistries, CapabilityRegistry};

/// Machine ids containing this delimiter are containers (e.g. `0/lxd/3`)
pub const CONTAINER_DELIMITER: char = '/';

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Snapshot file is missing or unreadable
    #[error(
        "Unable to load file {path}. Please collect a fresh copy of juju status --format yaml > {path}"
    )]
    UnreadableSnapshot {
        /// Path that failed to load
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Snapshot is missing required structure or is not valid YAML
    #[error("Malformed snapshot {origin}: {reason}")]
    MalformedSnapshot {
        /// Where the snapshot came from (file path or `<string>`)
        origin: String,
        /// What is wrong with it
        reason: String,
    },

    /// A recognized token has no relation name in its registry
    #[error("Service type '{token}' has no registered {capability} relation")]
    UnregisteredServiceType {
        /// Capability table the token belongs to
        capability: Capability,
        /// The offending token
        token: String,
    },

    /// Failed to read a registry file
    #[error("Failed to read registry file {path}: {source}")]
    RegistryRead {
        /// Path of the registry file
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a registry file
    #[error("Failed to parse registry YAML: {0}")]
    RegistryYaml(#[from] serde_yaml::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A point-in-time view of one Juju model
///
/// Built by [`parser::parse_file`] or [`parser::parse_str`]; never mutated
/// afterwards. All tables keep the order in which they appear in the
/// source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub(crate) controller: String,
    pub(crate) model_name: String,
    pub(crate) machines: IndexMap<String, Machine>,
    pub(crate) applications: IndexMap<String, Application>,
    pub(crate) offers: IndexMap<String, Offer>,
}

impl Snapshot {
    /// Controller the model lives on
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// Model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Machine inventory keyed by machine id
    pub fn machines(&self) -> &IndexMap<String, Machine> {
        &self.machines
    }

    /// Application inventory keyed by application name
    pub fn applications(&self) -> &IndexMap<String, Application> {
        &self.applications
    }

    /// Offers published by this model, keyed by offer name
    pub fn offers(&self) -> &IndexMap<String, Offer> {
        &self.offers
    }

    /// Iterate `(machine id, release)` for every host machine with a known release
    ///
    /// Containers and machines whose release cannot be determined are skipped.
    pub fn machine_releases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.machines
            .iter()
            .filter(|(id, _)| !is_container_id(id))
            .filter_map(|(id, machine)| machine.release().map(|release| (id.as_str(), release)))
    }
}

/// Check whether a machine id names a container rather than a host
pub fn is_container_id(id: &str) -> bool {
    id.contains(CONTAINER_DELIMITER)
}

/// Machine entry of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// OS series reported by older Juju releases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,

    /// OS base reported by newer Juju releases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Base>,
}

impl Machine {
    /// Release name of the machine, preferring `series` over `base`
    pub fn release(&self) -> Option<&str> {
        if let Some(series) = self.series.as_deref() {
            return Some(series);
        }
        self.base.as_ref().map(Base::release)
    }
}

/// Operating system base of a machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    /// Distribution name, e.g. `ubuntu`
    pub name: String,
    /// Distribution channel, e.g. `22.04`
    pub channel: String,
}

impl Base {
    /// Ubuntu codename for the channel, or the channel itself when unknown
    pub fn release(&self) -> &str {
        let version = self.channel.split('/').next().unwrap_or_default();
        match version {
            "16.04" => "xenial",
            "18.04" => "bionic",
            "20.04" => "focal",
            "22.04" => "jammy",
            "24.04" => "noble",
            _ => self.channel.as_str(),
        }
    }
}

/// Application entry of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Charm identity, e.g. `ch:amd64/jammy/nrpe-94` or plain `nrpe`
    pub charm: String,
}

/// Offer entry of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Application backing the offer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,

    /// Exposed endpoints keyed by endpoint name
    #[serde(default)]
    pub endpoints: IndexMap<String, OfferEndpoint>,
}

/// Endpoint exposed through an offer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferEndpoint {
    /// Interface spoken on the endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,

    /// Role of the endpoint (provider or requirer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_ids() {
        assert!(is_container_id("0/lxd/1"));
        assert!(!is_container_id("12"));
    }

    #[test]
    fn test_release_prefers_series() {
        let machine = Machine {
            series: Some("focal".to_string()),
            base: Some(Base {
                name: "ubuntu".to_string(),
                channel: "22.04".to_string(),
            }),
        };
        assert_eq!(machine.release(), Some("focal"));
    }

    #[test]
    fn test_release_from_base() {
        let machine = Machine {
            series: None,
            base: Some(Base {
                name: "ubuntu".to_string(),
                channel: "18.04/stable".to_string(),
            }),
        };
        assert_eq!(machine.release(), Some("bionic"));

        let unknown = Base {
            name: "centos".to_string(),
            channel: "7".to_string(),
        };
        assert_eq!(unknown.release(), "7");
        assert_eq!(Machine::default().release(), None);
    }
}
