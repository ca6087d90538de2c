//! Capability registries
//!
//! Each registry lists the charm tokens that take part in one kind of
//! integration, and the relation endpoint those charms expose for it. The
//! defaults cover the charms usually found in an OpenStack/Ceph cloud; an
//! operator may override any table from a YAML file:
//!
//! ```yaml
//! monitoring:
//!   tokens: [nrpe]
//!   relations:
//!     nrpe: monitors
//! ```

use crate::{ConfigError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Kind of integration brokered by the proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// NRPE health checks
    Monitoring,
    /// Grafana dashboards
    Dashboards,
    /// Log shipping
    Logging,
    /// Prometheus scrape targets
    PrometheusTargets,
}

impl Capability {
    /// All capabilities in registry order
    pub const ALL: [Capability; 4] = [
        Capability::Monitoring,
        Capability::Dashboards,
        Capability::Logging,
        Capability::PrometheusTargets,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Monitoring => "monitoring",
            Capability::Dashboards => "dashboards",
            Capability::Logging => "logging",
            Capability::PrometheusTargets => "prometheus-targets",
        };
        f.write_str(name)
    }
}

/// Recognized tokens and their relation names for one capability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityRegistry {
    /// Tokens to search for, in output order
    pub tokens: Vec<String>,

    /// Relation endpoint per token
    #[serde(default)]
    pub relations: IndexMap<String, String>,
}

impl CapabilityRegistry {
    /// Build a registry from `(token, relation)` pairs, keeping their order
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut registry = Self::default();
        for (token, relation) in pairs {
            registry.tokens.push(token.to_string());
            registry
                .relations
                .insert(token.to_string(), relation.to_string());
        }
        registry
    }

    /// Recognized tokens in declared order
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Relation endpoint registered for a token
    pub fn relation(&self, token: &str) -> Option<&str> {
        self.relations.get(token).map(String::as_str)
    }

    /// Check that every token has a relation
    pub fn validate(&self, capability: Capability) -> Result<()> {
        match self.tokens().find(|token| self.relation(token).is_none()) {
            Some(token) => Err(ConfigError::UnregisteredServiceType {
                capability,
                token: token.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// The four capability registries handed to the plan builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityRegistries {
    /// Charms providing NRPE checks through a `monitors` relation
    pub monitoring: CapabilityRegistry,
    /// Charms shipping Grafana dashboards
    pub dashboards: CapabilityRegistry,
    /// Charms shipping logs
    pub logging: CapabilityRegistry,
    /// Charms exposing Prometheus scrape targets
    pub prometheus_targets: CapabilityRegistry,
}

impl Default for CapabilityRegistries {
    fn default() -> Self {
        Self {
            monitoring: CapabilityRegistry::from_pairs([("nrpe", "monitors")]),
            dashboards: CapabilityRegistry::from_pairs([
                ("telegraf", "dashboards"),
                ("etcd", "grafana"),
                ("ceph-dashboard", "grafana-dashboard"),
                ("prometheus-grok-exporter", "dashboards"),
                ("prometheus-libvirt-exporter", "dashboards"),
                ("prometheus-openstack-exporter", "dashboards"),
            ]),
            logging: CapabilityRegistry::from_pairs([("filebeat", "logstash")]),
            prometheus_targets: CapabilityRegistry::from_pairs([
                ("telegraf", "prometheus-client"),
                ("ceph-mon", "prometheus"),
                ("prometheus-grok-exporter", "prometheus-client"),
                ("prometheus-libvirt-exporter", "scrape"),
                (
                    "prometheus-openstack-exporter",
                    "prometheus-openstack-exporter-service",
                ),
            ]),
        }
    }
}

impl CapabilityRegistries {
    /// Registry for a capability
    pub fn get(&self, capability: Capability) -> &CapabilityRegistry {
        match capability {
            Capability::Monitoring => &self.monitoring,
            Capability::Dashboards => &self.dashboards,
            Capability::Logging => &self.logging,
            Capability::PrometheusTargets => &self.prometheus_targets,
        }
    }

    /// Check every registry for tokens without a relation
    pub fn validate(&self) -> Result<()> {
        for capability in Capability::ALL {
            self.get(capability).validate(capability)?;
        }
        Ok(())
    }
}

/// Load registries from a YAML file, falling back to defaults for omitted tables
pub fn load_file(path: impl AsRef<Path>) -> Result<CapabilityRegistries> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::RegistryRead {
        path: path.display().to_string(),
        source,
    })?;
    debug!("Loading capability registries from {}", path.display());
    parse_str(&content)
}

/// Parse registries from a YAML string
pub fn parse_str(content: &str) -> Result<CapabilityRegistries> {
    let registries: CapabilityRegistries = serde_yaml::from_str(content)?;
    registries.validate()?;
    Ok(registries)
}
