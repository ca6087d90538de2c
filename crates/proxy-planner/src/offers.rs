//! COS offer resolution

use std::fmt;
use topology_config::Snapshot;
use tracing::debug;

/// User owning the COS offers
pub const JUJU_USER: &str = "admin";

/// Prefix of the local alias an offer is consumed under
pub const OFFER_ALIAS_PREFIX: &str = "cos-";

/// Endpoints the proxy needs from the COS model
pub const REQUIRED_COS_INTERFACES: [&str; 5] = [
    "grafana-dashboard",
    "logging",
    "metrics-endpoint",
    "receive-remote-write",
    "configurable-scrape-jobs",
];

/// Fully qualified reference to an offer, `admin/{model}.{offer}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OfferReference {
    /// Owner of the offer
    pub user: String,
    /// Model publishing the offer
    pub model: String,
    /// Offer name
    pub offer: String,
}

impl OfferReference {
    /// Reference an offer owned by the admin user
    pub fn new(model: impl Into<String>, offer: impl Into<String>) -> Self {
        Self {
            user: JUJU_USER.to_string(),
            model: model.into(),
            offer: offer.into(),
        }
    }

    /// Local alias the offer is consumed under, e.g. `cos-grafana-dashboards`
    pub fn alias(&self) -> String {
        format!("{OFFER_ALIAS_PREFIX}{}", self.offer)
    }
}

impl fmt::Display for OfferReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}.{}", self.user, self.model, self.offer)
    }
}

/// Offers of the COS snapshot exposing at least one required interface
///
/// Each offer appears once, however many qualifying endpoints it exposes.
pub fn resolve_offers(cos: &Snapshot) -> Vec<OfferReference> {
    let offers: Vec<OfferReference> = cos
        .offers()
        .iter()
        .filter(|(_, offer)| {
            offer
                .endpoints
                .keys()
                .any(|endpoint| REQUIRED_COS_INTERFACES.contains(&endpoint.as_str()))
        })
        .map(|(name, _)| OfferReference::new(cos.model_name(), name.as_str()))
        .collect();

    debug!(
        "Resolved {} of {} offers in {}:{}",
        offers.len(),
        cos.offers().len(),
        cos.controller(),
        cos.model_name()
    );
    offers
}
