//! Action plan builder
//!
//! Composes classification, offer and release resolution into the ordered
//! list of operations that inserts the COS proxies into a deployment. The
//! build is a single linear pass: it either produces a complete plan or an
//! error, never a partial plan.

use crate::classifier::Classifier;
use crate::error::Result;
use crate::offers::{OfferReference, resolve_offers};
use crate::plan::ActionPlan;
use crate::release::{ReleaseClass, resolve_mode};
use topology_config::{Capability, CapabilityRegistries, Snapshot};
use tracing::{debug, info, warn};

/// Charm deployed for both proxies
pub const PROXY_CHARM: &str = "ch:cos-proxy";
/// General purpose proxy application
pub const PROXY_APP: &str = "cos-proxy";
/// Proxy application serving NRPE monitors
pub const MONITORS_PROXY_APP: &str = "cos-proxy-monitors";

/// Local alias of the COS Grafana dashboards offer
pub const COS_DASHBOARDS_ALIAS: &str = "cos-grafana-dashboards";
/// Local alias of the COS scrape configuration offer for metrics
pub const COS_METRICS_SCRAPE_ALIAS: &str = "cos-scrape-interval-config-metrics";
/// Local alias of the COS scrape configuration offer for monitors
pub const COS_MONITORS_SCRAPE_ALIAS: &str = "cos-scrape-interval-config-monitors";
/// Local alias of the COS Loki logging offer
pub const COS_LOGGING_ALIAS: &str = "cos-loki-logging";

/// Existing Grafana endpoint dashboards are detached from
const LEGACY_GRAFANA_ENDPOINT: &str = "grafana:dashboards";

/// Deployment settings for the proxies
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOptions {
    /// Placement directive for both proxies, e.g. `lxd:0`
    pub placement: String,
    /// Channel of the cos-proxy charm
    pub channel: String,
    /// Series the proxies are deployed on
    pub series: String,
    /// Space the proxies bind to
    pub bind_space: String,
    /// Channel exporter charms are refreshed to
    pub refresh_channel: String,
    /// Exporter applications switched to the charmhub charm
    pub exporters_to_refresh: Vec<String>,
}

impl PlanOptions {
    /// Default options for a placement directive
    pub fn new(placement: impl Into<String>) -> Self {
        Self {
            placement: placement.into(),
            channel: "edge".to_string(),
            series: "jammy".to_string(),
            bind_space: "oam-space".to_string(),
            refresh_channel: "latest/stable".to_string(),
            exporters_to_refresh: [
                "prometheus-grok-exporter",
                "prometheus-libvirt-exporter",
                "prometheus-openstack-exporter",
            ]
            .map(String::from)
            .to_vec(),
        }
    }

    /// Set the cos-proxy channel
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Set the proxy series
    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series = series.into();
        self
    }

    /// Set the binding space
    pub fn with_bind_space(mut self, bind_space: impl Into<String>) -> Self {
        self.bind_space = bind_space.into();
        self
    }
}

/// Snapshots a plan is built from
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    /// Observability (COS) model
    pub cos: &'a Snapshot,
    /// Primary workload model the proxies are deployed into
    pub primary: &'a Snapshot,
    /// Further models that only get NRPE monitoring
    pub secondaries: &'a [Snapshot],
}

/// Application wired to the proxy through a given relation endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
struct Wiring {
    app: String,
    relation: String,
}

impl Wiring {
    fn endpoint(&self) -> String {
        format!("{}:{}", self.app, self.relation)
    }
}

/// Builds action plans from snapshots
#[derive(Debug)]
pub struct PlanBuilder {
    registries: CapabilityRegistries,
    options: PlanOptions,
    classifier: Classifier,
}

impl PlanBuilder {
    /// Create a builder, rejecting registries with unregistered tokens
    pub fn new(registries: CapabilityRegistries, options: PlanOptions) -> Result<Self> {
        registries.validate()?;
        Ok(Self {
            registries,
            options,
            classifier: Classifier::default(),
        })
    }

    /// Replace the substring classifier
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Build the full plan
    pub fn build(&self, inputs: &PlanInputs<'_>) -> Result<ActionPlan> {
        let cos = inputs.cos;
        let primary = inputs.primary;
        let main_controller = primary.controller();
        let main_model = primary.model_name();

        let offers = resolve_offers(cos);
        let monitors = self.wirings(Capability::Monitoring, primary);
        let dashboards = self.wirings(Capability::Dashboards, primary);
        let prometheus_targets = self.wirings(Capability::PrometheusTargets, primary);
        let logging = self.wirings(Capability::Logging, primary);
        let release_class = self.release_class(primary);

        info!(
            "Planning for {}:{} with {} offer(s), {} secondary model(s), {} release",
            main_controller,
            main_model,
            offers.len(),
            inputs.secondaries.len(),
            release_class
        );

        let mut plan = ActionPlan::new();
        self.deploy_proxies(&mut plan);

        for offer in &offers {
            plan.shell(format!(
                "juju consume {}:{} {}",
                cos.controller(),
                offer,
                offer.alias()
            ));
        }

        plan.shell(format!(
            "juju offer -c {main_controller} admin/{main_model}.{MONITORS_PROXY_APP}:monitors"
        ));
        plan.comment("wait for the model to settle").blank();

        warn_unconsumed(&offers, &[COS_DASHBOARDS_ALIAS, COS_METRICS_SCRAPE_ALIAS]);
        plan.shell(format!(
            "juju add-relation {PROXY_APP}:downstream-grafana-dashboard {COS_DASHBOARDS_ALIAS}:grafana-dashboard"
        ));
        plan.shell(format!(
            "juju add-relation {PROXY_APP}:downstream-prometheus-scrape {COS_METRICS_SCRAPE_ALIAS}:configurable-scrape-jobs"
        ));
        plan.blank();

        add_monitors(&mut plan, &monitors);
        plan.blank();

        for wiring in &dashboards {
            plan.shell(format!(
                "juju remove-relation {LEGACY_GRAFANA_ENDPOINT} {}",
                wiring.endpoint()
            ));
        }
        plan.blank();

        self.refresh_exporters(&mut plan);

        for wiring in &dashboards {
            plan.shell(format!(
                "juju add-relation {PROXY_APP}:dashboards {}",
                wiring.endpoint()
            ));
        }
        for wiring in &prometheus_targets {
            plan.shell(format!(
                "juju add-relation {PROXY_APP}:prometheus-target {}",
                wiring.endpoint()
            ));
        }
        plan.blank();

        if release_class == ReleaseClass::Legacy {
            warn_unconsumed(&offers, &[COS_LOGGING_ALIAS]);
            plan.shell(format!(
                "juju add-relation {PROXY_APP}:downstream-logging {COS_LOGGING_ALIAS}:logging"
            ));
            for wiring in &logging {
                plan.shell(format!(
                    "juju add-relation {PROXY_APP}:filebeat {}",
                    wiring.endpoint()
                ));
            }
            plan.blank();
        }

        for secondary in inputs.secondaries {
            let secondary_monitors = self.wirings(Capability::Monitoring, secondary);
            debug!(
                "Secondary model {}:{} has {} monitor(s)",
                secondary.controller(),
                secondary.model_name(),
                secondary_monitors.len()
            );

            plan.env("JUJU_CONTROLLER", secondary.controller())
                .env("JUJU_MODEL", secondary.model_name());
            plan.shell(format!(
                "juju consume {main_controller}:admin/{main_model}.{MONITORS_PROXY_APP} {MONITORS_PROXY_APP}"
            ));
            add_monitors(&mut plan, &secondary_monitors);
            plan.blank();
        }

        warn_unconsumed(&offers, &[COS_MONITORS_SCRAPE_ALIAS]);
        plan.comment(format!(
            "wait for `juju status | grep {MONITORS_PROXY_APP}` to be active/idle"
        ));
        plan.env("JUJU_CONTROLLER", main_controller)
            .env("JUJU_MODEL", main_model);
        plan.shell(format!(
            "juju add-relation {MONITORS_PROXY_APP}:downstream-prometheus-scrape {COS_MONITORS_SCRAPE_ALIAS}:configurable-scrape-jobs"
        ));

        Ok(plan)
    }

    fn deploy_proxies(&self, plan: &mut ActionPlan) {
        let opts = &self.options;
        let deploy = format!(
            "juju deploy {PROXY_CHARM} --channel {} --to {} --bind={} --series {}",
            opts.channel, opts.placement, opts.bind_space, opts.series
        );
        plan.shell(format!("{deploy} {MONITORS_PROXY_APP}"));
        plan.shell(deploy);
    }

    fn refresh_exporters(&self, plan: &mut ActionPlan) {
        plan.comment("wait for the model to settle").blank();
        for exporter in &self.options.exporters_to_refresh {
            plan.shell(format!(
                "juju refresh --switch ch:{exporter} --channel {} {exporter}",
                self.options.refresh_channel
            ));
        }
        plan.blank();
        plan.comment("wait for both cos-proxy units to settle").blank();
    }

    /// Majority release class of a model; models without machines count as modern
    fn release_class(&self, snapshot: &Snapshot) -> ReleaseClass {
        match resolve_mode(snapshot) {
            Some(release) => {
                let class = ReleaseClass::of(&release);
                info!(
                    "Majority release of {} is {} ({})",
                    snapshot.model_name(),
                    release,
                    class
                );
                class
            }
            None => {
                warn!(
                    "No machine releases found in {}, skipping legacy logging",
                    snapshot.model_name()
                );
                ReleaseClass::Modern
            }
        }
    }

    /// Classified applications of a capability paired with their relation
    ///
    /// Every token has a relation once [`PlanBuilder::new`] has validated the
    /// registries.
    fn wirings(&self, capability: Capability, snapshot: &Snapshot) -> Vec<Wiring> {
        let registry = self.registries.get(capability);
        let classification = self.classifier.classify(snapshot, registry);

        let mut wirings = Vec::with_capacity(classification.total());
        for (token, apps) in classification.iter() {
            let Some(relation) = registry.relation(token) else {
                continue;
            };
            wirings.extend(apps.iter().map(|app| Wiring {
                app: app.clone(),
                relation: relation.to_string(),
            }));
        }

        debug!(
            "{} {} application(s) in {}",
            wirings.len(),
            capability,
            snapshot.model_name()
        );
        wirings
    }
}

fn add_monitors(plan: &mut ActionPlan, monitors: &[Wiring]) {
    for wiring in monitors {
        plan.shell(format!(
            "juju add-relation {MONITORS_PROXY_APP}:monitors {}",
            wiring.endpoint()
        ));
    }
}

fn warn_unconsumed(offers: &[OfferReference], aliases: &[&str]) {
    for alias in aliases {
        if !offers.iter().any(|offer| offer.alias() == *alias) {
            warn!("Plan relates to {} but no matching COS offer was found", alias);
        }
    }
}
