//! Common fixtures and helpers for proxy-planner integration tests

#![allow(dead_code)]

use anyhow::Result;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use tempfile::TempDir;
use topology_config::{Snapshot, parser};

/// COS model with the offers the proxy consumes, plus one it does not need
pub const COS_STATUS: &str = r#"
model:
  name: cos
  type: caas
  controller: microk8s
  cloud: microk8s
machines: {}
applications:
  grafana:
    charm: grafana-k8s
  loki:
    charm: loki-k8s
offers:
  grafana-dashboards:
    application: grafana
    charm: ch:grafana-k8s-64
    endpoints:
      grafana-dashboard:
        interface: grafana_dashboard
        role: requirer
  loki-logging:
    application: loki
    endpoints:
      logging:
        interface: loki_push_api
        role: provider
  prometheus-receive-remote-write:
    application: prometheus
    endpoints:
      receive-remote-write:
        interface: prometheus_remote_write
        role: provider
  alertmanager-karma-dashboard:
    application: alertmanager
    endpoints:
      karma-dashboard:
        interface: karma_dashboard
        role: provider
  scrape-interval-config-metrics:
    application: scrape-interval-config-metrics
    endpoints:
      configurable-scrape-jobs:
        interface: prometheus_scrape
        role: provider
  scrape-interval-config-monitors:
    application: scrape-interval-config-monitors
    endpoints:
      configurable-scrape-jobs:
        interface: prometheus_scrape
        role: provider
"#;

/// Main model whose machines mostly run bionic
pub const MAIN_STATUS: &str = r#"
model:
  name: openstack
  type: iaas
  controller: foundations-maas
  cloud: maas_cloud
machines:
  "2":
    series: focal
  "0":
    series: bionic
    containers:
      0/lxd/0:
        series: focal
      0/lxd/1:
        series: focal
  "1":
    series: bionic
applications:
  nrpe-host:
    charm: nrpe
  telegraf:
    charm: ch:amd64/bionic/telegraf-75
  ceph-mon:
    charm: ch:amd64/bionic/ceph-mon-109
  grok:
    charm: ch:prometheus-grok-exporter-12
  keystone:
    charm: ch:keystone-600
  nrpe-container:
    charm: cs:nrpe-73
  filebeat:
    charm: cs:filebeat-40
"#;

/// Secondary model with its own NRPE application
pub const INFRA_STATUS: &str = r#"
model:
  name: maas-infra
  controller: infra
machines:
  "0":
    series: focal
applications:
  nrpe-infra:
    charm: ch:nrpe-94
  telegraf-infra:
    charm: ch:telegraf-75
"#;

/// Secondary model on the main controller
pub const LMA_STATUS: &str = r#"
model:
  name: lma
  controller: foundations-maas
machines:
  "0":
    series: bionic
applications:
  nrpe-lma:
    charm: nrpe
  nrpe-lma-container:
    charm: nrpe
"#;

/// Main model status with every machine release replaced
pub fn main_status_with_release(release: &str) -> String {
    MAIN_STATUS.replace("bionic", release)
}

/// Parse a fixture
pub fn snapshot(yaml: &str) -> Snapshot {
    parser::parse_str(yaml).expect("fixture should parse")
}

/// Snapshot files written to a temporary directory
pub struct Fixtures {
    pub dir: TempDir,
}

impl Fixtures {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Write a fixture file and return its path
    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Path of a file that does not exist
    pub fn missing(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Output of a CLI invocation
#[derive(Debug)]
pub struct CliOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliOutput {
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.status.success(),
            "Command failed with status {:?}\nstdout: {}\nstderr: {}",
            self.status,
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.status.success(),
            "Command unexpectedly succeeded\nstdout: {}",
            self.stdout
        );
        self
    }

    pub fn assert_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nstdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nstderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// Run the planner binary
pub fn run_cli(args: &[&str]) -> Result<CliOutput> {
    let output = Command::new(env!("CARGO_BIN_EXE_deploy-cos-proxy"))
        .args(args)
        .output()?;

    Ok(CliOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}
