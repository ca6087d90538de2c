//! End-to-end plan generation tests

use proxy_planner::{
    ActionStep, Classifier, PlanBuilder, PlanInputs, PlanOptions, ReleaseClass, classifier::Exact,
    resolve_mode, resolve_offers,
};
use std::collections::HashSet;
use topology_config::{CapabilityRegistries, Snapshot};

mod common;
use common::{COS_STATUS, INFRA_STATUS, LMA_STATUS, MAIN_STATUS, main_status_with_release, snapshot};

fn builder() -> PlanBuilder {
    PlanBuilder::new(CapabilityRegistries::default(), PlanOptions::new("lxd:0")).unwrap()
}

fn render(cos: &Snapshot, primary: &Snapshot, secondaries: &[Snapshot]) -> String {
    builder()
        .build(&PlanInputs {
            cos,
            primary,
            secondaries,
        })
        .unwrap()
        .render()
}

#[test]
fn test_full_plan_for_legacy_cloud_with_secondary() {
    let cos = snapshot(COS_STATUS);
    let primary = snapshot(MAIN_STATUS);
    let secondaries = [snapshot(INFRA_STATUS)];

    let expected = [
        "juju deploy ch:cos-proxy --channel edge --to lxd:0 --bind=oam-space --series jammy cos-proxy-monitors",
        "juju deploy ch:cos-proxy --channel edge --to lxd:0 --bind=oam-space --series jammy",
        "juju consume microk8s:admin/cos.grafana-dashboards cos-grafana-dashboards",
        "juju consume microk8s:admin/cos.loki-logging cos-loki-logging",
        "juju consume microk8s:admin/cos.prometheus-receive-remote-write cos-prometheus-receive-remote-write",
        "juju consume microk8s:admin/cos.scrape-interval-config-metrics cos-scrape-interval-config-metrics",
        "juju consume microk8s:admin/cos.scrape-interval-config-monitors cos-scrape-interval-config-monitors",
        "juju offer -c foundations-maas admin/openstack.cos-proxy-monitors:monitors",
        "# wait for the model to settle",
        "",
        "juju add-relation cos-proxy:downstream-grafana-dashboard cos-grafana-dashboards:grafana-dashboard",
        "juju add-relation cos-proxy:downstream-prometheus-scrape cos-scrape-interval-config-metrics:configurable-scrape-jobs",
        "",
        "juju add-relation cos-proxy-monitors:monitors nrpe-host:monitors",
        "juju add-relation cos-proxy-monitors:monitors nrpe-container:monitors",
        "",
        "juju remove-relation grafana:dashboards telegraf:dashboards",
        "juju remove-relation grafana:dashboards grok:dashboards",
        "",
        "# wait for the model to settle",
        "",
        "juju refresh --switch ch:prometheus-grok-exporter --channel latest/stable prometheus-grok-exporter",
        "juju refresh --switch ch:prometheus-libvirt-exporter --channel latest/stable prometheus-libvirt-exporter",
        "juju refresh --switch ch:prometheus-openstack-exporter --channel latest/stable prometheus-openstack-exporter",
        "",
        "# wait for both cos-proxy units to settle",
        "",
        "juju add-relation cos-proxy:dashboards telegraf:dashboards",
        "juju add-relation cos-proxy:dashboards grok:dashboards",
        "juju add-relation cos-proxy:prometheus-target telegraf:prometheus-client",
        "juju add-relation cos-proxy:prometheus-target ceph-mon:prometheus",
        "juju add-relation cos-proxy:prometheus-target grok:prometheus-client",
        "",
        "juju add-relation cos-proxy:downstream-logging cos-loki-logging:logging",
        "juju add-relation cos-proxy:filebeat filebeat:logstash",
        "",
        "export JUJU_CONTROLLER=infra",
        "export JUJU_MODEL=maas-infra",
        "juju consume foundations-maas:admin/openstack.cos-proxy-monitors cos-proxy-monitors",
        "juju add-relation cos-proxy-monitors:monitors nrpe-infra:monitors",
        "",
        "# wait for `juju status | grep cos-proxy-monitors` to be active/idle",
        "export JUJU_CONTROLLER=foundations-maas",
        "export JUJU_MODEL=openstack",
        "juju add-relation cos-proxy-monitors:downstream-prometheus-scrape cos-scrape-interval-config-monitors:configurable-scrape-jobs",
    ]
    .join("\n");

    assert_eq!(render(&cos, &primary, &secondaries), expected);
}

#[test]
fn test_legacy_logging_depends_on_majority_release() {
    let cos = snapshot(COS_STATUS);

    let bionic = snapshot(MAIN_STATUS);
    assert_eq!(resolve_mode(&bionic).as_deref(), Some("bionic"));
    let legacy = render(&cos, &bionic, &[]);
    assert!(legacy.contains("cos-proxy:downstream-logging cos-loki-logging:logging"));
    assert!(legacy.contains("cos-proxy:filebeat filebeat:logstash"));

    let jammy = snapshot(&main_status_with_release("jammy"));
    assert_eq!(
        ReleaseClass::of(&resolve_mode(&jammy).unwrap()),
        ReleaseClass::Modern
    );
    let modern = render(&cos, &jammy, &[]);
    assert!(!modern.contains("downstream-logging"));
    assert!(!modern.contains("cos-proxy:filebeat"));

    // Repeated invocations are identical
    assert_eq!(render(&cos, &bionic, &[]), legacy);
    assert_eq!(render(&cos, &jammy, &[]), modern);
}

#[test]
fn test_no_secondary_blocks_without_secondaries() {
    let cos = snapshot(COS_STATUS);
    let primary = snapshot(MAIN_STATUS);
    let plan = render(&cos, &primary, &[]);

    // Only the trailing reassertion for the main model
    let controllers: Vec<_> = plan
        .lines()
        .filter(|line| line.starts_with("export JUJU_CONTROLLER="))
        .collect();
    assert_eq!(controllers, vec!["export JUJU_CONTROLLER=foundations-maas"]);
    assert!(!plan.contains("juju consume foundations-maas:"));
}

#[test]
fn test_each_secondary_gets_its_own_block() {
    let cos = snapshot(COS_STATUS);
    let primary = snapshot(MAIN_STATUS);
    let secondaries = [snapshot(INFRA_STATUS), snapshot(LMA_STATUS)];
    let plan = builder()
        .build(&PlanInputs {
            cos: &cos,
            primary: &primary,
            secondaries: &secondaries,
        })
        .unwrap();

    let steps = plan.steps();
    let consume = ActionStep::Shell {
        command: "juju consume foundations-maas:admin/openstack.cos-proxy-monitors cos-proxy-monitors"
            .to_string(),
    };
    let blocks: Vec<usize> = steps
        .iter()
        .enumerate()
        .filter(|(_, step)| **step == consume)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(blocks.len(), 2);

    let block_lines = |start: usize| -> Vec<String> {
        steps[start - 2..]
            .iter()
            .take_while(|step| **step != ActionStep::Blank)
            .map(ToString::to_string)
            .collect()
    };

    assert_eq!(
        block_lines(blocks[0]),
        vec![
            "export JUJU_CONTROLLER=infra",
            "export JUJU_MODEL=maas-infra",
            "juju consume foundations-maas:admin/openstack.cos-proxy-monitors cos-proxy-monitors",
            "juju add-relation cos-proxy-monitors:monitors nrpe-infra:monitors",
        ]
    );
    assert_eq!(
        block_lines(blocks[1]),
        vec![
            "export JUJU_CONTROLLER=foundations-maas",
            "export JUJU_MODEL=lma",
            "juju consume foundations-maas:admin/openstack.cos-proxy-monitors cos-proxy-monitors",
            "juju add-relation cos-proxy-monitors:monitors nrpe-lma:monitors",
            "juju add-relation cos-proxy-monitors:monitors nrpe-lma-container:monitors",
        ]
    );
}

#[test]
fn test_offer_alias_is_consistent() {
    let cos = snapshot(
        r#"
model: {name: cos, controller: microk8s}
machines: {}
applications: {}
offers:
  grafana-dashboards:
    endpoints:
      grafana-dashboard: {interface: grafana_dashboard}
"#,
    );
    let primary = snapshot(MAIN_STATUS);
    let plan = render(&cos, &primary, &[]);

    let consumes: Vec<_> = plan.lines().filter(|l| l.starts_with("juju consume")).collect();
    assert_eq!(
        consumes,
        vec!["juju consume microk8s:admin/cos.grafana-dashboards cos-grafana-dashboards"]
    );
    assert!(plan.contains(
        "juju add-relation cos-proxy:downstream-grafana-dashboard cos-grafana-dashboards:grafana-dashboard"
    ));
}

#[test]
fn test_offer_with_several_interfaces_is_consumed_once() {
    let cos = snapshot(
        r#"
model: {name: cos, controller: microk8s}
machines: {}
applications: {}
offers:
  prometheus:
    endpoints:
      metrics-endpoint: {interface: prometheus_scrape}
      receive-remote-write: {interface: prometheus_remote_write}
"#,
    );
    let offers = resolve_offers(&cos);
    let names: HashSet<_> = offers.iter().map(|o| o.offer.clone()).collect();
    assert_eq!(names.len(), offers.len());

    let plan = render(&cos, &snapshot(MAIN_STATUS), &[]);
    let consumes = plan
        .lines()
        .filter(|l| l.starts_with("juju consume microk8s:admin/cos.prometheus "))
        .count();
    assert_eq!(consumes, 1);
}

#[test]
fn test_output_is_deterministic() {
    let cos = snapshot(COS_STATUS);
    let primary = snapshot(MAIN_STATUS);
    let secondaries = [snapshot(LMA_STATUS), snapshot(INFRA_STATUS)];

    let first = render(&cos, &primary, &secondaries);
    let second = render(
        &snapshot(COS_STATUS),
        &snapshot(MAIN_STATUS),
        &[snapshot(LMA_STATUS), snapshot(INFRA_STATUS)],
    );
    assert_eq!(first, second);
}

#[test]
fn test_exact_classifier_changes_wiring_only() {
    let cos = snapshot(COS_STATUS);
    let primary = snapshot(
        r#"
model: {name: openstack, controller: maas}
machines:
  "0": {series: jammy}
applications:
  ceph-mon:
    charm: ch:ceph-mon-109
  ceph-mon-exporter:
    charm: ch:ceph-mon-exporter-2
"#,
    );
    let inputs = PlanInputs {
        cos: &cos,
        primary: &primary,
        secondaries: &[],
    };

    let substring = builder().build(&inputs).unwrap().render();
    assert!(substring.contains("cos-proxy:prometheus-target ceph-mon-exporter:prometheus"));

    let exact = builder()
        .with_classifier(Classifier::new(Exact))
        .build(&inputs)
        .unwrap()
        .render();
    assert!(exact.contains("cos-proxy:prometheus-target ceph-mon:prometheus"));
    assert!(!exact.contains("ceph-mon-exporter"));
}
