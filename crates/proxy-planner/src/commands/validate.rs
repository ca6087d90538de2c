use anyhow::Result;
use proxy_planner::{Classifier, ReleaseClass, resolve_mode, resolve_offers};
use topology_config::{Capability, CapabilityRegistries, Snapshot};

use super::{RegistryArgs, SnapshotArgs};

pub fn run(registry: &RegistryArgs, snapshots: &SnapshotArgs) -> Result<()> {
    let (registries, classifier) = super::load_registries(registry)?;
    let loaded = super::load_snapshots(snapshots)?;

    println!("✓ Snapshots valid");
    println!("  Match mode: {}", registry.match_mode);

    print_snapshot("COS", &loaded.cos);
    let offers = resolve_offers(&loaded.cos);
    println!("  Consumable offers: {}", offers.len());
    for offer in &offers {
        println!("    - {} as {}", offer, offer.alias());
    }

    print_snapshot("Main", &loaded.primary);
    match resolve_mode(&loaded.primary) {
        Some(release) => println!(
            "  Majority release: {} ({})",
            release,
            ReleaseClass::of(&release)
        ),
        None => println!("  ⚠ No machine reports a release"),
    }
    print_classification(&classifier, &registries, &loaded.primary, &Capability::ALL);

    for secondary in &loaded.secondaries {
        print_snapshot("Secondary", secondary);
        print_classification(
            &classifier,
            &registries,
            secondary,
            &[Capability::Monitoring],
        );
    }

    Ok(())
}

fn print_snapshot(role: &str, snapshot: &Snapshot) {
    println!(
        "{} model {}:{}",
        role,
        snapshot.controller(),
        snapshot.model_name()
    );
    println!("  Machines: {}", snapshot.machines().len());
    println!("  Applications: {}", snapshot.applications().len());
    println!("  Offers: {}", snapshot.offers().len());
}

fn print_classification(
    classifier: &Classifier,
    registries: &CapabilityRegistries,
    snapshot: &Snapshot,
    capabilities: &[Capability],
) {
    for &capability in capabilities {
        let classification = classifier.classify(snapshot, registries.get(capability));
        let apps: Vec<&str> = classification
            .iter()
            .flat_map(|(_, apps)| apps.iter().map(String::as_str))
            .collect();

        if apps.is_empty() {
            println!("  {}: none", capability);
        } else {
            println!("  {}: {}", capability, apps.join(", "));
        }
    }
}
