use anyhow::{Context, Result};
use clap::Args;
use proxy_planner::{Classifier, MatchMode, PlanInputs};
use std::path::PathBuf;
use topology_config::{CapabilityRegistries, Snapshot, parser, registry};
use tracing::info;

pub mod plan;
pub mod validate;

/// Snapshot files shared by every command
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Juju status in yaml format from the COS model
    #[arg(short = 'c', long)]
    pub cos_jsfy: PathBuf,

    /// Juju status in yaml format from the main model
    #[arg(short = 'm', long)]
    pub main_jsfy: PathBuf,

    /// Juju status files in yaml format from secondary models, e.g. controller_jsfy,maas-infra_jsfy,lma_jsfy
    #[arg(short = 's', long)]
    pub secondary_jsfy_list: Option<String>,
}

impl SnapshotArgs {
    /// Secondary snapshot paths; empty entries such as `a,,b` or `a,` are ignored
    pub fn secondary_paths(&self) -> Vec<PathBuf> {
        self.secondary_jsfy_list
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

/// Capability registry selection
#[derive(Args, Debug)]
pub struct RegistryArgs {
    /// YAML file overriding the built-in capability registries
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,

    /// How registry tokens are matched against charm identities (substring, exact, pattern)
    #[arg(long, global = true, default_value_t = MatchMode::Substring)]
    pub match_mode: MatchMode,
}

/// Snapshots loaded for one run
pub struct LoadedSnapshots {
    pub cos: Snapshot,
    pub primary: Snapshot,
    pub secondaries: Vec<Snapshot>,
}

impl LoadedSnapshots {
    pub fn inputs(&self) -> PlanInputs<'_> {
        PlanInputs {
            cos: &self.cos,
            primary: &self.primary,
            secondaries: &self.secondaries,
        }
    }
}

/// Load every snapshot, failing on the first one that cannot be used
pub fn load_snapshots(args: &SnapshotArgs) -> Result<LoadedSnapshots> {
    let cos = parser::parse_file(&args.cos_jsfy).context("Failed to load COS snapshot")?;
    let primary = parser::parse_file(&args.main_jsfy).context("Failed to load main snapshot")?;

    let mut secondaries = Vec::new();
    for path in args.secondary_paths() {
        let snapshot = parser::parse_file(&path)
            .with_context(|| format!("Failed to load secondary snapshot {}", path.display()))?;
        secondaries.push(snapshot);
    }

    info!(
        "Loaded COS {}:{}, main {}:{} and {} secondary snapshot(s)",
        cos.controller(),
        cos.model_name(),
        primary.controller(),
        primary.model_name(),
        secondaries.len()
    );

    Ok(LoadedSnapshots {
        cos,
        primary,
        secondaries,
    })
}

/// Load the registries and the classifier that goes with them
pub fn load_registries(args: &RegistryArgs) -> Result<(CapabilityRegistries, Classifier)> {
    let registries = match &args.registry {
        Some(path) => {
            info!("Using capability registries from {}", path.display());
            registry::load_file(path).context("Failed to load capability registries")?
        }
        None => CapabilityRegistries::default(),
    };

    let classifier = Classifier::for_mode(args.match_mode, &registries)
        .context("Failed to set up application classifier")?;
    Ok((registries, classifier))
}
