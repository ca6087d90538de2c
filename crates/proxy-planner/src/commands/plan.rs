use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use proxy_planner::{PlanBuilder, PlanOptions};
use std::io::Write;

use super::{RegistryArgs, SnapshotArgs};

/// Output format of the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One operation per line
    Text,
    /// JSON array of steps
    Json,
}

/// Proxy deployment options
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Where to deploy the cos-proxies (i.e. lxd:0)
    #[arg(short = 't', long)]
    pub to_cos_proxy: String,

    /// Channel of the cos-proxy charm
    #[arg(long, default_value = "edge")]
    pub cos_proxy_channel: String,

    /// Series the cos-proxies are deployed on
    #[arg(long, default_value = "jammy")]
    pub series: String,

    /// Space the cos-proxies bind to
    #[arg(long, default_value = "oam-space")]
    pub bind: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(registry: &RegistryArgs, snapshots: &SnapshotArgs, args: &PlanArgs) -> Result<()> {
    let (registries, classifier) = super::load_registries(registry)?;
    let loaded = super::load_snapshots(snapshots)?;

    let options = PlanOptions::new(args.to_cos_proxy.as_str())
        .with_channel(args.cos_proxy_channel.as_str())
        .with_series(args.series.as_str())
        .with_bind_space(args.bind.as_str());

    let plan = PlanBuilder::new(registries, options)
        .context("Invalid capability registries")?
        .with_classifier(classifier)
        .build(&loaded.inputs())
        .context("Failed to build action plan")?;

    let output = match args.format {
        OutputFormat::Text => plan.render(),
        OutputFormat::Json => plan.to_json().context("Failed to serialize action plan")?,
    };

    // Nothing reaches stdout until the whole plan is built
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")?;
    stdout.flush()?;
    Ok(())
}
