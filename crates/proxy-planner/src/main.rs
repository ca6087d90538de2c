use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

mod commands;

use commands::{RegistryArgs, SnapshotArgs, plan::PlanArgs};

#[derive(Parser)]
#[command(name = "deploy-cos-proxy")]
#[command(about = "COS proxy planner - prints the Juju operations that wire cos-proxy into a deployment")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    registry: RegistryArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the action plan
    Plan {
        #[command(flatten)]
        snapshots: SnapshotArgs,

        #[command(flatten)]
        args: PlanArgs,
    },

    /// Load and summarize snapshots without printing a plan
    Validate {
        #[command(flatten)]
        snapshots: SnapshotArgs,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Stdout carries the plan only
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Plan { snapshots, args } => commands::plan::run(&cli.registry, &snapshots, &args),
        Commands::Validate { snapshots } => commands::validate::run(&cli.registry, &snapshots),
    }
}
