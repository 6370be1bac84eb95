//! # sg-cli
//!
//! Command-line interface for Subscription Guardian.
//!
//! Drives the policy engine directly for inspection and demos:
//! - `sg resources` — list the subscription catalog
//! - `sg check cancel/delegation/spend` — evaluate a single request
//! - `sg demo owner/delegate` — run the scripted guardrail scenarios
//!
//! Every demo and check prints the decision reason verbatim; a blocked
//! action is a policy outcome, not an error, so the process still exits 0.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sg_mcp_gateway::GatewayConfig;
use sg_policy::{PolicyEngine, RuleStore};

/// Subscription Guardian CLI — evaluate and demo policy decisions.
#[derive(Parser)]
#[command(name = "sg", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Override the policy file location.
    #[arg(long)]
    policies: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the subscription catalog.
    Resources,
    /// Evaluate a single policy request.
    Check {
        #[command(subcommand)]
        command: commands::check::CheckCommands,
    },
    /// Run the scripted guardrail demo scenarios.
    Demo {
        #[command(subcommand)]
        command: commands::demo::DemoCommands,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);

    let mut config = GatewayConfig::for_project(&project_root);
    if let Some(policies) = cli.policies {
        config.policy_file = policies;
    }

    let engine = PolicyEngine::new(RuleStore::load_or_default(&config.policy_file));

    match &cli.command {
        Commands::Resources => commands::resources::execute(&engine),
        Commands::Check { command } => commands::check::execute(command, &engine),
        Commands::Demo { command } => commands::demo::execute(command, engine, &config),
    }
}
