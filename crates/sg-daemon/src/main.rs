//! # sg-daemon
//!
//! Subscription Guardian MCP server daemon.
//!
//! Starts an MCP server on stdio that any MCP client connects to. Every
//! sensitive tool call flows through the gateway's policy engine and is
//! recorded in the audit log.
//!
//! ## Usage
//!
//! Typically started automatically by the MCP client via `.mcp.json`:
//! ```json
//! {
//!   "mcpServers": {
//!     "subscription-guardian": {
//!       "type": "stdio",
//!       "command": "cargo",
//!       "args": ["run", "-p", "sg-daemon"]
//!     }
//!   }
//! }
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

use sg_mcp_gateway::{GatewayConfig, SgGatewayServer};

/// Subscription Guardian MCP server.
#[derive(Parser)]
#[command(name = "sg-daemon", about = "Subscription Guardian MCP server")]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Override the policy file location.
    #[arg(long)]
    policies: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they don't interfere with MCP on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sg_policy=info".parse()?)
                .add_directive("sg_mcp_gateway=info".parse()?)
                .add_directive("sg_daemon=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);

    let mut config = GatewayConfig::for_project(&project_root);
    if let Some(policies) = cli.policies {
        config.policy_file = policies;
    }

    tracing::info!("Starting Subscription Guardian MCP server");
    tracing::info!("Policy file: {}", config.policy_file.display());

    let server = SgGatewayServer::new(config);

    tracing::info!("MCP server ready, waiting for client connection");

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .inspect_err(|e| tracing::error!("serving error: {:?}", e))?;

    service.waiting().await?;

    tracing::info!("MCP server shutting down");
    Ok(())
}
