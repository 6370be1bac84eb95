// config.rs — Gateway configuration.
//
// GatewayConfig locates the policy file and seeds the finance vault.
// The `for_project()` constructor generates sensible defaults under a
// `config/` directory in the project root, matching the policy file
// layout the CLI and daemon both expect.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for the MCP gateway server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Path to the YAML policy file (rules + resource catalog).
    pub policy_file: PathBuf,

    /// Opening balance for the finance vault.
    pub opening_balance: f64,

    /// Merchants the vault may pay.
    pub allowed_merchants: Vec<String>,

    /// Per-transaction safety limit for the vault.
    pub max_tx_limit: f64,
}

impl GatewayConfig {
    /// Create a config with the standard layout for a project.
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        let root = project_root.as_ref().to_path_buf();
        Self {
            policy_file: root.join("config").join("policies.yaml"),
            opening_balance: 50_000.0,
            allowed_merchants: vec![
                "Adani Electricity".to_string(),
                "Jio Fiber".to_string(),
                "HDFC Credit Card".to_string(),
                "Netflix".to_string(),
            ],
            max_tx_limit: 5_000.0,
        }
    }
}
