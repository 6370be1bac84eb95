// error.rs — Error types for the MCP gateway.

use thiserror::Error;

/// Errors that can occur during MCP gateway operations.
///
/// Policy denials never appear here — they cross the boundary as
/// structured "blocked" results so MCP clients can surface the reason.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Reloading the policy file failed (empty rules are now active).
    #[error("policy reload failed: {0}")]
    Reload(#[from] sg_policy::ConfigError),
}
