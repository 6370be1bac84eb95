// error.rs — Error types for the actor subsystem.

use thiserror::Error;

/// Errors that can occur when driving a delegated actor.
///
/// Policy denials are never errors — they come back as
/// [`crate::ActionOutcome::Blocked`]. The only error here marks a
/// programming or integration mistake, not a policy outcome.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The action verb is not one the dispatcher recognizes.
    #[error("unrecognized action '{action}'")]
    InvalidRequest { action: String },
}
