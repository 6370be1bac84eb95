// error.rs — Error types for the policy subsystem.
//
// Security outcomes (not found, expired, blocked, unauthorized) are never
// errors — they are denied Decisions. Only infrastructure failures live
// here, and even those are recovered to deny-by-default where a decision
// must still be produced.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading the policy configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The policy file could not be read.
    #[error("failed to read policy file at {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The policy file is not valid YAML for the expected structure.
    #[error("malformed policy file at {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Reload was requested on a store that has no backing file.
    #[error("rule store has no configuration source to reload from")]
    NoSource,
}

/// Errors that can occur during audit log inspection.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The in-memory hash chain does not link up — entries were tampered
    /// with through means outside the append-only API.
    #[error("audit chain broken at entry {index}: expected {expected:?}, got {actual:?}")]
    ChainBroken {
        index: usize,
        expected: Option<String>,
        actual: Option<String>,
    },
}
