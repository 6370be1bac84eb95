// store.rs — The active rule set and its atomic reload.
//
// The store hands out Arc snapshots of the current RuleSet. Evaluations
// clone the Arc once up front and run entirely against that snapshot, so
// a reload mid-evaluation is invisible: readers see the fully-old or the
// fully-new rule set, never a mix.
//
// Reload is the only I/O-bearing operation in the crate and is meant for
// explicit admin triggers, not the request path.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::config::PolicyConfig;
use crate::error::ConfigError;
use crate::rules::{Resource, RuleSet};

/// Holds the active RuleSet and swaps it wholesale on reload.
pub struct RuleStore {
    active: RwLock<Arc<RuleSet>>,
    source: Option<PathBuf>,
}

impl RuleStore {
    /// Build a store around an in-memory rule set (tests, embedding).
    /// Such a store has no backing file; `reload` returns `NoSource`.
    pub fn from_rules(rules: RuleSet) -> Self {
        Self {
            active: RwLock::new(Arc::new(rules)),
            source: None,
        }
    }

    /// Load the policy file, falling back to the empty rule set on any
    /// failure. The empty rule set denies every delegated or owner action
    /// beyond basic lookup, so a broken config can only ever under-grant.
    pub fn load_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let rules = match PolicyConfig::load(&path) {
            Ok(config) => config.compile(),
            Err(error) => {
                tracing::error!(%error, "failed to load policies; using empty rule set");
                RuleSet::default()
            }
        };
        Self {
            active: RwLock::new(Arc::new(rules)),
            source: Some(path),
        }
    }

    /// The current rule set snapshot.
    pub fn snapshot(&self) -> Arc<RuleSet> {
        match self.active.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Look up a resource in the current snapshot.
    pub fn find_resource(&self, id: &str) -> Option<Resource> {
        self.snapshot().find_resource(id).cloned()
    }

    /// Re-read the backing file and swap the active rule set atomically.
    ///
    /// On failure the empty rule set is installed (same fail-closed
    /// contract as load) and the error is returned to the caller, who is
    /// an admin surface, not a requester.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.source else {
            return Err(ConfigError::NoSource);
        };
        match PolicyConfig::load(path) {
            Ok(config) => {
                self.install(config.compile());
                tracing::info!(path = %path.display(), "policies reloaded");
                Ok(())
            }
            Err(error) => {
                tracing::error!(%error, "reload failed; installing empty rule set");
                self.install(RuleSet::default());
                Err(error)
            }
        }
    }

    /// Swap in a new rule set. Evaluations already holding a snapshot
    /// continue against it.
    pub fn install(&self, rules: RuleSet) {
        let next = Arc::new(rules);
        match self.active.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
