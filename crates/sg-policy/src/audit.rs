// audit.rs — In-memory append-only audit log.
//
// Every Decision the engine produces is appended here, including denials
// and not-found lookups. Entries are hash-chained: each record stores the
// SHA-256 of the previous record's canonical line, so any out-of-band
// mutation of the sequence is detectable with verify_chain().
//
// The log spans one engine instance's lifetime and is never persisted or
// evicted. Appends are mutex-guarded so concurrent evaluations interleave
// safely; a query never observes a partially-appended entry.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::decision::Decision;
use crate::error::AuditError;

/// One audit entry: a Decision plus its chain link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditRecord {
    /// The decision as produced by the engine.
    pub decision: Decision,
    /// Hash of the previous record's canonical line. None for the first.
    pub previous_hash: Option<String>,
}

/// Filter for querying the audit log. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Match a specific requester identity.
    pub requester: Option<String>,
    /// Match a specific action string.
    pub action: Option<String>,
    /// Match the verdict (true = allowed, false = denied).
    pub allowed: Option<bool>,
    /// Only decisions at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Only decisions at or before this instant.
    pub until: Option<DateTime<Utc>>,
}

impl AuditQuery {
    fn matches(&self, record: &AuditRecord) -> bool {
        let d = &record.decision;
        self.requester.as_deref().is_none_or(|r| r == d.requester)
            && self.action.as_deref().is_none_or(|a| a == d.action)
            && self.allowed.is_none_or(|a| a == d.allowed)
            && self.since.is_none_or(|t| d.timestamp >= t)
            && self.until.is_none_or(|t| d.timestamp <= t)
    }
}

#[derive(Default)]
struct Chain {
    records: Vec<AuditRecord>,
    last_hash: Option<String>,
}

/// The append-only, in-memory audit log.
pub struct AuditLog {
    inner: Mutex<Chain>,
}

impl AuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Chain::default()),
        }
    }

    /// Append a decision. The only write operation; entries are never
    /// removed or mutated afterwards.
    pub fn append(&self, decision: Decision) {
        let mut chain = self.lock();
        let record = AuditRecord {
            previous_hash: chain.last_hash.clone(),
            decision,
        };
        chain.last_hash = Some(hash_line(&record.decision.canonical_line()));
        chain.records.push(record);
    }

    /// Number of entries recorded so far. Never decreases.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Whether anything has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// A copy of every entry, in append order.
    pub fn snapshot(&self) -> Vec<AuditRecord> {
        self.lock().records.clone()
    }

    /// The most recent `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> Vec<AuditRecord> {
        let chain = self.lock();
        let skip = chain.records.len().saturating_sub(n);
        chain.records[skip..].to_vec()
    }

    /// Entries matching the filter, in append order.
    pub fn query(&self, query: &AuditQuery) -> Vec<AuditRecord> {
        self.lock()
            .records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect()
    }

    /// Verify that every entry links to its predecessor.
    pub fn verify_chain(&self) -> Result<(), AuditError> {
        let chain = self.lock();
        let mut expected: Option<String> = None;
        for (index, record) in chain.records.iter().enumerate() {
            if record.previous_hash != expected {
                return Err(AuditError::ChainBroken {
                    index,
                    expected,
                    actual: record.previous_hash.clone(),
                });
            }
            expected = Some(hash_line(&record.decision.canonical_line()));
        }
        Ok(())
    }

    /// Acquire the chain lock. A poisoned lock still holds structurally
    /// valid data, and appends must never be dropped, so recover it.
    fn lock(&self) -> std::sync::MutexGuard<'_, Chain> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase hex SHA-256 of a canonical record line.
fn hash_line(line: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(line.as_bytes());
    format!("{:x}", hasher.finalize())
}
