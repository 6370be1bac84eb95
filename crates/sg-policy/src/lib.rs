//! # sg-policy
//!
//! Policy decision engine for Subscription Guardian.
//!
//! Before an agent — acting as the account owner or as a bounded delegate —
//! may execute a sensitive action (cancel a subscription, spend money,
//! access a resource), the [`PolicyEngine`] evaluates the request against
//! declarative rules and returns a [`Decision`]: an allow/deny verdict with
//! a human-readable justification, recorded in an append-only [`AuditLog`].
//!
//! ## Key invariants
//!
//! - **Denials are data, not errors**: not-found, expired, blocked, and
//!   unauthorized outcomes are all denied Decisions. Callers never need
//!   error handling to interpret a normal denial.
//! - **Fail closed**: a missing or malformed policy file degrades to the
//!   empty rule set (deny everything beyond lookup), a delegate without a
//!   spending limit may spend nothing, and a malformed expiry timestamp
//!   makes its grant permanently expired.
//! - **Every evaluation is audited**: each entry point appends exactly one
//!   Decision to the audit log, denials and failed lookups included.
//! - **Snapshot isolation**: evaluations run against one immutable rule-set
//!   snapshot; reload swaps the active set atomically.

pub mod audit;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod rules;
pub mod store;

pub use audit::{AuditLog, AuditQuery, AuditRecord};
pub use config::PolicyConfig;
pub use decision::Decision;
pub use engine::{PolicyEngine, OWNER_IDENTITY};
pub use error::{AuditError, ConfigError};
pub use rules::{DelegationGrant, ExpiryPolicy, GlobalRules, OwnerRules, Resource, RuleSet};
pub use store::RuleStore;
