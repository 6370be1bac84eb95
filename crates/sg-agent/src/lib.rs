//! # sg-agent
//!
//! Bounded delegated actor for Subscription Guardian.
//!
//! A [`DelegatedAgent`] wraps one requester identity and a shared
//! [`sg_policy::PolicyEngine`]. Every attempted action is forwarded to the
//! engine and the verdict translated into an execute-or-block
//! [`ActionOutcome`] — the actor never decides allow/deny itself.
//!
//! Action verbs form a closed set ([`AgentAction`]); an unrecognized verb
//! is an [`AgentError::InvalidRequest`] at the parsing boundary rather
//! than a silent fallthrough.

pub mod action;
pub mod actor;
pub mod error;

pub use action::AgentAction;
pub use actor::{ActionOutcome, DelegatedAgent};
pub use error::AgentError;
