// decision.rs — The engine's sole output type.
//
// Every evaluation produces exactly one Decision; the engine appends it to
// the audit log and returns it to the caller. Decisions are immutable once
// constructed and fully flat-serializable, so they cross the tool-serving
// boundary as a plain record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An allow/deny verdict with a human-readable justification.
///
/// The `reason` string is not machine-parsed, but it is stable per cause —
/// tests (and operators reading the audit log) can match on its prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    /// Unique identifier for this decision.
    pub decision_id: Uuid,

    /// Whether the requested action may proceed.
    pub allowed: bool,

    /// Human-readable justification, surfaced verbatim to the requester.
    pub reason: String,

    /// The action that was evaluated (e.g., "cancel", "spend", "access").
    pub action: String,

    /// The resource the action targeted. None for actions that are not
    /// resource-scoped (e.g., spend).
    pub resource_id: Option<String>,

    /// Who requested the action ("owner" or a delegate identity).
    pub requester: String,

    /// When the decision was made (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Decision {
    /// Construct an allow verdict.
    pub fn allow(
        action: &str,
        resource_id: Option<&str>,
        requester: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(true, action, resource_id, requester, reason)
    }

    /// Construct a deny verdict.
    pub fn deny(
        action: &str,
        resource_id: Option<&str>,
        requester: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(false, action, resource_id, requester, reason)
    }

    fn new(
        allowed: bool,
        action: &str,
        resource_id: Option<&str>,
        requester: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            decision_id: Uuid::new_v4(),
            allowed,
            reason: reason.into(),
            action: action.to_string(),
            resource_id: resource_id.map(str::to_string),
            requester: requester.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// A stable single-line rendering used for audit hash chaining.
    ///
    /// Field order is fixed; changing it invalidates existing chains.
    pub(crate) fn canonical_line(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.decision_id,
            self.allowed,
            self.action,
            self.resource_id.as_deref().unwrap_or(""),
            self.requester,
            self.timestamp.to_rfc3339(),
            self.reason,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_and_deny_set_the_verdict() {
        let a = Decision::allow("cancel", Some("sub_001"), "owner", "ok");
        assert!(a.allowed);
        assert_eq!(a.resource_id.as_deref(), Some("sub_001"));

        let d = Decision::deny("spend", None, "roommate", "over limit");
        assert!(!d.allowed);
        assert!(d.resource_id.is_none());
    }

    #[test]
    fn decision_ids_are_unique() {
        let a = Decision::allow("access", Some("sub_001"), "roommate", "ok");
        let b = Decision::allow("access", Some("sub_001"), "roommate", "ok");
        assert_ne!(a.decision_id, b.decision_id);
    }

    #[test]
    fn serializes_as_a_flat_record() {
        // The tool-serving boundary requires a flat (key, scalar) record.
        let decision = Decision::deny("cancel", Some("sub_003"), "roommate", "blocked");
        let json = serde_json::to_value(&decision).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj["allowed"].is_boolean());
        assert!(obj["reason"].is_string());
        assert!(obj["action"].is_string());
        assert!(obj["resource_id"].is_string());
        assert!(obj["requester"].is_string());
        assert!(obj["timestamp"].is_string());
    }

    #[test]
    fn null_resource_id_serializes_as_null() {
        let decision = Decision::allow("spend", None, "owner", "ok");
        let json = serde_json::to_value(&decision).unwrap();
        assert!(json["resource_id"].is_null());
    }

    #[test]
    fn canonical_line_is_deterministic() {
        let decision = Decision::allow("cancel", Some("sub_001"), "owner", "ok");
        assert_eq!(decision.canonical_line(), decision.canonical_line());
    }
}
