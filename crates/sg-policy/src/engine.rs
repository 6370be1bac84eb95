// engine.rs — Policy evaluation engine.
//
// The PolicyEngine is the one component that encodes authorization logic.
// Every entry point resolves the resource, selects the applicable rules by
// requester identity, applies ordered checks, and produces exactly one
// Decision — appended to the audit log before it is returned, on every
// path including failed lookups.
//
// Check order is part of the contract:
//   cancel (owner):  not-found > category block > amount block > allow
//   delegation:      not-found > no-policy > expired > whitelist-miss > allow
//   spend (owner):   confirmation threshold > allow
//   spend (delegate): no-policy > expired > amount limit > allow
//
// The engine is stateless across calls. Each evaluation runs against one
// rule-set snapshot; the audit append is its only side effect.

use chrono::Utc;

use crate::audit::AuditLog;
use crate::decision::Decision;
use crate::error::ConfigError;
use crate::rules::RuleSet;
use crate::store::RuleStore;

/// The requester identity that owner rules apply to. Every other identity
/// is a delegate and is bounded purely by its own whitelist and expiry.
pub const OWNER_IDENTITY: &str = "owner";

const ACTION_CANCEL: &str = "cancel";
const ACTION_SPEND: &str = "spend";

/// The policy decision engine. Owns its audit log; shares the rule store
/// read-only with reload being the only replacement path.
///
/// All entry points take `&self` — the engine is safe to share across
/// concurrent callers behind an `Arc`.
pub struct PolicyEngine {
    store: RuleStore,
    audit: AuditLog,
}

impl PolicyEngine {
    /// Create an engine around a rule store.
    pub fn new(store: RuleStore) -> Self {
        Self {
            store,
            audit: AuditLog::new(),
        }
    }

    /// The rule store (resource lookups, snapshots).
    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    /// The audit log of every decision this engine has produced.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Reload policies from the backing file (admin trigger).
    pub fn reload(&self) -> Result<(), ConfigError> {
        self.store.reload()
    }

    /// Evaluate a cancellation request.
    ///
    /// The owner is bounded by blocked categories and the autonomous
    /// cancellation limit, in that order — when both would fire, the
    /// category block is the reported cause. Any other requester is routed
    /// through the delegation rules; owner-only blocks never apply to them.
    pub fn evaluate_cancel(&self, resource_id: &str, requester: &str) -> Decision {
        let rules = self.store.snapshot();

        let Some(resource) = rules.find_resource(resource_id) else {
            return self.record(Decision::deny(
                ACTION_CANCEL,
                Some(resource_id),
                requester,
                "Subscription not found.",
            ));
        };

        if requester != OWNER_IDENTITY {
            return self.delegation_decision(&rules, requester, ACTION_CANCEL, resource_id);
        }

        if rules
            .owner
            .blocked_categories
            .iter()
            .any(|c| c == &resource.category)
        {
            return self.record(Decision::deny(
                ACTION_CANCEL,
                Some(resource_id),
                requester,
                format!(
                    "CATEGORY BLOCK: Cannot cancel '{}' subscriptions autonomously.",
                    resource.category
                ),
            ));
        }

        if resource.amount > rules.owner.max_cancellation_amount {
            return self.record(Decision::deny(
                ACTION_CANCEL,
                Some(resource_id),
                requester,
                format!(
                    "AMOUNT BLOCK: Subscription cost ({}) exceeds autonomous cancellation limit ({}).",
                    resource.amount, rules.owner.max_cancellation_amount
                ),
            ));
        }

        self.record(Decision::allow(
            ACTION_CANCEL,
            Some(resource_id),
            requester,
            "Action permitted by owner policies.",
        ))
    }

    /// Evaluate a delegated action against a resource.
    ///
    /// Precedence is fixed: not-found > no-policy > expired >
    /// whitelist-miss > allow.
    pub fn evaluate_delegation(
        &self,
        requester: &str,
        action: &str,
        resource_id: &str,
    ) -> Decision {
        let rules = self.store.snapshot();

        if rules.find_resource(resource_id).is_none() {
            return self.record(Decision::deny(
                action,
                Some(resource_id),
                requester,
                "Subscription not found.",
            ));
        }

        self.delegation_decision(&rules, requester, action, resource_id)
    }

    /// Evaluate a spend request.
    ///
    /// The owner is bounded by the global confirmation threshold; a
    /// delegate by its own expiry and per-action spending limit. A
    /// requester with no configured rules or limit may spend nothing.
    pub fn evaluate_spend(&self, amount: f64, category: &str, requester: &str) -> Decision {
        let rules = self.store.snapshot();
        tracing::debug!(amount, category, requester, "evaluating spend");

        if requester == OWNER_IDENTITY {
            let threshold = rules.global_rules.require_confirmation_above;
            if amount > threshold {
                return self.record(Decision::deny(
                    ACTION_SPEND,
                    None,
                    requester,
                    format!(
                        "CONFIRMATION REQUIRED: Amount ({}) exceeds confirmation threshold ({}).",
                        amount, threshold
                    ),
                ));
            }
            return self.record(Decision::allow(
                ACTION_SPEND,
                None,
                requester,
                "Action permitted by owner policies.",
            ));
        }

        let Some(grant) = rules.delegation_for(requester) else {
            return self.record(Decision::deny(
                ACTION_SPEND,
                None,
                requester,
                format!("No delegation policies defined for user '{}'.", requester),
            ));
        };

        if grant.expiry.is_expired_at(Utc::now()) {
            return self.record(Decision::deny(
                ACTION_SPEND,
                None,
                requester,
                "DELEGATION BLOCK: Access has expired.",
            ));
        }

        if amount > grant.max_amount {
            return self.record(Decision::deny(
                ACTION_SPEND,
                None,
                requester,
                format!(
                    "SPEND BLOCK: Amount ({}) exceeds delegated spending limit ({}) for user '{}'.",
                    amount, grant.max_amount, requester
                ),
            ));
        }

        self.record(Decision::allow(
            ACTION_SPEND,
            None,
            requester,
            "Action permitted by delegation policies.",
        ))
    }

    /// The delegation rule chain, after the resource is known to exist.
    fn delegation_decision(
        &self,
        rules: &RuleSet,
        requester: &str,
        action: &str,
        resource_id: &str,
    ) -> Decision {
        // Resource existence was checked by the caller; re-resolve for the
        // name used in the deny reason.
        let Some(resource) = rules.find_resource(resource_id) else {
            return self.record(Decision::deny(
                action,
                Some(resource_id),
                requester,
                "Subscription not found.",
            ));
        };

        let Some(grant) = rules.delegation_for(requester) else {
            return self.record(Decision::deny(
                action,
                Some(resource_id),
                requester,
                format!("No delegation policies defined for user '{}'.", requester),
            ));
        };

        if grant.expiry.is_expired_at(Utc::now()) {
            return self.record(Decision::deny(
                action,
                Some(resource_id),
                requester,
                "DELEGATION BLOCK: Access has expired.",
            ));
        }

        if !grant.permits(resource) {
            return self.record(Decision::deny(
                action,
                Some(resource_id),
                requester,
                format!(
                    "DELEGATION BLOCK: User '{}' is not authorized to manage '{}'.",
                    requester, resource.name
                ),
            ));
        }

        self.record(Decision::allow(
            action,
            Some(resource_id),
            requester,
            "Action permitted by delegation policies.",
        ))
    }

    /// Append to the audit log and hand the decision back. Every
    /// evaluation path funnels through here — no decision goes unrecorded.
    fn record(&self, decision: Decision) -> Decision {
        if decision.allowed {
            tracing::info!(
                requester = %decision.requester,
                action = %decision.action,
                resource = decision.resource_id.as_deref().unwrap_or("-"),
                "action allowed"
            );
        } else {
            tracing::warn!(
                requester = %decision.requester,
                action = %decision.action,
                resource = decision.resource_id.as_deref().unwrap_or("-"),
                reason = %decision.reason,
                "action blocked"
            );
        }
        self.audit.append(decision.clone());
        decision
    }
}
