// actor.rs — The delegated actor: identity + engine reference, no policy.
//
// DelegatedAgent wraps one requester identity and forwards every attempt
// to the policy engine, translating the Decision into an execute-or-block
// outcome. It contains no authorization logic of its own — if a check is
// missing here, it belongs in the engine, not in the actor.

use std::sync::Arc;

use serde::Serialize;

use sg_policy::{ConfigError, Decision, PolicyEngine, Resource};

use crate::action::AgentAction;

/// The result of an attempted action.
///
/// `Executed` means the policy allowed it and the caller may proceed with
/// the real-world side effect; the actor itself executes nothing.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// Policy allowed the action.
    #[serde(rename = "success")]
    Executed {
        message: String,
        /// The policy justification that authorized the action.
        authorized_by: String,
    },
    /// Policy blocked the action. `reason` is surfaced verbatim.
    Blocked {
        reason: String,
        action: String,
        resource_id: Option<String>,
    },
}

impl ActionOutcome {
    /// Whether the attempt was blocked.
    pub fn is_blocked(&self) -> bool {
        matches!(self, ActionOutcome::Blocked { .. })
    }
}

/// An agent acting on behalf of a requester with bounded permissions.
pub struct DelegatedAgent {
    requester: String,
    engine: Arc<PolicyEngine>,
}

impl DelegatedAgent {
    /// Create an actor for one requester identity.
    pub fn new(requester: impl Into<String>, engine: Arc<PolicyEngine>) -> Self {
        let requester = requester.into();
        tracing::info!(requester = %requester, "delegated agent initialized");
        Self { requester, engine }
    }

    /// The identity this actor requests as.
    pub fn requester(&self) -> &str {
        &self.requester
    }

    /// Attempt an action on a resource.
    ///
    /// Routes cancel and spend to their dedicated evaluations and every
    /// other action through the generic delegation check, then enforces
    /// whatever the engine decided.
    pub fn attempt(&self, action: &AgentAction, resource_id: &str) -> ActionOutcome {
        tracing::info!(
            requester = %self.requester,
            action = action.verb(),
            resource = resource_id,
            "attempting action"
        );

        let decision = match action {
            AgentAction::Cancel => self.engine.evaluate_cancel(resource_id, &self.requester),
            AgentAction::Spend { amount, category } => {
                self.engine.evaluate_spend(*amount, category, &self.requester)
            }
            AgentAction::Modify | AgentAction::Access => {
                self.engine
                    .evaluate_delegation(&self.requester, action.verb(), resource_id)
            }
        };

        self.enforce(action, resource_id, decision)
    }

    /// Every resource this requester may currently access.
    ///
    /// A bulk delegation check over the whole catalog with a synthetic
    /// "access" action — O(resources), not a separate algorithm.
    pub fn list_accessible_resources(&self) -> Vec<Resource> {
        let catalog = self.engine.store().snapshot().catalog.clone();
        catalog
            .into_iter()
            .filter(|resource| {
                self.engine
                    .evaluate_delegation(&self.requester, "access", &resource.id)
                    .allowed
            })
            .collect()
    }

    /// Re-read the policy source (delegation rules may have changed).
    pub fn refresh(&self) -> Result<(), ConfigError> {
        tracing::info!(requester = %self.requester, "refreshing delegation policies");
        self.engine.reload()
    }

    /// Translate a Decision into the caller-facing outcome.
    fn enforce(&self, action: &AgentAction, resource_id: &str, decision: Decision) -> ActionOutcome {
        if decision.allowed {
            ActionOutcome::Executed {
                message: format!(
                    "Successfully executed '{}' on '{}'.",
                    action.verb(),
                    resource_id
                ),
                authorized_by: decision.reason,
            }
        } else {
            ActionOutcome::Blocked {
                reason: decision.reason,
                action: action.verb().to_string(),
                resource_id: Some(resource_id.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_policy::{
        DelegationGrant, ExpiryPolicy, GlobalRules, OwnerRules, RuleSet, RuleStore,
    };
    use std::collections::HashMap;

    fn household_engine() -> Arc<PolicyEngine> {
        let mut delegations = HashMap::new();
        delegations.insert(
            "roommate".to_string(),
            DelegationGrant {
                whitelist: vec!["spotify".to_string(), "zomato gold".to_string()],
                expiry: ExpiryPolicy::None,
                max_amount: 500.0,
            },
        );

        let rules = RuleSet {
            catalog: vec![
                Resource {
                    id: "sub_001".to_string(),
                    name: "Netflix Premium".to_string(),
                    category: "streaming".to_string(),
                    amount: 649.0,
                },
                Resource {
                    id: "sub_002".to_string(),
                    name: "Spotify Duo".to_string(),
                    category: "streaming".to_string(),
                    amount: 500.0,
                },
                Resource {
                    id: "sub_003".to_string(),
                    name: "JioFiber".to_string(),
                    category: "utility".to_string(),
                    amount: 1200.0,
                },
                Resource {
                    id: "sub_004".to_string(),
                    name: "Zomato Gold".to_string(),
                    category: "food".to_string(),
                    amount: 300.0,
                },
            ],
            owner: OwnerRules {
                blocked_categories: vec!["utility".to_string()],
                max_cancellation_amount: 800.0,
            },
            delegations,
            global_rules: GlobalRules {
                require_confirmation_above: 1000.0,
            },
        };
        Arc::new(PolicyEngine::new(RuleStore::from_rules(rules)))
    }

    #[test]
    fn allowed_attempt_reports_execution() {
        let agent = DelegatedAgent::new("roommate", household_engine());
        let outcome = agent.attempt(&AgentAction::Modify, "sub_002");
        match outcome {
            ActionOutcome::Executed { message, authorized_by } => {
                assert!(message.contains("'modify' on 'sub_002'"));
                assert!(authorized_by.contains("delegation policies"));
            }
            other => panic!("expected Executed, got {:?}", other),
        }
    }

    #[test]
    fn blocked_attempt_surfaces_the_reason_verbatim() {
        let agent = DelegatedAgent::new("roommate", household_engine());
        let outcome = agent.attempt(&AgentAction::Cancel, "sub_003");
        match outcome {
            ActionOutcome::Blocked { reason, action, resource_id } => {
                assert!(reason.contains("not authorized to manage 'JioFiber'"));
                assert_eq!(action, "cancel");
                assert_eq!(resource_id.as_deref(), Some("sub_003"));
            }
            other => panic!("expected Blocked, got {:?}", other),
        }
    }

    #[test]
    fn owner_actor_is_bounded_by_owner_rules() {
        let agent = DelegatedAgent::new("owner", household_engine());
        assert!(!agent.attempt(&AgentAction::Cancel, "sub_001").is_blocked());
        assert!(agent.attempt(&AgentAction::Cancel, "sub_003").is_blocked());
    }

    #[test]
    fn spend_routes_to_the_budget_check() {
        let agent = DelegatedAgent::new("roommate", household_engine());
        let over = agent.attempt(
            &AgentAction::Spend {
                amount: 2000.0,
                category: "streaming".to_string(),
            },
            "sub_new",
        );
        match over {
            ActionOutcome::Blocked { reason, .. } => assert!(reason.contains("SPEND BLOCK")),
            other => panic!("expected Blocked, got {:?}", other),
        }

        let within = agent.attempt(
            &AgentAction::Spend {
                amount: 400.0,
                category: "food".to_string(),
            },
            "sub_new",
        );
        assert!(!within.is_blocked());
    }

    #[test]
    fn accessible_resources_are_the_whitelisted_ones() {
        let agent = DelegatedAgent::new("roommate", household_engine());
        let names: Vec<String> = agent
            .list_accessible_resources()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Spotify Duo", "Zomato Gold"]);
    }

    #[test]
    fn accessible_resources_is_empty_for_unknown_requesters() {
        let agent = DelegatedAgent::new("stranger", household_engine());
        assert!(agent.list_accessible_resources().is_empty());
    }

    #[test]
    fn every_attempt_lands_in_the_audit_log() {
        let engine = household_engine();
        let agent = DelegatedAgent::new("roommate", Arc::clone(&engine));
        agent.attempt(&AgentAction::Access, "sub_002");
        agent.attempt(&AgentAction::Cancel, "sub_003");
        // list_accessible_resources audits one check per catalog entry.
        agent.list_accessible_resources();
        assert_eq!(engine.audit().len(), 2 + 4);
    }

    #[test]
    fn refresh_without_a_backing_file_reports_no_source() {
        let agent = DelegatedAgent::new("roommate", household_engine());
        assert!(matches!(agent.refresh(), Err(ConfigError::NoSource)));
    }

    #[test]
    fn outcome_serializes_with_a_status_tag() {
        let agent = DelegatedAgent::new("roommate", household_engine());
        let blocked = agent.attempt(&AgentAction::Cancel, "sub_003");
        let json = serde_json::to_value(&blocked).unwrap();
        assert_eq!(json["status"], "blocked");

        let executed = agent.attempt(&AgentAction::Modify, "sub_002");
        let json = serde_json::to_value(&executed).unwrap();
        assert_eq!(json["status"], "success");
    }
}
