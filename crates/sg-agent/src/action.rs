// action.rs — The closed set of actions an actor can attempt.
//
// Integration layers deal in strings; the actor deals in this enum. An
// unrecognized verb fails parsing with InvalidRequest instead of falling
// through to a generic evaluation path silently.

use crate::error::AgentError;

/// An action a requester can attempt through the actor.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentAction {
    /// Cancel a subscription.
    Cancel,
    /// Spend money. Not resource-scoped.
    Spend { amount: f64, category: String },
    /// Modify a subscription (plan change, payment method, ...).
    Modify,
    /// Access a subscription's details.
    Access,
}

impl AgentAction {
    /// The verb recorded in decisions and audit entries.
    pub fn verb(&self) -> &'static str {
        match self {
            AgentAction::Cancel => "cancel",
            AgentAction::Spend { .. } => "spend",
            AgentAction::Modify => "modify",
            AgentAction::Access => "access",
        }
    }

    /// Parse a verb string from an integration boundary.
    ///
    /// `amount`/`category` only apply to "spend" and default to 0 and
    /// "unknown" when absent, matching the engine's fail-closed spend
    /// limits (a zero spend is the only thing an unbounded default allows).
    pub fn parse(
        verb: &str,
        amount: Option<f64>,
        category: Option<&str>,
    ) -> Result<Self, AgentError> {
        match verb {
            "cancel" => Ok(AgentAction::Cancel),
            "spend" => Ok(AgentAction::Spend {
                amount: amount.unwrap_or(0.0),
                category: category.unwrap_or("unknown").to_string(),
            }),
            "modify" => Ok(AgentAction::Modify),
            "access" => Ok(AgentAction::Access),
            other => Err(AgentError::InvalidRequest {
                action: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_verbs() {
        assert_eq!(AgentAction::parse("cancel", None, None).unwrap(), AgentAction::Cancel);
        assert_eq!(AgentAction::parse("modify", None, None).unwrap(), AgentAction::Modify);
        assert_eq!(AgentAction::parse("access", None, None).unwrap(), AgentAction::Access);
    }

    #[test]
    fn parses_spend_with_parameters() {
        let action = AgentAction::parse("spend", Some(250.0), Some("food")).unwrap();
        assert_eq!(
            action,
            AgentAction::Spend {
                amount: 250.0,
                category: "food".to_string()
            }
        );
    }

    #[test]
    fn spend_parameters_default_conservatively() {
        let action = AgentAction::parse("spend", None, None).unwrap();
        assert_eq!(
            action,
            AgentAction::Spend {
                amount: 0.0,
                category: "unknown".to_string()
            }
        );
    }

    #[test]
    fn unknown_verb_is_an_invalid_request() {
        let err = AgentAction::parse("teleport", None, None).unwrap_err();
        assert!(matches!(err, AgentError::InvalidRequest { ref action } if action == "teleport"));
    }

    #[test]
    fn verbs_round_trip() {
        for verb in ["cancel", "modify", "access"] {
            assert_eq!(AgentAction::parse(verb, None, None).unwrap().verb(), verb);
        }
    }
}
