// rules.rs — Compiled rule model and resource catalog.
//
// A RuleSet is the in-memory form of the policy file after compilation:
// whitelists lowercased, expiry timestamps parsed, defaults applied.
// It is immutable once built — the engine only ever reads a snapshot,
// and reload swaps in a whole new RuleSet (never a partial update).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A subscription or other billable entity in the catalog.
///
/// Resources are read-only to the engine: loaded at RuleStore construction
/// or reload, never mutated by evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// Unique identifier (e.g., "sub_003").
    pub id: String,
    /// Display name (e.g., "JioFiber").
    pub name: String,
    /// Category tag (e.g., "utility", "streaming").
    pub category: String,
    /// Non-negative cost.
    pub amount: f64,
}

/// Rules that bound what the owner may do autonomously.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OwnerRules {
    /// Categories the owner must never cancel autonomously.
    pub blocked_categories: Vec<String>,
    /// Maximum cost the owner may cancel without confirmation.
    /// Defaults to 0 — with no rules loaded, every cancellation is blocked.
    pub max_cancellation_amount: f64,
}

/// When a delegation grant stops being valid.
///
/// Parsed once at configuration-load time; evaluation never touches the
/// raw timestamp string. A string that failed to parse compiles to
/// `Invalid`, which denies every evaluation under the grant (fail-closed).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// No expiry configured — the grant does not time out.
    #[default]
    None,
    /// The grant is valid until this instant (UTC).
    At(DateTime<Utc>),
    /// The configured expiry string was malformed. Always expired.
    Invalid,
}

impl ExpiryPolicy {
    /// Whether the grant is expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            ExpiryPolicy::None => false,
            ExpiryPolicy::At(deadline) => now > *deadline,
            ExpiryPolicy::Invalid => true,
        }
    }
}

/// The bounded permissions of one delegate identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DelegationGrant {
    /// Lowercased subscription names/categories this delegate may act on.
    pub whitelist: Vec<String>,
    /// When this delegation lapses.
    pub expiry: ExpiryPolicy,
    /// Maximum amount this delegate may spend per action.
    /// Defaults to 0 — a delegate with no configured limit may spend nothing.
    pub max_amount: f64,
}

impl DelegationGrant {
    /// Whether this grant's whitelist covers the given resource.
    ///
    /// An entry matches the resource's name or category case-insensitively.
    /// A match on either field is sufficient. An entry also matches as a
    /// leading word of the display name, so a grant listing "Spotify"
    /// covers the "Spotify Duo" plan.
    pub fn permits(&self, resource: &Resource) -> bool {
        let name = resource.name.to_lowercase();
        let category = resource.category.to_lowercase();
        self.whitelist
            .iter()
            .any(|entry| entry_matches(entry, &name) || entry_matches(entry, &category))
    }
}

/// Match a lowercased whitelist entry against a lowercased field value.
fn entry_matches(entry: &str, value: &str) -> bool {
    if value == entry {
        return true;
    }
    // Leading-word match: "spotify" covers "spotify duo" but not "spotifyx".
    value.starts_with(entry)
        && value[entry.len()..]
            .chars()
            .next()
            .is_some_and(char::is_whitespace)
}

/// Rules that apply to every requester.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GlobalRules {
    /// Owner spends above this amount require manual confirmation.
    /// Defaults to 0 — with no rules loaded, every positive spend does.
    pub require_confirmation_above: f64,
}

/// One immutable snapshot of every policy rule plus the resource catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleSet {
    /// The resource catalog (subscriptions).
    pub catalog: Vec<Resource>,
    /// Rules bounding the owner.
    pub owner: OwnerRules,
    /// Per-delegate rules, keyed by exact requester identity.
    pub delegations: HashMap<String, DelegationGrant>,
    /// Rules applying to everyone.
    pub global_rules: GlobalRules,
}

impl RuleSet {
    /// Look up a resource by identifier. Absence is a normal outcome.
    pub fn find_resource(&self, id: &str) -> Option<&Resource> {
        self.catalog.iter().find(|r| r.id == id)
    }

    /// Delegation rules for an identity, if any are defined.
    pub fn delegation_for(&self, identity: &str) -> Option<&DelegationGrant> {
        self.delegations.get(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn resource(name: &str, category: &str) -> Resource {
        Resource {
            id: "sub_x".to_string(),
            name: name.to_string(),
            category: category.to_string(),
            amount: 100.0,
        }
    }

    fn grant(whitelist: &[&str]) -> DelegationGrant {
        DelegationGrant {
            whitelist: whitelist.iter().map(|s| s.to_lowercase()).collect(),
            expiry: ExpiryPolicy::None,
            max_amount: 500.0,
        }
    }

    #[test]
    fn whitelist_matches_name_case_insensitively() {
        let g = grant(&["Spotify"]);
        assert!(g.permits(&resource("spotify", "streaming")));
        assert!(g.permits(&resource("SPOTIFY", "streaming")));
        assert!(g.permits(&resource("Spotify", "streaming")));
    }

    #[test]
    fn whitelist_matches_category() {
        let g = grant(&["streaming"]);
        assert!(g.permits(&resource("Netflix Premium", "Streaming")));
    }

    #[test]
    fn whitelist_matches_leading_word_of_name() {
        let g = grant(&["Spotify"]);
        assert!(g.permits(&resource("Spotify Duo", "streaming")));
        // No whitespace boundary — not a match.
        assert!(!g.permits(&resource("Spotifyx", "streaming")));
    }

    #[test]
    fn whitelist_miss_on_both_fields() {
        let g = grant(&["Spotify", "Zomato Gold"]);
        assert!(!g.permits(&resource("JioFiber", "utility")));
    }

    #[test]
    fn no_expiry_never_expires() {
        assert!(!ExpiryPolicy::None.is_expired_at(Utc::now()));
    }

    #[test]
    fn expiry_at_compares_against_now() {
        let now = Utc::now();
        assert!(ExpiryPolicy::At(now - Duration::hours(1)).is_expired_at(now));
        assert!(!ExpiryPolicy::At(now + Duration::hours(1)).is_expired_at(now));
    }

    #[test]
    fn invalid_expiry_is_always_expired() {
        assert!(ExpiryPolicy::Invalid.is_expired_at(Utc::now()));
    }

    #[test]
    fn empty_rule_set_has_fail_closed_defaults() {
        let rules = RuleSet::default();
        assert!(rules.catalog.is_empty());
        assert_eq!(rules.owner.max_cancellation_amount, 0.0);
        assert_eq!(rules.global_rules.require_confirmation_above, 0.0);
        assert!(rules.find_resource("sub_001").is_none());
        assert!(rules.delegation_for("roommate").is_none());
    }
}
