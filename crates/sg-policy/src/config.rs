// config.rs — Policy file parsing and compilation.
//
// The policy file is YAML with four optional top-level sections:
//
// ```yaml
// mock_database:
//   - id: "sub_002"
//     name: "Spotify Duo"
//     category: "streaming"
//     amount: 500
// owner_policies:
//   blocked_categories: ["utility"]
//   max_cancellation_amount: 800
// delegation_policies:
//   roommate:
//     allowed_subscriptions: ["Spotify", "Zomato Gold"]
//     expiry_timestamp: "2026-12-31T23:59:59Z"
//     max_amount: 500
// global_rules:
//   require_confirmation_above: 1000
// ```
//
// Every section defaults to empty, so a missing section degrades to
// deny-by-default rules instead of a parse failure. Compilation into a
// RuleSet lowercases whitelists and parses expiry timestamps once, so the
// evaluation path never handles raw strings.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rules::{
    DelegationGrant, ExpiryPolicy, GlobalRules, OwnerRules, Resource, RuleSet,
};

/// The raw policy file, section for section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// The resource catalog.
    #[serde(default)]
    pub mock_database: Vec<ResourceEntry>,

    /// Rules bounding the owner.
    #[serde(default)]
    pub owner_policies: OwnerPoliciesConfig,

    /// Per-delegate rules, keyed by requester identity.
    /// BTreeMap keeps iteration (and log output) deterministic.
    #[serde(default)]
    pub delegation_policies: BTreeMap<String, DelegationPolicyConfig>,

    /// Rules applying to every requester.
    #[serde(default)]
    pub global_rules: GlobalRulesConfig,
}

/// One catalog entry in the `mock_database` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub amount: f64,
}

/// The `owner_policies` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerPoliciesConfig {
    #[serde(default)]
    pub blocked_categories: Vec<String>,
    /// Missing limit means 0: nothing may be cancelled autonomously.
    #[serde(default)]
    pub max_cancellation_amount: f64,
}

/// One delegate's entry in the `delegation_policies` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelegationPolicyConfig {
    /// Subscription names or categories this delegate may act on.
    #[serde(default)]
    pub allowed_subscriptions: Vec<String>,
    /// Optional ISO-8601 expiry. May carry a timezone offset; a naive
    /// timestamp is interpreted as UTC.
    #[serde(default)]
    pub expiry_timestamp: Option<String>,
    /// Missing limit means 0: this delegate may spend nothing.
    #[serde(default)]
    pub max_amount: f64,
}

/// The `global_rules` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalRulesConfig {
    #[serde(default)]
    pub require_confirmation_above: f64,
}

impl PolicyConfig {
    /// Load and parse the policy file.
    ///
    /// Callers that need the fail-safe behavior (empty rules on failure)
    /// go through [`crate::store::RuleStore::load_or_default`] instead.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        // An empty file is a valid "no rules" configuration, not an error.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Compile the raw config into the evaluated rule form.
    ///
    /// Whitelists are lowercased here so evaluation compares without
    /// allocating, and expiry strings are parsed exactly once. A malformed
    /// expiry compiles to [`ExpiryPolicy::Invalid`] — the grant then denies
    /// everything rather than silently losing its time bound.
    pub fn compile(self) -> RuleSet {
        let catalog = self
            .mock_database
            .into_iter()
            .map(|entry| Resource {
                id: entry.id,
                name: entry.name,
                category: entry.category,
                amount: entry.amount,
            })
            .collect();

        let owner = OwnerRules {
            blocked_categories: self.owner_policies.blocked_categories,
            max_cancellation_amount: self.owner_policies.max_cancellation_amount,
        };

        let delegations = self
            .delegation_policies
            .into_iter()
            .map(|(identity, policy)| {
                let expiry = match policy.expiry_timestamp {
                    Some(raw) => parse_expiry(&identity, &raw),
                    None => ExpiryPolicy::None,
                };
                let grant = DelegationGrant {
                    whitelist: policy
                        .allowed_subscriptions
                        .iter()
                        .map(|s| s.to_lowercase())
                        .collect(),
                    expiry,
                    max_amount: policy.max_amount,
                };
                (identity, grant)
            })
            .collect();

        RuleSet {
            catalog,
            owner,
            delegations,
            global_rules: GlobalRules {
                require_confirmation_above: self.global_rules.require_confirmation_above,
            },
        }
    }
}

/// Parse an expiry timestamp into UTC.
///
/// Accepts RFC 3339 (offset converted to UTC), a naive datetime, or a bare
/// date (midnight UTC). Anything else compiles to `Invalid` — fail-closed.
fn parse_expiry(identity: &str, raw: &str) -> ExpiryPolicy {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return ExpiryPolicy::At(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return ExpiryPolicy::At(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return ExpiryPolicy::At(midnight.and_utc());
        }
    }
    tracing::warn!(
        identity,
        expiry = raw,
        "malformed expiry timestamp; treating delegation as expired"
    );
    ExpiryPolicy::Invalid
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_POLICY: &str = r#"
mock_database:
  - id: "sub_002"
    name: "Spotify Duo"
    category: "streaming"
    amount: 500
  - id: "sub_003"
    name: "JioFiber"
    category: "utility"
    amount: 1200
owner_policies:
  blocked_categories: ["utility"]
  max_cancellation_amount: 800
delegation_policies:
  roommate:
    allowed_subscriptions: ["Spotify", "Zomato Gold"]
    expiry_timestamp: "2026-12-31T23:59:59Z"
    max_amount: 500
global_rules:
  require_confirmation_above: 1000
"#;

    #[test]
    fn parses_full_policy_file() {
        let config: PolicyConfig = serde_yaml::from_str(FULL_POLICY).unwrap();
        assert_eq!(config.mock_database.len(), 2);
        assert_eq!(config.owner_policies.max_cancellation_amount, 800.0);
        assert_eq!(config.delegation_policies["roommate"].max_amount, 500.0);
        assert_eq!(config.global_rules.require_confirmation_above, 1000.0);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let config: PolicyConfig = serde_yaml::from_str("mock_database: []").unwrap();
        assert!(config.owner_policies.blocked_categories.is_empty());
        assert!(config.delegation_policies.is_empty());
        assert_eq!(config.global_rules.require_confirmation_above, 0.0);
    }

    #[test]
    fn compile_lowercases_whitelists() {
        let config: PolicyConfig = serde_yaml::from_str(FULL_POLICY).unwrap();
        let rules = config.compile();
        let grant = rules.delegation_for("roommate").unwrap();
        assert_eq!(grant.whitelist, vec!["spotify", "zomato gold"]);
    }

    #[test]
    fn compile_parses_rfc3339_expiry_to_utc() {
        let config: PolicyConfig = serde_yaml::from_str(
            r#"
delegation_policies:
  friend:
    allowed_subscriptions: ["Netflix"]
    expiry_timestamp: "2026-01-01T05:30:00+05:30"
"#,
        )
        .unwrap();
        let rules = config.compile();
        let expected = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            rules.delegation_for("friend").unwrap().expiry,
            ExpiryPolicy::At(expected)
        );
    }

    #[test]
    fn compile_treats_naive_expiry_as_utc() {
        let config: PolicyConfig = serde_yaml::from_str(
            r#"
delegation_policies:
  friend:
    allowed_subscriptions: ["Netflix"]
    expiry_timestamp: "2026-12-31T23:59:59"
"#,
        )
        .unwrap();
        let rules = config.compile();
        let expected = Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(
            rules.delegation_for("friend").unwrap().expiry,
            ExpiryPolicy::At(expected)
        );
    }

    #[test]
    fn compile_accepts_bare_dates() {
        let config: PolicyConfig = serde_yaml::from_str(
            r#"
delegation_policies:
  friend:
    allowed_subscriptions: ["Netflix"]
    expiry_timestamp: "2026-06-15"
"#,
        )
        .unwrap();
        let rules = config.compile();
        let expected = Utc.with_ymd_and_hms(2026, 6, 15, 0, 0, 0).unwrap();
        assert_eq!(
            rules.delegation_for("friend").unwrap().expiry,
            ExpiryPolicy::At(expected)
        );
    }

    #[test]
    fn malformed_expiry_compiles_to_invalid() {
        let config: PolicyConfig = serde_yaml::from_str(
            r#"
delegation_policies:
  friend:
    allowed_subscriptions: ["Netflix"]
    expiry_timestamp: "next tuesday"
"#,
        )
        .unwrap();
        let rules = config.compile();
        assert_eq!(
            rules.delegation_for("friend").unwrap().expiry,
            ExpiryPolicy::Invalid
        );
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FULL_POLICY.as_bytes()).unwrap();
        let config = PolicyConfig::load(file.path()).unwrap();
        assert_eq!(config.mock_database.len(), 2);
    }

    #[test]
    fn load_missing_file_is_unreadable() {
        let err = PolicyConfig::load("/nonexistent/policies.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn load_malformed_yaml_is_malformed() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"owner_policies: [not, a, mapping]").unwrap();
        let err = PolicyConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn load_empty_file_is_empty_config() {
        let file = NamedTempFile::new().unwrap();
        let config = PolicyConfig::load(file.path()).unwrap();
        assert!(config.mock_database.is_empty());
        assert!(config.delegation_policies.is_empty());
    }
}
