// server.rs — MCP gateway server for Subscription Guardian.
//
// SgGatewayServer implements the rmcp ServerHandler trait, exposing the
// policy engine, the delegated actor, and the finance vault as MCP tools.
// The engine is the only component that decides; every tool here renders
// its Decision as a flat structured result.
//
// Tools (prefixed `sg_` for namespacing):
//   sg_list_subscriptions    — the resource catalog
//   sg_cancel_subscription   — evaluate + report a cancellation
//   sg_check_delegation      — evaluate a delegated action
//   sg_spend                 — evaluate a spend against budget rules
//   sg_accessible_resources  — what a requester may currently access
//   sg_audit_tail            — recent audit log entries
//   sg_reload_policies       — re-read the policy file (admin)
//   sg_vault_balance         — current vault balance
//   sg_pay_bill              — execute a payment through the vault guards

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;

use sg_agent::DelegatedAgent;
use sg_policy::{Decision, PolicyEngine, RuleStore};
use sg_vault::FinanceVault;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

// ── Tool parameter types ─────────────────────────────────────────

/// Parameters for `sg_cancel_subscription`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CancelParams {
    /// The subscription to cancel (e.g., "sub_003").
    pub subscription_id: String,
    /// Who is requesting. Defaults to the owner.
    #[serde(default = "default_requester")]
    pub requester: String,
}

fn default_requester() -> String {
    "owner".to_string()
}

/// Parameters for `sg_check_delegation`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DelegationParams {
    /// The delegate identity (e.g., "roommate").
    pub requester: String,
    /// The action to check (e.g., "modify", "access").
    pub action: String,
    /// The target subscription.
    pub subscription_id: String,
}

/// Parameters for `sg_spend`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SpendParams {
    /// Amount to spend.
    pub amount: f64,
    /// Spending category (e.g., "streaming").
    pub category: String,
    /// Who is requesting. Defaults to the owner.
    #[serde(default = "default_requester")]
    pub requester: String,
}

/// Parameters for `sg_accessible_resources`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AccessibleParams {
    /// The requester identity to check access for.
    pub requester: String,
}

/// Parameters for `sg_audit_tail`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AuditTailParams {
    /// How many recent entries to return. Defaults to 20.
    #[serde(default = "default_tail")]
    pub limit: usize,
}

fn default_tail() -> usize {
    20
}

/// Parameters for `sg_pay_bill`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PayBillParams {
    /// The merchant to pay.
    pub merchant: String,
    /// Amount to pay.
    pub amount: f64,
}

// ── Shared state ─────────────────────────────────────────────────

/// Gateway state: the engine and the vault. Both are internally
/// synchronized, so concurrent tool calls share state without an outer
/// lock.
pub struct GatewayState {
    engine: Arc<PolicyEngine>,
    vault: FinanceVault,
}

impl GatewayState {
    /// Build state from config, loading the policy file with the usual
    /// fall-back-to-empty behavior.
    pub fn new(config: &GatewayConfig) -> Self {
        let store = RuleStore::load_or_default(&config.policy_file);
        Self {
            engine: Arc::new(PolicyEngine::new(store)),
            vault: FinanceVault::new(
                config.opening_balance,
                config.allowed_merchants.clone(),
                config.max_tx_limit,
            ),
        }
    }

    /// Wrap an existing engine and vault (tests, embedding).
    pub fn with_engine(engine: Arc<PolicyEngine>, vault: FinanceVault) -> Self {
        Self { engine, vault }
    }

    /// The shared policy engine.
    pub fn engine(&self) -> &Arc<PolicyEngine> {
        &self.engine
    }

    /// The finance vault.
    pub fn vault(&self) -> &FinanceVault {
        &self.vault
    }
}

/// Render a Decision as the flat boundary record.
pub fn decision_json(decision: &Decision) -> serde_json::Value {
    serde_json::json!({
        "status": if decision.allowed { "success" } else { "blocked" },
        "reason": decision.reason,
        "action": decision.action,
        "resource_id": decision.resource_id,
        "requester": decision.requester,
        "timestamp": decision.timestamp.to_rfc3339(),
    })
}

// ── MCP Server ───────────────────────────────────────────────────

/// The MCP gateway server. Holds shared state and the tool router.
pub struct SgGatewayServer {
    state: Arc<GatewayState>,
    tool_router: ToolRouter<Self>,
}

// Tool definitions. Each `#[tool]` method becomes an MCP tool that any
// MCP client can call.
#[tool_router]
impl SgGatewayServer {
    /// Create a new gateway server from config.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            state: Arc::new(GatewayState::new(&config)),
            tool_router: Self::tool_router(),
        }
    }

    /// Create a server wrapping existing state (for testing).
    pub fn with_state(state: GatewayState) -> Self {
        Self {
            state: Arc::new(state),
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the shared state (for testing).
    pub fn state(&self) -> &Arc<GatewayState> {
        &self.state
    }

    // ── Policy tools ─────────────────────────────────────────

    #[tool(description = "List all subscriptions in the catalog with their category and cost.")]
    fn sg_list_subscriptions(&self) -> Result<CallToolResult, McpError> {
        let catalog = self.state.engine.store().snapshot().catalog.clone();
        let items: Vec<serde_json::Value> = catalog
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.id,
                    "name": r.name,
                    "category": r.category,
                    "amount": r.amount,
                })
            })
            .collect();
        json_result(serde_json::json!({ "subscriptions": items }))
    }

    #[tool(
        description = "Request cancellation of a subscription. Returns a blocked/success result with the policy reason; it never bypasses policy."
    )]
    fn sg_cancel_subscription(
        &self,
        Parameters(params): Parameters<CancelParams>,
    ) -> Result<CallToolResult, McpError> {
        let decision = self
            .state
            .engine
            .evaluate_cancel(&params.subscription_id, &params.requester);
        json_result(decision_json(&decision))
    }

    #[tool(
        description = "Check whether a delegated user may perform an action on a subscription."
    )]
    fn sg_check_delegation(
        &self,
        Parameters(params): Parameters<DelegationParams>,
    ) -> Result<CallToolResult, McpError> {
        let decision = self.state.engine.evaluate_delegation(
            &params.requester,
            &params.action,
            &params.subscription_id,
        );
        json_result(decision_json(&decision))
    }

    #[tool(description = "Check a spend against budget rules for the requester.")]
    fn sg_spend(
        &self,
        Parameters(params): Parameters<SpendParams>,
    ) -> Result<CallToolResult, McpError> {
        let decision =
            self.state
                .engine
                .evaluate_spend(params.amount, &params.category, &params.requester);
        json_result(decision_json(&decision))
    }

    #[tool(
        description = "List the subscriptions a requester may currently access under delegation rules."
    )]
    fn sg_accessible_resources(
        &self,
        Parameters(params): Parameters<AccessibleParams>,
    ) -> Result<CallToolResult, McpError> {
        let agent = DelegatedAgent::new(params.requester.as_str(), Arc::clone(&self.state.engine));
        let items: Vec<serde_json::Value> = agent
            .list_accessible_resources()
            .iter()
            .map(|r| serde_json::json!({ "id": r.id, "name": r.name, "category": r.category }))
            .collect();
        json_result(serde_json::json!({
            "requester": params.requester,
            "accessible": items,
        }))
    }

    #[tool(description = "Return the most recent audit log entries, oldest first.")]
    fn sg_audit_tail(
        &self,
        Parameters(params): Parameters<AuditTailParams>,
    ) -> Result<CallToolResult, McpError> {
        let entries: Vec<serde_json::Value> = self
            .state
            .engine
            .audit()
            .tail(params.limit)
            .iter()
            .map(|record| decision_json(&record.decision))
            .collect();
        json_result(serde_json::json!({ "entries": entries }))
    }

    #[tool(
        description = "Re-read the policy file and swap the active rules atomically. Admin operation."
    )]
    fn sg_reload_policies(&self) -> Result<CallToolResult, McpError> {
        tracing::info!("policy reload requested over MCP");
        match self.state.engine.reload() {
            Ok(()) => json_result(serde_json::json!({ "status": "reloaded" })),
            Err(e) => {
                let err = GatewayError::from(e);
                Err(McpError::internal_error(err.to_string(), None))
            }
        }
    }

    // ── Vault tools ──────────────────────────────────────────

    #[tool(description = "Return the current vault balance.")]
    fn sg_vault_balance(&self) -> Result<CallToolResult, McpError> {
        json_result(serde_json::json!({ "balance": self.state.vault.balance() }))
    }

    #[tool(
        description = "Pay a bill through the vault. The vault applies its own merchant allowlist, transaction limit, and funds checks before executing."
    )]
    fn sg_pay_bill(
        &self,
        Parameters(params): Parameters<PayBillParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.state.vault.pay_bill(&params.merchant, params.amount);
        let value = serde_json::to_value(&outcome)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        json_result(value)
    }
}

// ── ServerHandler implementation ─────────────────────────────────

#[tool_handler]
impl ServerHandler for SgGatewayServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "subscription-guardian".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Subscription Guardian".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Subscription Guardian MCP server. Every sensitive action is \
                 evaluated by the policy engine first; blocked results carry \
                 the policy reason and must not be retried without new \
                 authorization. Start with sg_list_subscriptions."
                    .into(),
            ),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Wrap a JSON value as a successful tool result.
fn json_result(value: serde_json::Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::json(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?]))
}
