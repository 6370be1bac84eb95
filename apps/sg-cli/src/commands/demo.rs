// demo.rs — Scripted guardrail scenarios.
//
// The owner demo exercises the owner's category and amount blocks plus the
// vault guards; the delegate demo shows bounded roommate access. Both end
// by printing the audit trail the session produced, so the output doubles
// as a tour of the decision log.

use std::sync::Arc;

use clap::Subcommand;
use sg_agent::{AgentAction, DelegatedAgent};
use sg_mcp_gateway::GatewayConfig;
use sg_policy::PolicyEngine;
use sg_vault::FinanceVault;

use super::check::print_decision;

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Owner scenarios: policy guardrails on the account owner.
    Owner,
    /// Delegate scenarios: bounded roommate access.
    Delegate,
}

pub fn execute(
    cmd: &DemoCommands,
    engine: PolicyEngine,
    config: &GatewayConfig,
) -> anyhow::Result<()> {
    let engine = Arc::new(engine);
    match cmd {
        DemoCommands::Owner => owner_scenarios(&engine, config),
        DemoCommands::Delegate => delegate_scenarios(&engine),
    }
    print_audit_trail(&engine);
    Ok(())
}

fn owner_scenarios(engine: &Arc<PolicyEngine>, config: &GatewayConfig) {
    print_header("Owner Scenario: Policy Guardrails");

    println!("--- Checking subscriptions ---");
    for resource in &engine.store().snapshot().catalog {
        println!("  {} ({}, {})", resource.name, resource.category, resource.amount);
    }

    println!("\n--- Allowed action: cancel an affordable streaming plan ---");
    print_decision(&engine.evaluate_cancel("sub_001", "owner"));

    println!("\n--- Blocked action: cancel the utility connection ---");
    print_decision(&engine.evaluate_cancel("sub_003", "owner"));

    println!("\n--- Spend above the confirmation threshold ---");
    print_decision(&engine.evaluate_spend(2500.0, "electronics", "owner"));

    println!("\n--- Vault: pay a bill within the guards ---");
    let vault = FinanceVault::new(
        config.opening_balance,
        config.allowed_merchants.clone(),
        config.max_tx_limit,
    );
    match vault.pay_bill("Netflix", 649.0) {
        sg_vault::PaymentOutcome::Paid { receipt } => println!(
            "  PAID: {} to {}. New balance: {}",
            receipt.amount, receipt.merchant, receipt.balance_after
        ),
        sg_vault::PaymentOutcome::Rejected { reason } => println!("  {}", reason),
    }
    match vault.pay_bill("Unknown Shop", 100.0) {
        sg_vault::PaymentOutcome::Paid { .. } => println!("  unexpected payment"),
        sg_vault::PaymentOutcome::Rejected { reason } => println!("  {}", reason),
    }
}

fn delegate_scenarios(engine: &Arc<PolicyEngine>) {
    print_header("Delegate Scenario: Bounded Roommate Access");

    let agent = DelegatedAgent::new("roommate", Arc::clone(engine));

    println!("--- Action 1: check remaining permissions ---");
    let accessible = agent.list_accessible_resources();
    if accessible.is_empty() {
        println!("  (none)");
    }
    for resource in &accessible {
        println!("  {} ({})", resource.name, resource.category);
    }

    println!("\n--- Action 2: modify Spotify (allowed) ---");
    report(agent.attempt(&AgentAction::Modify, "sub_002"));

    println!("\n--- Action 3: cancel JioFiber (blocked) ---");
    report(agent.attempt(&AgentAction::Cancel, "sub_003"));

    println!("\n--- Action 4: spend 2000 on a new subscription (blocked) ---");
    report(agent.attempt(
        &AgentAction::Spend {
            amount: 2000.0,
            category: "streaming".to_string(),
        },
        "sub_new",
    ));
}

fn report(outcome: sg_agent::ActionOutcome) {
    match outcome {
        sg_agent::ActionOutcome::Executed { message, authorized_by } => {
            println!("  SUCCESS: {}", message);
            println!("  Authorized by policy: {}", authorized_by);
        }
        sg_agent::ActionOutcome::Blocked { reason, .. } => {
            println!("  ACTION BLOCKED: {}", reason);
        }
    }
}

fn print_audit_trail(engine: &Arc<PolicyEngine>) {
    print_header("Audit Trail");
    for record in engine.audit().snapshot() {
        let d = &record.decision;
        println!(
            "{} {:<7} {:<8} {:<10} {} — {}",
            d.timestamp.format("%H:%M:%S"),
            if d.allowed { "ALLOW" } else { "DENY" },
            d.action,
            d.requester,
            d.resource_id.as_deref().unwrap_or("-"),
            d.reason
        );
    }
    match engine.audit().verify_chain() {
        Ok(()) => println!("\n{} entries, hash chain intact.", engine.audit().len()),
        Err(e) => println!("\nAUDIT CHAIN BROKEN: {}", e),
    }
}

fn print_header(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!(" {}", title);
    println!("{}\n", "=".repeat(60));
}
