// check.rs — Evaluate a single policy request and print the decision.

use clap::Subcommand;
use sg_policy::{Decision, PolicyEngine};

#[derive(Subcommand)]
pub enum CheckCommands {
    /// Evaluate a cancellation request.
    Cancel {
        /// The subscription to cancel (e.g., "sub_003").
        subscription_id: String,
        /// Who is requesting.
        #[arg(long, default_value = "owner")]
        requester: String,
    },
    /// Evaluate a delegated action.
    Delegation {
        /// The delegate identity (e.g., "roommate").
        requester: String,
        /// The action to check (e.g., "modify", "access").
        action: String,
        /// The target subscription.
        subscription_id: String,
    },
    /// Evaluate a spend against budget rules.
    Spend {
        /// Amount to spend.
        amount: f64,
        /// Spending category (e.g., "streaming").
        category: String,
        /// Who is requesting.
        #[arg(long, default_value = "owner")]
        requester: String,
    },
}

pub fn execute(cmd: &CheckCommands, engine: &PolicyEngine) -> anyhow::Result<()> {
    let decision = match cmd {
        CheckCommands::Cancel {
            subscription_id,
            requester,
        } => engine.evaluate_cancel(subscription_id, requester),
        CheckCommands::Delegation {
            requester,
            action,
            subscription_id,
        } => engine.evaluate_delegation(requester, action, subscription_id),
        CheckCommands::Spend {
            amount,
            category,
            requester,
        } => engine.evaluate_spend(*amount, category, requester),
    };

    print_decision(&decision);
    Ok(())
}

pub fn print_decision(decision: &Decision) {
    let verdict = if decision.allowed { "ALLOWED" } else { "BLOCKED" };
    println!(
        "{} [{} by {}{}]",
        verdict,
        decision.action,
        decision.requester,
        decision
            .resource_id
            .as_deref()
            .map(|id| format!(" on {}", id))
            .unwrap_or_default(),
    );
    println!("  {}", decision.reason);
}
