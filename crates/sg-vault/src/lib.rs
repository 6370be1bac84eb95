//! # sg-vault
//!
//! Guarded payment executor for Subscription Guardian.
//!
//! The [`FinanceVault`] is the component that actually moves money once
//! policy has allowed a spend. It applies its own last-line guards —
//! merchant allowlist, per-transaction limit, sufficient funds — before
//! executing, and keeps a receipt history of every successful payment.
//!
//! All state is owned by the instance: no process-wide balance, no global
//! transaction history. Multiple vaults coexist for testing.

pub mod vault;

pub use vault::{FinanceVault, PaymentOutcome, Receipt};
