// vault.rs — The guarded payment executor.
//
// pay_bill applies ordered checks: merchant allowlist → per-transaction
// limit → sufficient funds → execute. Rejections are data, not errors;
// only a successful payment mutates the balance and appends a receipt.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record of one successful payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Receipt {
    /// Who was paid.
    pub merchant: String,
    /// How much.
    pub amount: f64,
    /// The balance after this payment.
    pub balance_after: f64,
    /// When the payment executed (UTC).
    pub timestamp: DateTime<Utc>,
}

/// The result of a payment attempt.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// The payment executed; funds moved.
    Paid { receipt: Receipt },
    /// A guard rejected the payment; nothing moved.
    Rejected { reason: String },
}

impl PaymentOutcome {
    /// Whether the payment was rejected.
    pub fn is_rejected(&self) -> bool {
        matches!(self, PaymentOutcome::Rejected { .. })
    }
}

struct VaultState {
    balance: f64,
    history: Vec<Receipt>,
}

/// A personal finance vault with last-line spending guards.
pub struct FinanceVault {
    allowed_merchants: Vec<String>,
    max_tx_limit: f64,
    state: Mutex<VaultState>,
}

impl FinanceVault {
    /// Create a vault with an opening balance, a merchant allowlist, and a
    /// per-transaction safety limit.
    pub fn new(opening_balance: f64, allowed_merchants: Vec<String>, max_tx_limit: f64) -> Self {
        Self {
            allowed_merchants,
            max_tx_limit,
            state: Mutex::new(VaultState {
                balance: opening_balance,
                history: Vec::new(),
            }),
        }
    }

    /// The current balance.
    pub fn balance(&self) -> f64 {
        self.lock().balance
    }

    /// Receipts for every successful payment, oldest first.
    pub fn history(&self) -> Vec<Receipt> {
        self.lock().history.clone()
    }

    /// Pay a bill. Funds move only if every guard passes.
    pub fn pay_bill(&self, merchant: &str, amount: f64) -> PaymentOutcome {
        if !self.allowed_merchants.iter().any(|m| m == merchant) {
            return self.reject(format!(
                "REJECTED: Merchant '{}' is not authorized. Transaction blocked.",
                merchant
            ));
        }

        if amount > self.max_tx_limit {
            return self.reject(format!(
                "REJECTED: Amount ({}) exceeds the per-transaction safety limit ({}).",
                amount, self.max_tx_limit
            ));
        }

        // Balance check and debit under one lock so concurrent payments
        // cannot both pass the funds check against the same balance.
        let mut state = self.lock();
        if amount > state.balance {
            let balance = state.balance;
            drop(state);
            return self.reject(format!(
                "REJECTED: Insufficient funds. Current balance: {}.",
                balance
            ));
        }

        state.balance -= amount;
        let receipt = Receipt {
            merchant: merchant.to_string(),
            amount,
            balance_after: state.balance,
            timestamp: Utc::now(),
        };
        state.history.push(receipt.clone());
        tracing::info!(merchant, amount, balance = state.balance, "bill paid");
        PaymentOutcome::Paid { receipt }
    }

    fn reject(&self, reason: String) -> PaymentOutcome {
        tracing::warn!(reason = %reason, "payment rejected");
        PaymentOutcome::Rejected { reason }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VaultState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> FinanceVault {
        FinanceVault::new(
            50_000.0,
            vec![
                "Adani Electricity".to_string(),
                "Jio Fiber".to_string(),
                "Netflix".to_string(),
            ],
            5_000.0,
        )
    }

    #[test]
    fn pays_an_allowed_bill_and_debits_the_balance() {
        let vault = vault();
        let outcome = vault.pay_bill("Netflix", 649.0);
        match outcome {
            PaymentOutcome::Paid { receipt } => {
                assert_eq!(receipt.merchant, "Netflix");
                assert_eq!(receipt.balance_after, 49_351.0);
            }
            other => panic!("expected Paid, got {:?}", other),
        }
        assert_eq!(vault.balance(), 49_351.0);
        assert_eq!(vault.history().len(), 1);
    }

    #[test]
    fn rejects_unknown_merchants() {
        let vault = vault();
        let outcome = vault.pay_bill("Totally Legit Crypto", 100.0);
        match outcome {
            PaymentOutcome::Rejected { reason } => {
                assert!(reason.contains("not authorized"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
        assert_eq!(vault.balance(), 50_000.0);
    }

    #[test]
    fn rejects_amounts_over_the_transaction_limit() {
        let vault = vault();
        let outcome = vault.pay_bill("Netflix", 6_000.0);
        assert!(outcome.is_rejected());
        match outcome {
            PaymentOutcome::Rejected { reason } => assert!(reason.contains("safety limit")),
            _ => unreachable!(),
        }
    }

    #[test]
    fn rejects_payments_beyond_the_balance() {
        let vault = FinanceVault::new(100.0, vec!["Netflix".to_string()], 5_000.0);
        let outcome = vault.pay_bill("Netflix", 500.0);
        match outcome {
            PaymentOutcome::Rejected { reason } => {
                assert!(reason.contains("Insufficient funds"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
        assert_eq!(vault.balance(), 100.0);
    }

    #[test]
    fn allowlist_check_runs_before_the_limit_check() {
        // Both guards would fire; the merchant rejection is reported.
        let vault = vault();
        match vault.pay_bill("Unknown Shop", 6_000.0) {
            PaymentOutcome::Rejected { reason } => assert!(reason.contains("not authorized")),
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn rejections_do_not_touch_the_history() {
        let vault = vault();
        vault.pay_bill("Unknown Shop", 100.0);
        vault.pay_bill("Netflix", 6_000.0);
        assert!(vault.history().is_empty());
    }

    #[test]
    fn receipts_accumulate_in_payment_order() {
        let vault = vault();
        vault.pay_bill("Netflix", 100.0);
        vault.pay_bill("Jio Fiber", 200.0);
        let merchants: Vec<String> = vault.history().into_iter().map(|r| r.merchant).collect();
        assert_eq!(merchants, vec!["Netflix", "Jio Fiber"]);
    }

    #[test]
    fn outcome_serializes_with_a_status_tag() {
        let vault = vault();
        let json = serde_json::to_value(vault.pay_bill("Netflix", 100.0)).unwrap();
        assert_eq!(json["status"], "paid");
        let json = serde_json::to_value(vault.pay_bill("Nope", 100.0)).unwrap();
        assert_eq!(json["status"], "rejected");
    }
}
