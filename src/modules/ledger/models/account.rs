use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-owner two-balance ledger account
///
/// `spendable` is immediately available; `in_flight` is reserved for
/// payouts the provider has not yet confirmed. Both stay non-negative
/// at all times. Accounts are created lazily on first funds movement
/// and mutated only inside the ledger store's atomic operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub owner_id: String,
    pub spendable_balance: Decimal,
    pub in_flight_balance: Decimal,
}

impl Account {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            spendable_balance: Decimal::ZERO,
            in_flight_balance: Decimal::ZERO,
        }
    }

    /// All money the owner is entitled to, known or pending
    pub fn total_exposure(&self) -> Decimal {
        self.spendable_balance + self.in_flight_balance
    }
}
