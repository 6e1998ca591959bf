use crate::core::{AppError, Currency, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a funds movement relative to the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Top-up: money entering the account
    Credit,
    /// Payout: money leaving the account
    Debit,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Credit => write!(f, "credit"),
            Direction::Debit => write!(f, "debit"),
        }
    }
}

/// Transaction lifecycle states
///
/// `Pending → Clearing → {Success, Failed}`; Pending may fail fast when
/// the provider call errors before a reference is issued. Terminal
/// states are immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Clearing,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Success | TransactionStatus::Failed)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Clearing => write!(f, "clearing"),
            TransactionStatus::Success => write!(f, "success"),
            TransactionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The provider's final verdict on a funds movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementOutcome {
    Success,
    Failed,
}

impl SettlementOutcome {
    pub fn status(&self) -> TransactionStatus {
        match self {
            SettlementOutcome::Success => TransactionStatus::Success,
            SettlementOutcome::Failed => TransactionStatus::Failed,
        }
    }
}

/// One funds movement through the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub direction: Direction,
    pub amount: Decimal,
    pub currency: Currency,
    /// The provider's reference, the idempotency key for notifications;
    /// unset until the provider acknowledges the movement
    pub provider_ref: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(
        account_id: String,
        direction: Direction,
        amount: Decimal,
        currency: Currency,
    ) -> Result<Self> {
        if account_id.trim().is_empty() {
            return Err(AppError::validation("Account ID cannot be empty"));
        }

        if amount <= Decimal::ZERO {
            return Err(AppError::validation("Amount must be positive"));
        }

        currency
            .validate_amount(amount)
            .map_err(AppError::Validation)?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            account_id,
            direction,
            amount,
            currency,
            provider_ref: None,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
