use crate::core::{AppError, Currency, Result};
use crate::modules::ledger::models::{
    Account, Direction, SettlementOutcome, Transaction, TransactionStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info};

/// Result of a resolve call
#[derive(Debug, Clone)]
pub struct Resolution {
    pub transaction: Transaction,
    /// False when the transaction was already terminal and the call
    /// was an idempotent no-op
    pub newly_resolved: bool,
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<String, Account>,
    transactions: HashMap<String, Transaction>,
    by_provider_ref: HashMap<String, String>,
}

/// Arena store for accounts and transactions
///
/// Accounts and transactions are keyed by id; the provider-reference
/// index enforces reference uniqueness. Every operation is a single
/// critical section over one lock, which is both the per-account
/// serialization point for balance mutations and the per-record guard
/// that totally orders state transitions. No lock is held across a
/// provider round-trip.
pub struct LedgerStore {
    inner: RwLock<LedgerState>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a transaction in `Pending`.
    ///
    /// For a debit the amount is reserved out of the spendable balance
    /// into in-flight in the same atomic step, so concurrent payouts
    /// can never over-commit an account. The account is created lazily.
    pub fn initiate(
        &self,
        owner_id: &str,
        direction: Direction,
        amount: Decimal,
        currency: Currency,
    ) -> Result<Transaction> {
        let transaction =
            Transaction::new(owner_id.to_string(), direction, amount, currency)?;

        let mut state = self.write_state();

        let account = state
            .accounts
            .entry(owner_id.to_string())
            .or_insert_with(|| Account::new(owner_id));

        if direction == Direction::Debit {
            if account.spendable_balance < amount {
                return Err(AppError::InsufficientFunds(format!(
                    "account {} holds {} spendable, payout requires {}",
                    owner_id, account.spendable_balance, amount
                )));
            }
            account.spendable_balance -= amount;
            account.in_flight_balance += amount;
        }

        state
            .transactions
            .insert(transaction.id.clone(), transaction.clone());

        info!(
            transaction_id = %transaction.id,
            account_id = %owner_id,
            direction = %direction,
            amount = %amount,
            "Initiated transaction"
        );

        Ok(transaction)
    }

    /// Assigns the provider reference and moves `Pending → Clearing`.
    ///
    /// The reference is the idempotency key for inbound notifications;
    /// at most one transaction may ever hold it.
    pub fn mark_clearing(&self, transaction_id: &str, provider_ref: &str) -> Result<Transaction> {
        if provider_ref.trim().is_empty() {
            return Err(AppError::validation("Provider reference cannot be empty"));
        }

        let mut state = self.write_state();

        let current_status = state
            .transactions
            .get(transaction_id)
            .map(|tx| tx.status)
            .ok_or_else(|| {
                AppError::not_found(format!("Transaction '{}' not found", transaction_id))
            })?;

        if current_status != TransactionStatus::Pending {
            error!(
                transaction_id = %transaction_id,
                status = %current_status,
                "Refusing to mark a non-pending transaction as clearing"
            );
            return Err(AppError::IllegalTransition(format!(
                "transaction {} is {}, only pending transactions can move to clearing",
                transaction_id, current_status
            )));
        }

        if let Some(holder) = state.by_provider_ref.get(provider_ref) {
            return Err(AppError::DuplicateProviderRef(format!(
                "provider ref {} already belongs to transaction {}",
                provider_ref, holder
            )));
        }

        state
            .by_provider_ref
            .insert(provider_ref.to_string(), transaction_id.to_string());

        let transaction = state
            .transactions
            .get_mut(transaction_id)
            .ok_or_else(|| AppError::internal("transaction vanished under the write lock"))?;
        transaction.provider_ref = Some(provider_ref.to_string());
        transaction.status = TransactionStatus::Clearing;

        debug!(
            transaction_id = %transaction_id,
            provider_ref = %provider_ref,
            "Transaction clearing"
        );

        Ok(transaction.clone())
    }

    /// Resolves a transaction by its id.
    pub fn resolve_by_id(
        &self,
        transaction_id: &str,
        outcome: SettlementOutcome,
    ) -> Result<Resolution> {
        let mut state = self.write_state();
        Self::resolve_locked(&mut state, transaction_id, outcome)
    }

    /// Resolves a transaction by the provider's reference.
    ///
    /// An unknown reference is an orphan notification: the caller logs
    /// and acknowledges it, nothing is mutated.
    pub fn resolve_by_provider_ref(
        &self,
        provider_ref: &str,
        outcome: SettlementOutcome,
    ) -> Result<Resolution> {
        let mut state = self.write_state();

        let transaction_id = state
            .by_provider_ref
            .get(provider_ref)
            .cloned()
            .ok_or_else(|| {
                AppError::OrphanNotification(format!(
                    "no transaction holds provider ref {}",
                    provider_ref
                ))
            })?;

        Self::resolve_locked(&mut state, &transaction_id, outcome)
    }

    /// Applies a terminal outcome under the per-record guard.
    ///
    /// Already-terminal transactions resolve to a no-op returning the
    /// existing state; that is what makes duplicate webhook delivery
    /// and the webhook/sweeper race safe. Resolving a transaction that
    /// is still pending is a genuine guard violation.
    fn resolve_locked(
        state: &mut LedgerState,
        transaction_id: &str,
        outcome: SettlementOutcome,
    ) -> Result<Resolution> {
        let (account_id, direction, amount) = {
            let transaction = state.transactions.get(transaction_id).ok_or_else(|| {
                AppError::not_found(format!("Transaction '{}' not found", transaction_id))
            })?;

            match transaction.status {
                TransactionStatus::Success | TransactionStatus::Failed => {
                    debug!(
                        transaction_id = %transaction_id,
                        status = %transaction.status,
                        "Resolve on terminal transaction is a no-op"
                    );
                    return Ok(Resolution {
                        transaction: transaction.clone(),
                        newly_resolved: false,
                    });
                }
                TransactionStatus::Pending => {
                    error!(
                        transaction_id = %transaction_id,
                        "Attempted to resolve a pending transaction with no provider ref"
                    );
                    return Err(AppError::IllegalTransition(format!(
                        "transaction {} is pending; only clearing transactions can be resolved",
                        transaction_id
                    )));
                }
                TransactionStatus::Clearing => (
                    transaction.account_id.clone(),
                    transaction.direction,
                    transaction.amount,
                ),
            }
        };

        {
            let account = state.accounts.get_mut(&account_id).ok_or_else(|| {
                AppError::internal(format!(
                    "account {} missing for transaction {}",
                    account_id, transaction_id
                ))
            })?;

            match (direction, outcome) {
                // funds have left permanently
                (Direction::Debit, SettlementOutcome::Success) => {
                    account.in_flight_balance -= amount;
                }
                // reversal: the reservation returns to spendable
                (Direction::Debit, SettlementOutcome::Failed) => {
                    account.in_flight_balance -= amount;
                    account.spendable_balance += amount;
                }
                (Direction::Credit, SettlementOutcome::Success) => {
                    account.spendable_balance += amount;
                }
                // funds were never added
                (Direction::Credit, SettlementOutcome::Failed) => {}
            }
        }

        let transaction = state
            .transactions
            .get_mut(transaction_id)
            .ok_or_else(|| AppError::internal("transaction vanished under the write lock"))?;
        transaction.status = outcome.status();
        transaction.resolved_at = Some(Utc::now());

        info!(
            transaction_id = %transaction_id,
            account_id = %account_id,
            outcome = %transaction.status,
            amount = %amount,
            "Transaction resolved"
        );

        Ok(Resolution {
            transaction: transaction.clone(),
            newly_resolved: true,
        })
    }

    /// Fails a transaction that never obtained a provider reference,
    /// releasing any debit reservation. Used for provider-call
    /// fast-fails and local cancellation.
    pub fn fail_pending(&self, transaction_id: &str) -> Result<Transaction> {
        let mut state = self.write_state();

        let (account_id, direction, amount) = {
            let transaction = state.transactions.get(transaction_id).ok_or_else(|| {
                AppError::not_found(format!("Transaction '{}' not found", transaction_id))
            })?;

            if transaction.status != TransactionStatus::Pending
                || transaction.provider_ref.is_some()
            {
                return Err(AppError::IllegalTransition(format!(
                    "transaction {} is {}; only pending transactions without a provider ref can be failed locally",
                    transaction_id, transaction.status
                )));
            }

            (
                transaction.account_id.clone(),
                transaction.direction,
                transaction.amount,
            )
        };

        if direction == Direction::Debit {
            let account = state.accounts.get_mut(&account_id).ok_or_else(|| {
                AppError::internal(format!(
                    "account {} missing for transaction {}",
                    account_id, transaction_id
                ))
            })?;
            account.in_flight_balance -= amount;
            account.spendable_balance += amount;
        }

        let transaction = state
            .transactions
            .get_mut(transaction_id)
            .ok_or_else(|| AppError::internal("transaction vanished under the write lock"))?;
        transaction.status = TransactionStatus::Failed;
        transaction.resolved_at = Some(Utc::now());

        info!(
            transaction_id = %transaction_id,
            account_id = %account_id,
            "Pending transaction failed locally, reservation released"
        );

        Ok(transaction.clone())
    }

    pub fn get(&self, transaction_id: &str) -> Result<Transaction> {
        self.read_state()
            .transactions
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| {
                AppError::not_found(format!("Transaction '{}' not found", transaction_id))
            })
    }

    pub fn find_by_provider_ref(&self, provider_ref: &str) -> Option<Transaction> {
        let state = self.read_state();
        let transaction_id = state.by_provider_ref.get(provider_ref)?;
        state.transactions.get(transaction_id).cloned()
    }

    pub fn account(&self, owner_id: &str) -> Option<Account> {
        self.read_state().accounts.get(owner_id).cloned()
    }

    /// Clearing transactions created at or before `cutoff`, the
    /// sweeper's candidates for an authoritative provider status query.
    pub fn stale_clearing(&self, cutoff: DateTime<Utc>) -> Vec<Transaction> {
        self.read_state()
            .transactions
            .values()
            .filter(|tx| tx.status == TransactionStatus::Clearing && tx.created_at <= cutoff)
            .cloned()
            .collect()
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}
