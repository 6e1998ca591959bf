use crate::core::{Currency, Result};
use crate::modules::ledger::models::{Account, Direction, SettlementOutcome, Transaction};
use crate::modules::ledger::repositories::{LedgerStore, Resolution};
use crate::modules::notifications::Notifier;
use crate::modules::providers::services::{CollectionRequest, PaymentProvider, PayoutRequest};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Orchestrates funds movements through the provider
///
/// `initiate` never blocks for the provider's full settlement time: it
/// creates the record, fires the provider call, and returns the
/// transaction in clearing (or fast-failed). Resolution happens later
/// through the webhook ingestor or the reconciliation sweeper, both of
/// which converge on the same idempotent resolve path here.
pub struct FundsService {
    ledger: Arc<LedgerStore>,
    provider: Arc<dyn PaymentProvider>,
    notifier: Arc<dyn Notifier>,
}

impl FundsService {
    pub fn new(
        ledger: Arc<LedgerStore>,
        provider: Arc<dyn PaymentProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            ledger,
            provider,
            notifier,
        }
    }

    /// Initiates a funds movement and calls the provider.
    ///
    /// For a debit the amount is reserved atomically with record
    /// creation. A provider error before a reference is issued fails
    /// the transaction fast and releases any reservation; the returned
    /// snapshot is always consistent.
    pub async fn initiate(
        &self,
        owner_id: &str,
        direction: Direction,
        amount: Decimal,
    ) -> Result<Transaction> {
        let transaction = self
            .ledger
            .initiate(owner_id, direction, amount, Currency::KES)?;

        if direction == Direction::Debit {
            info!(
                transaction_id = %transaction.id,
                fee_quote = %self.provider.payout_fee(amount),
                provider = self.provider.name(),
                "Payout fee quoted"
            );
        }

        let ack = match direction {
            Direction::Debit => {
                self.provider
                    .initiate_payout(PayoutRequest {
                        account: owner_id.to_string(),
                        amount,
                        narrative: "Salary payment".to_string(),
                        api_ref: transaction.id.clone(),
                    })
                    .await
            }
            Direction::Credit => {
                self.provider
                    .initiate_collection(CollectionRequest {
                        account: owner_id.to_string(),
                        amount,
                        api_ref: transaction.id.clone(),
                    })
                    .await
            }
        };

        match ack {
            Ok(ack) => {
                info!(
                    transaction_id = %transaction.id,
                    provider_ref = %ack.provider_ref,
                    state = %ack.state,
                    "Provider acknowledged movement"
                );
                match self.ledger.mark_clearing(&transaction.id, &ack.provider_ref) {
                    Ok(clearing) => Ok(clearing),
                    Err(e) => {
                        // a reference collision leaves the record with no
                        // reference, so the reservation must not stay stuck
                        error!(
                            transaction_id = %transaction.id,
                            error = %e,
                            "Could not assign provider reference; failing transaction"
                        );
                        let failed = self.ledger.fail_pending(&transaction.id)?;
                        self.notifier.transaction_resolved(&failed);
                        Err(e)
                    }
                }
            }
            Err(e) => {
                warn!(
                    transaction_id = %transaction.id,
                    error = %e,
                    "Provider call failed before a reference was issued; failing fast"
                );
                let failed = self.ledger.fail_pending(&transaction.id)?;
                self.notifier.transaction_resolved(&failed);
                Ok(failed)
            }
        }
    }

    /// Resolves by provider reference through the idempotent guard;
    /// notifies the sink only on a genuine transition to terminal.
    pub fn resolve_by_provider_ref(
        &self,
        provider_ref: &str,
        outcome: SettlementOutcome,
    ) -> Result<Resolution> {
        let resolution = self.ledger.resolve_by_provider_ref(provider_ref, outcome)?;
        if resolution.newly_resolved {
            self.notifier.transaction_resolved(&resolution.transaction);
        }
        Ok(resolution)
    }

    /// Cancels a transaction that has not yet obtained a provider
    /// reference, releasing any reservation. Once a reference exists
    /// only the provider's verdict can resolve the movement.
    pub fn cancel(&self, transaction_id: &str) -> Result<Transaction> {
        let cancelled = self.ledger.fail_pending(transaction_id)?;
        self.notifier.transaction_resolved(&cancelled);
        Ok(cancelled)
    }

    pub fn transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.ledger.get(transaction_id)
    }

    pub fn balance(&self, owner_id: &str) -> Result<Account> {
        self.ledger
            .account(owner_id)
            .ok_or_else(|| crate::core::AppError::not_found(format!("Account '{}'", owner_id)))
    }
}
