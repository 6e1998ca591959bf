use crate::modules::ledger::models::Transaction;
use tracing::info;

/// Fire-and-forget sink for terminal transaction outcomes
///
/// Invoked once per newly terminal transaction. Delivery is a courtesy
/// to downstream notification channels and is never part of the
/// settlement invariant.
pub trait Notifier: Send + Sync {
    fn transaction_resolved(&self, transaction: &Transaction);
}

/// Default sink that emits a structured log line
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn transaction_resolved(&self, transaction: &Transaction) {
        info!(
            transaction_id = %transaction.id,
            account_id = %transaction.account_id,
            direction = %transaction.direction,
            amount = %transaction.amount,
            status = %transaction.status,
            "Notifying terminal transaction outcome"
        );
    }
}
