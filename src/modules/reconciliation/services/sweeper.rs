use crate::config::SettlementConfig;
use crate::core::Result;
use crate::modules::ledger::repositories::LedgerStore;
use crate::modules::ledger::services::FundsService;
use crate::modules::providers::services::PaymentProvider;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

/// Safety net for lost webhooks
///
/// On a fixed interval, picks every clearing transaction older than the
/// timeout threshold, asks the provider for its authoritative status,
/// and resolves through the same idempotent path the webhook ingestor
/// uses. A concurrently arriving webhook cannot conflict: whichever
/// call reaches the guard first wins and the other no-ops.
pub struct ReconciliationSweeper {
    ledger: Arc<LedgerStore>,
    provider: Arc<dyn PaymentProvider>,
    funds: Arc<FundsService>,
    sweep_interval: Duration,
    clearing_timeout: chrono::Duration,
}

impl ReconciliationSweeper {
    pub fn new(
        ledger: Arc<LedgerStore>,
        provider: Arc<dyn PaymentProvider>,
        funds: Arc<FundsService>,
        config: &SettlementConfig,
    ) -> Self {
        Self {
            ledger,
            provider,
            funds,
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
            clearing_timeout: chrono::Duration::seconds(config.clearing_timeout_secs as i64),
        }
    }

    /// Run the sweeper forever; spawn as a tokio task at startup.
    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.sweep_interval.as_secs(),
            timeout_secs = self.clearing_timeout.num_seconds(),
            "Starting reconciliation sweeper"
        );

        let mut ticker = interval(self.sweep_interval);

        loop {
            ticker.tick().await;

            match self.sweep().await {
                Ok(resolved) => {
                    if resolved > 0 {
                        info!(resolved = resolved, "Sweep resolved stuck transactions");
                    }
                }
                Err(e) => {
                    error!(error = %e, "Sweep failed");
                }
            }
        }
    }

    /// One pass over stale clearing transactions. Per-transaction
    /// provider errors are logged and skipped; the next pass retries.
    pub async fn sweep(&self) -> Result<usize> {
        let cutoff = Utc::now() - self.clearing_timeout;
        let stale = self.ledger.stale_clearing(cutoff);

        if stale.is_empty() {
            return Ok(0);
        }

        debug!(candidates = stale.len(), "Sweeping stale clearing transactions");

        let mut resolved = 0;

        for transaction in stale {
            let Some(provider_ref) = transaction.provider_ref.as_deref() else {
                // clearing transactions always hold a reference
                continue;
            };

            let state = match self.provider.query_status(provider_ref).await {
                Ok(state) => state,
                Err(e) => {
                    warn!(
                        transaction_id = %transaction.id,
                        provider_ref = %provider_ref,
                        error = %e,
                        "Provider status query failed, retrying next sweep"
                    );
                    continue;
                }
            };

            let Some(outcome) = state.outcome() else {
                debug!(
                    transaction_id = %transaction.id,
                    state = %state,
                    "Transaction still processing at provider"
                );
                continue;
            };

            match self.funds.resolve_by_provider_ref(provider_ref, outcome) {
                Ok(resolution) if resolution.newly_resolved => {
                    info!(
                        transaction_id = %resolution.transaction.id,
                        status = %resolution.transaction.status,
                        "Sweeper resolved transaction from provider status"
                    );
                    resolved += 1;
                }
                Ok(_) => {
                    // a webhook won the race; nothing to do
                }
                Err(e) => {
                    error!(
                        transaction_id = %transaction.id,
                        error = %e,
                        "Failed to apply provider status"
                    );
                }
            }
        }

        Ok(resolved)
    }
}
