use crate::core::{AppError, Result};
use crate::modules::ledger::models::Transaction;
use crate::modules::ledger::services::FundsService;
use crate::modules::providers::services::ProviderState;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Provider notification payload
///
/// Payouts carry a tracking id; collections report the invoice id. The
/// remaining fields are informational.
#[derive(Debug, Deserialize)]
pub struct ProviderNotification {
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub invoice_id: Option<String>,
    pub state: ProviderState,
    #[serde(default)]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub api_ref: Option<String>,
    #[serde(default)]
    pub failed_reason: Option<String>,
}

impl ProviderNotification {
    pub fn provider_ref(&self) -> Option<&str> {
        self.tracking_id
            .as_deref()
            .or(self.invoice_id.as_deref())
    }
}

/// What ingesting a notification did
#[derive(Debug)]
pub enum IngestOutcome {
    /// The notification transitioned a transaction to terminal
    Resolved(Transaction),
    /// Duplicate delivery; the transaction was already terminal
    AlreadyResolved(Transaction),
    /// Non-terminal provider state, nothing to transition
    Acknowledged {
        provider_ref: String,
        state: ProviderState,
    },
    /// No transaction holds the reference; logged and discarded
    Orphaned { provider_ref: String },
}

/// Verifies and applies inbound provider notifications
///
/// The pipeline is explicit: verify signature over the exact raw bytes,
/// parse, resolve through the idempotent state-machine path,
/// acknowledge. A failed signature rejects the payload before any of it
/// is processed.
#[derive(Clone)]
pub struct WebhookIngestor {
    webhook_secret: String,
    funds: Arc<FundsService>,
}

impl WebhookIngestor {
    pub fn new(webhook_secret: impl Into<String>, funds: Arc<FundsService>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
            funds,
        }
    }

    /// Constant-time HMAC-SHA256 check of the hex signature header
    /// against the raw request bytes.
    pub fn verify_signature(&self, raw_body: &[u8], signature_header: &str) -> Result<()> {
        let supplied = hex::decode(signature_header.trim()).map_err(|_| {
            AppError::InvalidSignature("signature header is not valid hex".to_string())
        })?;

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| AppError::internal("webhook secret has invalid length"))?;
        mac.update(raw_body);

        mac.verify_slice(&supplied).map_err(|_| {
            AppError::InvalidSignature("signature does not match payload".to_string())
        })
    }

    pub fn ingest(&self, raw_body: &[u8], signature_header: &str) -> Result<IngestOutcome> {
        self.verify_signature(raw_body, signature_header)?;

        let notification: ProviderNotification = serde_json::from_slice(raw_body)?;

        let provider_ref = notification
            .provider_ref()
            .ok_or_else(|| {
                AppError::validation("notification carries no transaction reference")
            })?
            .to_string();

        let Some(outcome) = notification.state.outcome() else {
            info!(
                provider_ref = %provider_ref,
                state = %notification.state,
                "Non-terminal provider notification acknowledged"
            );
            return Ok(IngestOutcome::Acknowledged {
                provider_ref,
                state: notification.state,
            });
        };

        match self.funds.resolve_by_provider_ref(&provider_ref, outcome) {
            Ok(resolution) if resolution.newly_resolved => {
                info!(
                    provider_ref = %provider_ref,
                    transaction_id = %resolution.transaction.id,
                    status = %resolution.transaction.status,
                    "Webhook resolved transaction"
                );
                Ok(IngestOutcome::Resolved(resolution.transaction))
            }
            Ok(resolution) => {
                info!(
                    provider_ref = %provider_ref,
                    transaction_id = %resolution.transaction.id,
                    "Duplicate webhook delivery, transaction already terminal"
                );
                Ok(IngestOutcome::AlreadyResolved(resolution.transaction))
            }
            Err(AppError::OrphanNotification(reason)) => {
                warn!(
                    provider_ref = %provider_ref,
                    reason = %reason,
                    "Orphan notification discarded"
                );
                Ok(IngestOutcome::Orphaned { provider_ref })
            }
            Err(e) => Err(e),
        }
    }
}
