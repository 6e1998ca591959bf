use crate::core::Result;
use crate::modules::ledger::models::SettlementOutcome;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payout (B2C) request to the provider
#[derive(Debug, Clone, Serialize)]
pub struct PayoutRequest {
    /// Destination account as registered with the provider
    pub account: String,
    pub amount: Decimal,
    pub narrative: String,
    /// Our transaction id, echoed back by the provider
    pub api_ref: String,
}

/// Collection (top-up) request to the provider
#[derive(Debug, Clone, Serialize)]
pub struct CollectionRequest {
    pub account: String,
    pub amount: Decimal,
    pub api_ref: String,
}

/// Provider acknowledgment of an initiated movement
#[derive(Debug, Clone)]
pub struct ProviderAck {
    /// The provider's unique reference, our idempotency key
    pub provider_ref: String,
    pub state: ProviderState,
}

/// Provider-reported processing states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProviderState {
    Pending,
    Processing,
    Complete,
    Failed,
}

impl ProviderState {
    /// Maps a provider state to a settlement outcome; non-terminal
    /// states map to `None` and leave the transaction clearing.
    pub fn outcome(&self) -> Option<SettlementOutcome> {
        match self {
            ProviderState::Complete => Some(SettlementOutcome::Success),
            ProviderState::Failed => Some(SettlementOutcome::Failed),
            ProviderState::Pending | ProviderState::Processing => None,
        }
    }
}

impl std::str::FromStr for ProviderState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(ProviderState::Pending),
            "PROCESSING" => Ok(ProviderState::Processing),
            "COMPLETE" => Ok(ProviderState::Complete),
            "FAILED" => Ok(ProviderState::Failed),
            _ => Err(format!("Unknown provider state: {}", s)),
        }
    }
}

impl std::fmt::Display for ProviderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderState::Pending => write!(f, "PENDING"),
            ProviderState::Processing => write!(f, "PROCESSING"),
            ProviderState::Complete => write!(f, "COMPLETE"),
            ProviderState::Failed => write!(f, "FAILED"),
        }
    }
}

/// Payment provider seam for initiating movements and querying status
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Initiate a B2C payout; returns the provider's reference
    async fn initiate_payout(&self, request: PayoutRequest) -> Result<ProviderAck>;

    /// Initiate a collection (top-up) from the owner's funding source
    async fn initiate_collection(&self, request: CollectionRequest) -> Result<ProviderAck>;

    /// Authoritative status of a previously initiated movement
    async fn query_status(&self, provider_ref: &str) -> Result<ProviderState>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Quoted provider fee for a payout of `amount`; informational
    /// only, never part of ledger arithmetic
    fn payout_fee(&self, _amount: Decimal) -> Decimal {
        Decimal::ZERO
    }
}
