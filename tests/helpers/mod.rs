// Shared test infrastructure: a scripted payment provider double and
// settlement fixtures wired the same way main.rs wires production.
#![allow(dead_code)]

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use paykesh::core::{AppError, Result};
use paykesh::modules::ledger::models::{Direction, SettlementOutcome, Transaction};
use paykesh::modules::ledger::repositories::LedgerStore;
use paykesh::modules::ledger::services::FundsService;
use paykesh::modules::notifications::LogNotifier;
use paykesh::modules::providers::services::{
    CollectionRequest, PaymentProvider, PayoutRequest, ProviderAck, ProviderState,
};
use rust_decimal::Decimal;
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Provider double with scriptable acknowledgments and statuses
pub struct ScriptedProvider {
    counter: AtomicUsize,
    fail_next_initiate: AtomicBool,
    statuses: Mutex<HashMap<String, ProviderState>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(1),
            fail_next_initiate: AtomicBool::new(false),
            statuses: Mutex::new(HashMap::new()),
        }
    }

    /// The next initiate call errors before issuing a reference
    pub fn fail_next_initiate(&self) {
        self.fail_next_initiate.store(true, Ordering::SeqCst);
    }

    /// Scripts the status the provider reports for a reference
    pub fn set_status(&self, provider_ref: &str, state: ProviderState) {
        self.statuses
            .lock()
            .unwrap()
            .insert(provider_ref.to_string(), state);
    }

    fn next_ref(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", prefix, n)
    }

    fn take_failure(&self) -> bool {
        self.fail_next_initiate.swap(false, Ordering::SeqCst)
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProvider for ScriptedProvider {
    async fn initiate_payout(&self, _request: PayoutRequest) -> Result<ProviderAck> {
        if self.take_failure() {
            return Err(AppError::provider("scripted payout rejection"));
        }
        Ok(ProviderAck {
            provider_ref: self.next_ref("TRK"),
            state: ProviderState::Processing,
        })
    }

    async fn initiate_collection(&self, _request: CollectionRequest) -> Result<ProviderAck> {
        if self.take_failure() {
            return Err(AppError::provider("scripted collection rejection"));
        }
        Ok(ProviderAck {
            provider_ref: self.next_ref("INV"),
            state: ProviderState::Pending,
        })
    }

    async fn query_status(&self, provider_ref: &str) -> Result<ProviderState> {
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(provider_ref)
            .copied()
            .unwrap_or(ProviderState::Processing))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Settlement fixture wired like production, with the scripted provider
pub fn settlement() -> (Arc<ScriptedProvider>, Arc<LedgerStore>, Arc<FundsService>) {
    let provider = Arc::new(ScriptedProvider::new());
    let store = Arc::new(LedgerStore::new());
    let funds = Arc::new(FundsService::new(
        store.clone(),
        provider.clone(),
        Arc::new(LogNotifier),
    ));
    (provider, store, funds)
}

/// Funds an account through the real top-up path: credit initiate,
/// provider ack, success resolution.
pub async fn top_up(funds: &FundsService, owner_id: &str, amount: Decimal) -> Transaction {
    let tx = funds
        .initiate(owner_id, Direction::Credit, amount)
        .await
        .expect("top-up initiate");
    let provider_ref = tx.provider_ref.clone().expect("top-up provider ref");
    funds
        .resolve_by_provider_ref(&provider_ref, SettlementOutcome::Success)
        .expect("top-up resolve");
    funds.transaction(&tx.id).expect("top-up snapshot")
}

/// Hex HMAC-SHA256 signature over a webhook body
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
