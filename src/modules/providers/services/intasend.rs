use crate::config::ProviderConfig;
use crate::core::{AppError, Result};
use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::provider_trait::{
    CollectionRequest, PaymentProvider, PayoutRequest, ProviderAck, ProviderState,
};

/// IntaSend mobile-money/bank payment client
///
/// Talks the sandbox or live API depending on configuration. Payouts go
/// through the send-money endpoint (M-Pesa B2C), collections through an
/// STK push. Transient failures are retried by the middleware before
/// surfacing as provider errors.
pub struct IntaSendClient {
    client: ClientWithMiddleware,
    base_url: String,
    secret_key: String,
}

impl IntaSendClient {
    pub fn new(config: &ProviderConfig) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }

    fn parse_state(raw: &str) -> ProviderState {
        match raw.parse() {
            Ok(state) => state,
            Err(_) => {
                warn!(state = raw, "Unknown provider state, treating as processing");
                ProviderState::Processing
            }
        }
    }
}

#[derive(Serialize)]
struct SendMoneyTransaction {
    name: String,
    account: String,
    amount: String,
    narrative: String,
}

#[derive(Serialize)]
struct SendMoneyRequest {
    provider: &'static str,
    currency: &'static str,
    transactions: Vec<SendMoneyTransaction>,
}

#[derive(Deserialize)]
struct SendMoneyResponse {
    tracking_id: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Serialize)]
struct StkPushRequest {
    phone_number: String,
    amount: String,
    api_ref: String,
}

#[derive(Deserialize)]
struct StkPushInvoice {
    invoice_id: String,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Deserialize)]
struct StkPushResponse {
    #[serde(default)]
    tracking_id: Option<String>,
    invoice: StkPushInvoice,
}

#[derive(Serialize)]
struct StatusRequest {
    tracking_id: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
}

#[async_trait]
impl PaymentProvider for IntaSendClient {
    async fn initiate_payout(&self, request: PayoutRequest) -> Result<ProviderAck> {
        let url = format!("{}/v1/send-money/initiate/", self.base_url);

        info!(
            account = %request.account,
            amount = %request.amount,
            api_ref = %request.api_ref,
            "Initiating IntaSend payout"
        );

        let body = SendMoneyRequest {
            provider: "MPESA-B2C",
            currency: "KES",
            transactions: vec![SendMoneyTransaction {
                name: "Worker".to_string(),
                account: request.account,
                amount: request.amount.to_string(),
                narrative: request.narrative,
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::provider(format!("IntaSend payout request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(AppError::provider(format!(
                "IntaSend payout error {}: {}",
                status, error_body
            )));
        }

        let payload: SendMoneyResponse = response
            .json()
            .await
            .map_err(|e| AppError::provider(format!("Failed to parse IntaSend response: {}", e)))?;

        let state = payload
            .status
            .as_deref()
            .map(Self::parse_state)
            .unwrap_or(ProviderState::Processing);

        Ok(ProviderAck {
            provider_ref: payload.tracking_id,
            state,
        })
    }

    async fn initiate_collection(&self, request: CollectionRequest) -> Result<ProviderAck> {
        let url = format!("{}/v1/payment/mpesa-stk-push/", self.base_url);

        info!(
            account = %request.account,
            amount = %request.amount,
            api_ref = %request.api_ref,
            "Initiating IntaSend STK push"
        );

        let body = StkPushRequest {
            phone_number: request.account,
            amount: request.amount.to_string(),
            api_ref: request.api_ref,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::provider(format!("IntaSend STK push failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(AppError::provider(format!(
                "IntaSend STK push error {}: {}",
                status, error_body
            )));
        }

        let payload: StkPushResponse = response
            .json()
            .await
            .map_err(|e| AppError::provider(format!("Failed to parse IntaSend response: {}", e)))?;

        let state = payload
            .invoice
            .state
            .as_deref()
            .map(Self::parse_state)
            .unwrap_or(ProviderState::Pending);

        Ok(ProviderAck {
            provider_ref: payload
                .tracking_id
                .unwrap_or(payload.invoice.invoice_id),
            state,
        })
    }

    async fn query_status(&self, provider_ref: &str) -> Result<ProviderState> {
        let url = format!("{}/v1/send-money/status/", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .json(&StatusRequest {
                tracking_id: provider_ref.to_string(),
            })
            .send()
            .await
            .map_err(|e| AppError::provider(format!("IntaSend status query failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(AppError::provider(format!(
                "IntaSend status error {}: {}",
                status, error_body
            )));
        }

        let payload: StatusResponse = response
            .json()
            .await
            .map_err(|e| AppError::provider(format!("Failed to parse IntaSend response: {}", e)))?;

        Ok(Self::parse_state(&payload.status))
    }

    fn name(&self) -> &str {
        "intasend"
    }

    /// IntaSend B2C payout fee schedule:
    /// < 200 KES → 10, 200-1,000 → 20, above → 100
    fn payout_fee(&self, amount: Decimal) -> Decimal {
        if amount < Decimal::from(200) {
            Decimal::from(10)
        } else if amount <= Decimal::from(1000) {
            Decimal::from(20)
        } else {
            Decimal::from(100)
        }
    }
}
