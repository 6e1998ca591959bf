use crate::core::{AppError, Result};
use crate::modules::webhooks::services::{IngestOutcome, WebhookIngestor};
use actix_web::{post, web, HttpRequest, HttpResponse};
use tracing::info;

/// Signature header carried on every provider notification
pub const SIGNATURE_HEADER: &str = "X-IntaSend-Signature";

/// Receive a provider notification
///
/// POST /webhooks/provider
///
/// The provider retries on any non-2xx, so everything that was handled
/// (idempotent no-ops and orphan discards included) acknowledges with
/// 200. Only a failed signature (401) or a malformed payload (400)
/// refuses the delivery.
#[post("/provider")]
async fn provider_webhook(
    req: HttpRequest,
    body: web::Bytes,
    ingestor: web::Data<WebhookIngestor>,
) -> Result<HttpResponse> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            AppError::InvalidSignature(format!("missing {} header", SIGNATURE_HEADER))
        })?;

    info!(bytes = body.len(), "Received provider webhook");

    let outcome = ingestor.ingest(&body, signature)?;

    let response = match outcome {
        IngestOutcome::Resolved(transaction) => serde_json::json!({
            "status": "resolved",
            "transaction_id": transaction.id,
            "provider_ref": transaction.provider_ref,
        }),
        IngestOutcome::AlreadyResolved(transaction) => serde_json::json!({
            "status": "duplicate",
            "transaction_id": transaction.id,
            "provider_ref": transaction.provider_ref,
        }),
        IngestOutcome::Acknowledged {
            provider_ref,
            state,
        } => serde_json::json!({
            "status": "acknowledged",
            "provider_ref": provider_ref,
            "state": state,
        }),
        IngestOutcome::Orphaned { provider_ref } => serde_json::json!({
            "status": "orphaned",
            "provider_ref": provider_ref,
        }),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Configure webhook routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/webhooks").service(provider_webhook));
}
