use crate::core::Result;
use crate::modules::ledger::models::Direction;
use crate::modules::ledger::services::FundsService;
use actix_web::{get, post, web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

/// Request body for a funds operation
#[derive(Debug, Deserialize)]
pub struct FundsRequest {
    pub account_id: String,
    pub direction: Direction,
    pub amount: Decimal,
}

/// Initiate a funds movement (top-up or payout)
///
/// POST /funds/transactions
///
/// Returns the created transaction in pending/clearing, or a
/// fast-failed snapshot when the provider rejected the call outright.
#[post("/transactions")]
async fn initiate_transaction(
    funds: web::Data<FundsService>,
    body: web::Json<FundsRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();

    info!(
        account_id = %request.account_id,
        direction = %request.direction,
        amount = %request.amount,
        "Funds operation requested"
    );

    let transaction = funds
        .initiate(&request.account_id, request.direction, request.amount)
        .await?;

    Ok(HttpResponse::Created().json(transaction))
}

/// Fetch a transaction snapshot
///
/// GET /funds/transactions/{id}
#[get("/transactions/{id}")]
async fn get_transaction(
    funds: web::Data<FundsService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let transaction = funds.transaction(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(transaction))
}

/// Cancel a transaction that has no provider reference yet
///
/// POST /funds/transactions/{id}/cancel
#[post("/transactions/{id}/cancel")]
async fn cancel_transaction(
    funds: web::Data<FundsService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let transaction = funds.cancel(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(transaction))
}

/// Current balances for an account
///
/// GET /funds/accounts/{owner_id}/balance
#[get("/accounts/{owner_id}/balance")]
async fn account_balance(
    funds: web::Data<FundsService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let account = funds.balance(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(account))
}

/// Configure funds operation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/funds")
            .service(initiate_transaction)
            .service(get_transaction)
            .service(cancel_transaction)
            .service(account_balance),
    );
}
