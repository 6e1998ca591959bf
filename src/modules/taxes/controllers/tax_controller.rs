use crate::core::{AppError, Result};
use crate::modules::taxes::models::{RateModel, TaxConfig, TaxType};
use crate::modules::taxes::services::TaxConfigRegistry;
use actix_web::{get, post, web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

/// Request body for registering a new statutory rule row
#[derive(Debug, Deserialize)]
pub struct RegisterTaxConfig {
    pub tax_type: TaxType,
    pub rate_model: RateModel,
    pub effective_from: NaiveDate,
    pub notes: Option<String>,
}

/// List the rule set in force on a date
///
/// GET /taxes/configs?date=2025-06-30
#[get("/configs")]
async fn list_active(
    registry: web::Data<TaxConfigRegistry>,
    query: web::Query<ActiveQuery>,
) -> Result<HttpResponse> {
    let date = query
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    Ok(HttpResponse::Ok().json(registry.active_on(date)))
}

/// Full version history for a tax type, newest first
///
/// GET /taxes/configs/{tax_type}/history
#[get("/configs/{tax_type}/history")]
async fn history(
    registry: web::Data<TaxConfigRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let tax_type: TaxType = path
        .into_inner()
        .parse()
        .map_err(AppError::Validation)?;
    Ok(HttpResponse::Ok().json(registry.history(tax_type)))
}

/// Register a new effective-dated rule row (administrative seeding)
///
/// POST /taxes/configs
#[post("/configs")]
async fn register_config(
    registry: web::Data<TaxConfigRegistry>,
    body: web::Json<RegisterTaxConfig>,
) -> Result<HttpResponse> {
    let request = body.into_inner();

    let mut config = TaxConfig::new(request.tax_type, request.rate_model, request.effective_from)?;
    if let Some(notes) = request.notes {
        config = config.with_notes(notes);
    }

    info!(
        tax_type = %config.tax_type,
        effective_from = %config.effective_from,
        "Registering tax config"
    );

    registry.register(config.clone())?;
    Ok(HttpResponse::Created().json(config))
}

/// Configure tax config routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/taxes")
            .service(list_active)
            .service(history)
            .service(register_config),
    );
}
