use crate::core::Result;
use crate::modules::payroll::services::{PayrollCalculator, PayrollInput};
use actix_web::{post, web, HttpResponse};
use tracing::info;

/// Compute a full payroll line item
///
/// POST /payroll/compute
///
/// Returns the deduction breakdown and net pay, or a structured error.
/// A line item is all-or-nothing: a missing tax config or a negative
/// net pay fails the whole request.
#[post("/compute")]
async fn compute_payroll(
    calculator: web::Data<PayrollCalculator>,
    body: web::Json<PayrollInput>,
) -> Result<HttpResponse> {
    let input = body.into_inner();

    info!(
        worker_id = %input.worker_id,
        period_end = %input.period_end,
        "Computing payroll line item"
    );

    let line_item = calculator.compute(input)?;
    Ok(HttpResponse::Ok().json(line_item))
}

/// Configure payroll routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/payroll").service(compute_payroll));
}
