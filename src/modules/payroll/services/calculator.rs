use crate::core::money::round_half_up;
use crate::core::{AppError, Result};
use crate::modules::payroll::models::{DeductionLine, EarningsBreakdown, PayrollLineItem};
use crate::modules::taxes::models::TaxType;
use crate::modules::taxes::services::TaxConfigRegistry;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Inputs for one payroll computation
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollInput {
    pub worker_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub earnings: EarningsBreakdown,
    #[serde(default)]
    pub other_deductions: Decimal,
    /// Defaults to the period end date
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

/// Turns gross compensation into a full deduction breakdown and net pay
///
/// Deductions run in the statutory order, income tax last: its taxable
/// base is gross pay net of the pension contributions. A missing config
/// aborts the whole line item; partial breakdowns are never returned.
#[derive(Clone)]
pub struct PayrollCalculator {
    registry: Arc<TaxConfigRegistry>,
}

impl PayrollCalculator {
    pub fn new(registry: Arc<TaxConfigRegistry>) -> Self {
        Self { registry }
    }

    pub fn compute(&self, input: PayrollInput) -> Result<PayrollLineItem> {
        if input.worker_id.trim().is_empty() {
            return Err(AppError::validation("Worker ID cannot be empty"));
        }
        if input.period_end < input.period_start {
            return Err(AppError::validation(
                "Period end cannot precede period start",
            ));
        }
        input.earnings.validate()?;
        if input.other_deductions < Decimal::ZERO {
            return Err(AppError::validation("Other deductions cannot be negative"));
        }

        let reference_date = input.reference_date.unwrap_or(input.period_end);
        let gross = input.earnings.gross();

        let mut deductions = Vec::with_capacity(5);
        let mut pension_total = Decimal::ZERO;

        for tax_type in TaxType::statutory_order() {
            let config = self.registry.resolve(tax_type, reference_date)?;

            let base = match tax_type {
                TaxType::IncomeTax => gross - pension_total,
                _ => gross,
            };

            // one rounding per entry, at assembly
            let amount = round_half_up(config.rate_model.amount_for(base));

            if tax_type.is_pension() {
                pension_total += amount;
            }

            debug!(
                worker_id = %input.worker_id,
                tax_type = %tax_type,
                base = %base,
                amount = %amount,
                "Computed deduction"
            );

            deductions.push(DeductionLine { tax_type, amount });
        }

        let total_deductions: Decimal = deductions.iter().map(|line| line.amount).sum();
        let net_pay = round_half_up(
            gross + input.earnings.other - total_deductions - input.other_deductions,
        );

        if net_pay < Decimal::ZERO {
            return Err(AppError::NegativeNetPay(format!(
                "worker {} nets {} for period ending {}; review inputs and configs",
                input.worker_id, net_pay, input.period_end
            )));
        }

        Ok(PayrollLineItem {
            worker_id: input.worker_id,
            period_start: input.period_start,
            period_end: input.period_end,
            reference_date,
            gross_pay: gross,
            earnings: input.earnings,
            deductions,
            total_deductions,
            other_deductions: input.other_deductions,
            net_pay,
        })
    }
}
