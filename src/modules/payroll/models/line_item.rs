use crate::core::{AppError, Result};
use crate::modules::taxes::models::TaxType;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Worker compensation inputs for one pay period
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EarningsBreakdown {
    pub basic: Decimal,
    #[serde(default)]
    pub allowances: Decimal,
    #[serde(default)]
    pub bonuses: Decimal,
    /// Earnings outside the statutory base (reimbursements and the like)
    #[serde(default)]
    pub other: Decimal,
}

impl EarningsBreakdown {
    /// Gross pay: the statutory deduction base
    pub fn gross(&self) -> Decimal {
        self.basic + self.allowances + self.bonuses
    }

    pub fn validate(&self) -> Result<()> {
        for (label, amount) in [
            ("basic", self.basic),
            ("allowances", self.allowances),
            ("bonuses", self.bonuses),
            ("other", self.other),
        ] {
            if amount < Decimal::ZERO {
                return Err(AppError::validation(format!(
                    "{} earnings cannot be negative",
                    label
                )));
            }
        }
        Ok(())
    }
}

/// One computed statutory deduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionLine {
    pub tax_type: TaxType,
    pub amount: Decimal,
}

/// A fully computed payroll line item
///
/// Derived entirely from the compensation inputs and the tax configs in
/// force on the reference date; never mutated after creation. A fresh
/// calculation produces a fresh line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollLineItem {
    pub worker_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Date whose tax configs governed this computation
    pub reference_date: NaiveDate,
    pub gross_pay: Decimal,
    pub earnings: EarningsBreakdown,
    pub deductions: Vec<DeductionLine>,
    pub total_deductions: Decimal,
    pub other_deductions: Decimal,
    pub net_pay: Decimal,
}

impl PayrollLineItem {
    /// The computed amount for one deduction category, if present
    pub fn deduction(&self, tax_type: TaxType) -> Option<Decimal> {
        self.deductions
            .iter()
            .find(|line| line.tax_type == tax_type)
            .map(|line| line.amount)
    }
}
