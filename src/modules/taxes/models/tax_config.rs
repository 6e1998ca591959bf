use crate::core::{AppError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Statutory deduction categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxType {
    /// Progressive income tax (PAYE)
    #[serde(rename = "income-tax")]
    IncomeTax,

    /// Pension contribution, tier I sub-band (NSSF tier I)
    #[serde(rename = "pension-tier-1")]
    PensionTier1,

    /// Pension contribution, tier II sub-band (NSSF tier II)
    #[serde(rename = "pension-tier-2")]
    PensionTier2,

    /// Social health insurance levy (SHIF)
    #[serde(rename = "health-levy")]
    HealthLevy,

    /// Affordable housing levy
    #[serde(rename = "housing-levy")]
    HousingLevy,
}

impl TaxType {
    /// Deduction order mandated by the statute. Income tax runs last
    /// because its taxable base nets off the pension contributions.
    pub fn statutory_order() -> [TaxType; 5] {
        [
            TaxType::PensionTier1,
            TaxType::PensionTier2,
            TaxType::HealthLevy,
            TaxType::HousingLevy,
            TaxType::IncomeTax,
        ]
    }

    pub fn is_pension(&self) -> bool {
        matches!(self, TaxType::PensionTier1 | TaxType::PensionTier2)
    }
}

impl std::fmt::Display for TaxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaxType::IncomeTax => "income-tax",
            TaxType::PensionTier1 => "pension-tier-1",
            TaxType::PensionTier2 => "pension-tier-2",
            TaxType::HealthLevy => "health-levy",
            TaxType::HousingLevy => "housing-levy",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for TaxType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "income-tax" => Ok(TaxType::IncomeTax),
            "pension-tier-1" => Ok(TaxType::PensionTier1),
            "pension-tier-2" => Ok(TaxType::PensionTier2),
            "health-levy" => Ok(TaxType::HealthLevy),
            "housing-levy" => Ok(TaxType::HousingLevy),
            _ => Err(format!("Invalid tax type: {}", s)),
        }
    }
}

/// One independent flat-rate contribution band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierBand {
    /// Exclusive floor of the band; income at or below it contributes nothing
    pub lower: Decimal,
    /// Inclusive ceiling; `None` leaves the band open-ended
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

/// One marginal band of a graduated schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraduatedBand {
    /// Inclusive upper limit of the band; `None` for the top band
    pub up_to: Option<Decimal>,
    pub rate: Decimal,
}

/// Rate model plus its structured rule parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "kebab-case")]
pub enum RateModel {
    /// Flat percentage of a (possibly capped) base, with an optional
    /// statutory minimum amount
    FlatPercentage {
        rate: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cap: Option<Decimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_amount: Option<Decimal>,
    },

    /// Independent flat-rate bands, each computed over its own sub-range
    /// of the base (never cumulatively subtracted)
    TieredBands { tiers: Vec<TierBand> },

    /// Marginal-rate schedule over ordered bands from zero, less a
    /// non-refundable personal relief floored at zero
    GraduatedBands {
        bands: Vec<GraduatedBand>,
        personal_relief: Decimal,
    },
}

impl RateModel {
    /// Computes the unrounded deduction amount for `base`.
    ///
    /// Rounding is the caller's job and happens once per line item.
    pub fn amount_for(&self, base: Decimal) -> Decimal {
        if base <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        match self {
            RateModel::FlatPercentage {
                rate,
                cap,
                min_amount,
            } => {
                let capped_base = match cap {
                    Some(cap) => base.min(*cap),
                    None => base,
                };
                let amount = capped_base * rate;
                match min_amount {
                    Some(min) => amount.max(*min),
                    None => amount,
                }
            }

            RateModel::TieredBands { tiers } => {
                let mut total = Decimal::ZERO;
                for tier in tiers {
                    let ceiling = match tier.upper {
                        Some(upper) => base.min(upper),
                        None => base,
                    };
                    let portion = (ceiling - tier.lower).max(Decimal::ZERO);
                    total += tier.rate * portion;
                }
                total
            }

            RateModel::GraduatedBands {
                bands,
                personal_relief,
            } => {
                let mut tax = Decimal::ZERO;
                let mut lower = Decimal::ZERO;
                for band in bands {
                    let ceiling = match band.up_to {
                        Some(up_to) => base.min(up_to),
                        None => base,
                    };
                    let portion = (ceiling - lower).max(Decimal::ZERO);
                    tax += band.rate * portion;
                    if let Some(up_to) = band.up_to {
                        lower = up_to;
                    }
                }
                (tax - personal_relief).max(Decimal::ZERO)
            }
        }
    }

    /// Validates rates and band ordering before a config is registered.
    pub fn validate(&self) -> Result<()> {
        match self {
            RateModel::FlatPercentage {
                rate,
                cap,
                min_amount,
            } => {
                validate_rate(*rate)?;
                if let Some(cap) = cap {
                    if *cap <= Decimal::ZERO {
                        return Err(AppError::validation("Cap must be positive"));
                    }
                }
                if let Some(min) = min_amount {
                    if *min < Decimal::ZERO {
                        return Err(AppError::validation("Minimum amount cannot be negative"));
                    }
                }
            }

            RateModel::TieredBands { tiers } => {
                if tiers.is_empty() {
                    return Err(AppError::validation("Tiered model requires at least one tier"));
                }
                let mut previous_upper = Decimal::MIN;
                for tier in tiers {
                    validate_rate(tier.rate)?;
                    if tier.lower < Decimal::ZERO {
                        return Err(AppError::validation("Tier floor cannot be negative"));
                    }
                    if let Some(upper) = tier.upper {
                        if upper <= tier.lower {
                            return Err(AppError::validation(
                                "Tier ceiling must exceed its floor",
                            ));
                        }
                    }
                    if tier.lower < previous_upper {
                        return Err(AppError::validation("Tiers must be ordered and disjoint"));
                    }
                    previous_upper = tier.upper.unwrap_or(Decimal::MAX);
                }
            }

            RateModel::GraduatedBands {
                bands,
                personal_relief,
            } => {
                if bands.is_empty() {
                    return Err(AppError::validation(
                        "Graduated model requires at least one band",
                    ));
                }
                if *personal_relief < Decimal::ZERO {
                    return Err(AppError::validation("Personal relief cannot be negative"));
                }
                let mut previous = Decimal::ZERO;
                for (i, band) in bands.iter().enumerate() {
                    validate_rate(band.rate)?;
                    match band.up_to {
                        Some(up_to) => {
                            if up_to <= previous {
                                return Err(AppError::validation(
                                    "Graduated bands must have strictly increasing limits",
                                ));
                            }
                            previous = up_to;
                        }
                        None => {
                            if i != bands.len() - 1 {
                                return Err(AppError::validation(
                                    "Only the top graduated band may be open-ended",
                                ));
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn validate_rate(rate: Decimal) -> Result<()> {
    if rate < Decimal::ZERO {
        return Err(AppError::validation("Tax rate cannot be negative"));
    }
    if rate > Decimal::ONE {
        return Err(AppError::validation("Tax rate cannot exceed 1.0 (100%)"));
    }
    Ok(())
}

/// Effective-dated, versioned statutory rule row
///
/// Rows are append-only: a new law lands as a new row whose
/// `effective_from` closes the predecessor, so historical payroll runs
/// stay reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    pub id: String,
    pub tax_type: TaxType,
    pub rate_model: RateModel,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TaxConfig {
    pub fn new(
        tax_type: TaxType,
        rate_model: RateModel,
        effective_from: NaiveDate,
    ) -> Result<Self> {
        rate_model.validate()?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            tax_type,
            rate_model,
            effective_from,
            effective_to: None,
            is_active: true,
            notes: None,
        })
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Whether this row governs the given date: effective_from is
    /// inclusive, effective_to exclusive.
    pub fn in_force_on(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.effective_from <= date
            && self.effective_to.map_or(true, |to| to > date)
    }
}
