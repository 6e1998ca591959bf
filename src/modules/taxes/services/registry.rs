use crate::core::{AppError, Result};
use crate::modules::taxes::models::{GraduatedBand, RateModel, TaxConfig, TaxType, TierBand};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{info, warn};

/// In-memory registry of effective-dated tax rule rows
///
/// Rows are versioned and append-only. Registering a row that supersedes
/// an open-ended predecessor closes the predecessor at the new row's
/// effective date; no row's parameters are ever edited in place.
pub struct TaxConfigRegistry {
    inner: RwLock<HashMap<TaxType, Vec<TaxConfig>>>,
}

impl TaxConfigRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new rule row, closing any open-ended predecessor at
    /// the new row's effective date.
    pub fn register(&self, config: TaxConfig) -> Result<()> {
        config.rate_model.validate()?;

        let mut map = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let rows = map.entry(config.tax_type).or_default();

        for existing in rows.iter_mut() {
            if existing.effective_to.is_none() && existing.effective_from < config.effective_from {
                existing.effective_to = Some(config.effective_from);
                info!(
                    tax_type = %existing.tax_type,
                    superseded = %existing.effective_from,
                    effective_from = %config.effective_from,
                    "Closed superseded tax config"
                );
            }
        }

        rows.push(config);
        rows.sort_by_key(|c| c.effective_from);

        Ok(())
    }

    /// Resolves the rule in force for `tax_type` on `on_date`.
    ///
    /// If more than one interval claims the date (a config-authoring
    /// bug), the latest effective_from wins and the ambiguity is logged
    /// as a data-integrity warning. No match is an error, never a
    /// silent zero rate.
    pub fn resolve(&self, tax_type: TaxType, on_date: NaiveDate) -> Result<TaxConfig> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);

        let matches: Vec<&TaxConfig> = map
            .get(&tax_type)
            .map(|rows| rows.iter().filter(|c| c.in_force_on(on_date)).collect())
            .unwrap_or_default();

        if matches.len() > 1 {
            warn!(
                tax_type = %tax_type,
                on_date = %on_date,
                claimants = matches.len(),
                "Multiple tax configs claim the same date; picking latest effective_from"
            );
        }

        matches
            .into_iter()
            .max_by_key(|c| c.effective_from)
            .cloned()
            .ok_or_else(|| {
                AppError::ConfigNotFound(format!(
                    "no {} rule in force on {}",
                    tax_type, on_date
                ))
            })
    }

    /// Full version history for a tax type, newest first.
    pub fn history(&self, tax_type: TaxType) -> Vec<TaxConfig> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows = map.get(&tax_type).cloned().unwrap_or_default();
        rows.sort_by(|a, b| b.effective_from.cmp(&a.effective_from));
        rows
    }

    /// The rule set in force on a date, one row per resolvable tax type.
    pub fn active_on(&self, date: NaiveDate) -> Vec<TaxConfig> {
        TaxType::statutory_order()
            .into_iter()
            .filter_map(|tax_type| self.resolve(tax_type, date).ok())
            .collect()
    }

    /// Seeds the statutory rule rows the system ships with.
    pub fn seed_defaults(&self) -> Result<()> {
        // PAYE graduated schedule, effective July 1, 2023
        self.register(
            TaxConfig::new(
                TaxType::IncomeTax,
                RateModel::GraduatedBands {
                    bands: vec![
                        GraduatedBand {
                            up_to: Some(Decimal::from(24000)),
                            rate: Decimal::new(1, 1),
                        },
                        GraduatedBand {
                            up_to: Some(Decimal::from(32333)),
                            rate: Decimal::new(25, 2),
                        },
                        GraduatedBand {
                            up_to: Some(Decimal::from(500000)),
                            rate: Decimal::new(3, 1),
                        },
                        GraduatedBand {
                            up_to: Some(Decimal::from(800000)),
                            rate: Decimal::new(325, 3),
                        },
                        GraduatedBand {
                            up_to: None,
                            rate: Decimal::new(35, 2),
                        },
                    ],
                    personal_relief: Decimal::from(2400),
                },
                ymd(2023, 7, 1)?,
            )?
            .with_notes("PAYE rates effective July 1, 2023"),
        )?;

        // SHIF replaced NHIF October 1, 2024: 2.75% of gross, min KES 300
        self.register(
            TaxConfig::new(
                TaxType::HealthLevy,
                RateModel::FlatPercentage {
                    rate: Decimal::new(275, 4),
                    cap: None,
                    min_amount: Some(Decimal::from(300)),
                },
                ymd(2024, 10, 1)?,
            )?
            .with_notes("SHIF 2.75% of gross salary, min KES 300, no cap"),
        )?;

        // NSSF tier I, February 2025 rates: 6% of first KES 8,000
        self.register(
            TaxConfig::new(
                TaxType::PensionTier1,
                RateModel::TieredBands {
                    tiers: vec![TierBand {
                        lower: Decimal::ZERO,
                        upper: Some(Decimal::from(8000)),
                        rate: Decimal::new(6, 2),
                    }],
                },
                ymd(2025, 2, 1)?,
            )?
            .with_notes("NSSF Tier I: 6% of first KES 8,000"),
        )?;

        // NSSF tier II, February 2025 rates: 6% of KES 8,000-72,000
        self.register(
            TaxConfig::new(
                TaxType::PensionTier2,
                RateModel::TieredBands {
                    tiers: vec![TierBand {
                        lower: Decimal::from(8000),
                        upper: Some(Decimal::from(72000)),
                        rate: Decimal::new(6, 2),
                    }],
                },
                ymd(2025, 2, 1)?,
            )?
            .with_notes("NSSF Tier II: 6% of KES 8,001-72,000"),
        )?;

        // Affordable housing levy: 1.5% of gross salary
        self.register(
            TaxConfig::new(
                TaxType::HousingLevy,
                RateModel::FlatPercentage {
                    rate: Decimal::new(15, 3),
                    cap: None,
                    min_amount: None,
                },
                ymd(2025, 2, 1)?,
            )?
            .with_notes("Housing Levy: 1.5% of gross salary"),
        )?;

        info!("Seeded statutory tax configurations");
        Ok(())
    }
}

impl Default for TaxConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AppError::internal(format!("invalid seed date {}-{}-{}", year, month, day)))
}
