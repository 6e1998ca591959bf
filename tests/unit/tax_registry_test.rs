// Effective-dated config resolution: versioned law rows, supersession,
// and the ambiguity tie-break.

use chrono::NaiveDate;
use paykesh::core::AppError;
use paykesh::modules::taxes::models::{GraduatedBand, RateModel, TaxConfig, TaxType};
use paykesh::modules::taxes::services::TaxConfigRegistry;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn income_tax_config(relief: Decimal, from: NaiveDate) -> TaxConfig {
    TaxConfig::new(
        TaxType::IncomeTax,
        RateModel::GraduatedBands {
            bands: vec![
                GraduatedBand {
                    up_to: Some(dec!(24000)),
                    rate: dec!(0.10),
                },
                GraduatedBand {
                    up_to: None,
                    rate: dec!(0.30),
                },
            ],
            personal_relief: relief,
        },
        from,
    )
    .unwrap()
}

#[test]
fn test_resolution_tracks_law_versions() {
    let registry = TaxConfigRegistry::new();
    registry
        .register(income_tax_config(dec!(2400), date(2023, 7, 1)))
        .unwrap();
    registry
        .register(income_tax_config(dec!(3000), date(2026, 1, 1)))
        .unwrap();

    // a date under the old law still resolves the old row, so
    // historical payroll runs stay reproducible
    let old = registry
        .resolve(TaxType::IncomeTax, date(2024, 6, 30))
        .unwrap();
    assert_eq!(old.effective_from, date(2023, 7, 1));
    match old.rate_model {
        RateModel::GraduatedBands {
            personal_relief, ..
        } => assert_eq!(personal_relief, dec!(2400)),
        _ => panic!("expected graduated model"),
    }

    let new = registry
        .resolve(TaxType::IncomeTax, date(2026, 3, 15))
        .unwrap();
    assert_eq!(new.effective_from, date(2026, 1, 1));

    // before either law existed
    assert!(matches!(
        registry.resolve(TaxType::IncomeTax, date(2023, 6, 30)),
        Err(AppError::ConfigNotFound(_))
    ));
}

#[test]
fn test_registering_a_successor_closes_the_predecessor() {
    let registry = TaxConfigRegistry::new();
    registry
        .register(income_tax_config(dec!(2400), date(2023, 7, 1)))
        .unwrap();
    registry
        .register(income_tax_config(dec!(3000), date(2026, 1, 1)))
        .unwrap();

    let history = registry.history(TaxType::IncomeTax);
    assert_eq!(history.len(), 2);
    // newest first
    assert_eq!(history[0].effective_from, date(2026, 1, 1));
    assert_eq!(history[0].effective_to, None);
    assert_eq!(history[1].effective_to, Some(date(2026, 1, 1)));

    // the boundary day belongs to the successor
    let at_boundary = registry
        .resolve(TaxType::IncomeTax, date(2026, 1, 1))
        .unwrap();
    assert_eq!(at_boundary.effective_from, date(2026, 1, 1));
}

#[test]
fn test_overlapping_claims_pick_latest_effective_from() {
    let registry = TaxConfigRegistry::new();
    registry
        .register(income_tax_config(dec!(2400), date(2023, 7, 1)))
        .unwrap();
    registry
        .register(income_tax_config(dec!(3000), date(2024, 1, 1)))
        .unwrap();
    // a back-dated open-ended row overlaps the 2024 row from here on
    registry
        .register(income_tax_config(dec!(2800), date(2023, 10, 1)))
        .unwrap();

    let winner = registry
        .resolve(TaxType::IncomeTax, date(2025, 6, 30))
        .unwrap();
    assert_eq!(winner.effective_from, date(2024, 1, 1));
}

#[test]
fn test_seeded_rule_set_covers_all_types() {
    let registry = TaxConfigRegistry::new();
    registry.seed_defaults().unwrap();

    let active = registry.active_on(date(2025, 6, 30));
    assert_eq!(active.len(), 5);

    // the health levy only exists from October 2024
    assert!(matches!(
        registry.resolve(TaxType::HealthLevy, date(2024, 9, 30)),
        Err(AppError::ConfigNotFound(_))
    ));
    assert!(registry
        .resolve(TaxType::HealthLevy, date(2024, 10, 1))
        .is_ok());

    // pension tiers land with the February 2025 rates
    assert!(matches!(
        registry.resolve(TaxType::PensionTier1, date(2025, 1, 31)),
        Err(AppError::ConfigNotFound(_))
    ));
}

#[test]
fn test_invalid_rate_model_is_rejected_at_registration() {
    let registry = TaxConfigRegistry::new();

    let bogus = TaxConfig::new(
        TaxType::HousingLevy,
        RateModel::FlatPercentage {
            rate: dec!(0.015),
            cap: None,
            min_amount: None,
        },
        date(2025, 2, 1),
    )
    .unwrap();

    // mutate the model after construction to simulate a bad row
    let mut bogus = bogus;
    bogus.rate_model = RateModel::FlatPercentage {
        rate: dec!(1.5),
        cap: None,
        min_amount: None,
    };

    assert!(registry.register(bogus).is_err());
}
