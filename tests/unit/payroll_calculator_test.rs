// Statutory calculation tests: exact figures from the published rate
// schedules plus property-based checks of the band arithmetic.

use chrono::NaiveDate;
use paykesh::core::AppError;
use paykesh::modules::payroll::models::EarningsBreakdown;
use paykesh::modules::payroll::services::{PayrollCalculator, PayrollInput};
use paykesh::modules::taxes::models::{GraduatedBand, RateModel, TaxType, TierBand};
use paykesh::modules::taxes::services::TaxConfigRegistry;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seeded_calculator() -> PayrollCalculator {
    let registry = Arc::new(TaxConfigRegistry::new());
    registry.seed_defaults().unwrap();
    PayrollCalculator::new(registry)
}

fn input(basic: Decimal) -> PayrollInput {
    PayrollInput {
        worker_id: "worker-1".to_string(),
        period_start: date(2025, 6, 1),
        period_end: date(2025, 6, 30),
        earnings: EarningsBreakdown {
            basic,
            ..Default::default()
        },
        other_deductions: Decimal::ZERO,
        reference_date: None,
    }
}

/// Graduated schedule used by the property tests, relief omitted so
/// the marginal arithmetic is exact.
fn graduated_no_relief() -> RateModel {
    RateModel::GraduatedBands {
        bands: vec![
            GraduatedBand {
                up_to: Some(dec!(24000)),
                rate: dec!(0.10),
            },
            GraduatedBand {
                up_to: Some(dec!(32333)),
                rate: dec!(0.25),
            },
            GraduatedBand {
                up_to: Some(dec!(500000)),
                rate: dec!(0.30),
            },
            GraduatedBand {
                up_to: Some(dec!(800000)),
                rate: dec!(0.325),
            },
            GraduatedBand {
                up_to: None,
                rate: dec!(0.35),
            },
        ],
        personal_relief: Decimal::ZERO,
    }
}

#[test]
fn test_pension_tiers_are_independent_sub_bands() {
    // 6% up to 8,000 and 6% on 8,000-72,000, each computed from gross
    let tier1 = RateModel::TieredBands {
        tiers: vec![TierBand {
            lower: dec!(0),
            upper: Some(dec!(8000)),
            rate: dec!(0.06),
        }],
    };
    let tier2 = RateModel::TieredBands {
        tiers: vec![TierBand {
            lower: dec!(8000),
            upper: Some(dec!(72000)),
            rate: dec!(0.06),
        }],
    };

    assert_eq!(tier1.amount_for(dec!(30000)), dec!(480.00));
    assert_eq!(tier2.amount_for(dec!(30000)), dec!(1320.00));
}

#[test]
fn test_graduated_bands_with_relief() {
    let model = RateModel::GraduatedBands {
        bands: vec![
            GraduatedBand {
                up_to: Some(dec!(24000)),
                rate: dec!(0.10),
            },
            GraduatedBand {
                up_to: Some(dec!(32333)),
                rate: dec!(0.25),
            },
            GraduatedBand {
                up_to: None,
                rate: dec!(0.30),
            },
        ],
        personal_relief: dec!(2400),
    };

    // per band: 2,400 + 2,083.25 + 2,300.10, less the 2,400 relief
    assert_eq!(model.amount_for(dec!(40000)), dec!(4383.35));
}

#[test]
fn test_full_line_item_against_statutory_schedule() {
    let calculator = seeded_calculator();
    let line = calculator.compute(input(dec!(50000))).unwrap();

    assert_eq!(line.gross_pay, dec!(50000));
    assert_eq!(line.deduction(TaxType::PensionTier1), Some(dec!(480.00)));
    assert_eq!(line.deduction(TaxType::PensionTier2), Some(dec!(2520.00)));
    assert_eq!(line.deduction(TaxType::HealthLevy), Some(dec!(1375.00)));
    assert_eq!(line.deduction(TaxType::HousingLevy), Some(dec!(750.00)));
    // income tax is charged on gross net of the pension contributions
    assert_eq!(line.deduction(TaxType::IncomeTax), Some(dec!(6483.35)));
    assert_eq!(line.total_deductions, dec!(11608.35));
    assert_eq!(line.net_pay, dec!(38391.65));
}

#[test]
fn test_line_item_rounds_each_entry_half_up_once() {
    let calculator = seeded_calculator();
    let line = calculator.compute(input(dec!(30123.45))).unwrap();

    assert_eq!(line.deduction(TaxType::PensionTier1), Some(dec!(480.00)));
    // 22,123.45 * 0.06 = 1,327.407 rounds up
    assert_eq!(line.deduction(TaxType::PensionTier2), Some(dec!(1327.41)));
    // 30,123.45 * 0.0275 = 828.394875 rounds down
    assert_eq!(line.deduction(TaxType::HealthLevy), Some(dec!(828.39)));
    assert_eq!(line.deduction(TaxType::HousingLevy), Some(dec!(451.85)));
    assert_eq!(line.deduction(TaxType::IncomeTax), Some(dec!(1079.01)));
    assert_eq!(line.net_pay, dec!(25956.79));

    for deduction in &line.deductions {
        assert!(deduction.amount.scale() <= 2);
    }
}

#[test]
fn test_health_levy_minimum_applies_to_low_gross() {
    let calculator = seeded_calculator();
    let line = calculator.compute(input(dec!(9000))).unwrap();

    // 2.75% of 9,000 = 247.50, lifted to the KES 300 floor
    assert_eq!(line.deduction(TaxType::HealthLevy), Some(dec!(300.00)));
}

#[test]
fn test_negative_net_pay_is_an_error_not_a_clamp() {
    let calculator = seeded_calculator();
    let mut request = input(dec!(10000));
    request.other_deductions = dec!(20000);

    let result = calculator.compute(request);
    assert!(matches!(result, Err(AppError::NegativeNetPay(_))));
}

#[test]
fn test_missing_config_never_defaults_to_zero_rate() {
    let calculator = seeded_calculator();
    let mut request = input(dec!(30000));
    request.reference_date = Some(date(2022, 1, 1));

    let result = calculator.compute(request);
    assert!(matches!(result, Err(AppError::ConfigNotFound(_))));
}

#[test]
fn test_other_earnings_bypass_statutory_base() {
    let calculator = seeded_calculator();

    let mut with_other = input(dec!(50000));
    with_other.earnings.other = dec!(3000);
    let with_other = calculator.compute(with_other).unwrap();

    let without = calculator.compute(input(dec!(50000))).unwrap();

    // same deductions, net pay higher by exactly the other earnings
    assert_eq!(with_other.total_deductions, without.total_deductions);
    assert_eq!(with_other.net_pay, without.net_pay + dec!(3000));
}

proptest! {
    #[test]
    fn graduated_tax_is_non_decreasing(a in 0u64..2_000_000u64, b in 0u64..2_000_000u64) {
        let model = graduated_no_relief();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let tax_lo = model.amount_for(Decimal::from(lo));
        let tax_hi = model.amount_for(Decimal::from(hi));

        prop_assert!(tax_lo <= tax_hi, "tax({}) = {} > tax({}) = {}", lo, tax_lo, hi, tax_hi);
    }

    #[test]
    fn graduated_tax_is_continuous_at_band_boundaries(eps_cents in 1u64..=100u64) {
        let model = graduated_no_relief();
        let eps = Decimal::new(eps_cents as i64, 2);

        // at each boundary the increment is priced at the next band's rate
        let boundaries = [
            (dec!(24000), dec!(0.25)),
            (dec!(32333), dec!(0.30)),
            (dec!(500000), dec!(0.325)),
            (dec!(800000), dec!(0.35)),
        ];

        for (boundary, next_rate) in boundaries {
            let delta = model.amount_for(boundary + eps) - model.amount_for(boundary);
            prop_assert_eq!(delta, next_rate * eps);
        }
    }

    #[test]
    fn graduated_tax_never_exceeds_top_rate(gross in 0u64..2_000_000u64) {
        let model = graduated_no_relief();
        let gross = Decimal::from(gross);
        let tax = model.amount_for(gross);

        prop_assert!(tax >= Decimal::ZERO);
        prop_assert!(tax <= gross * dec!(0.35));
    }

    #[test]
    fn net_pay_identity_holds(
        basic in 10_000u64..200_000u64,
        other_earnings in 0u64..5_000u64,
        other_deductions in 0u64..5_000u64,
    ) {
        let calculator = seeded_calculator();
        let mut request = input(Decimal::from(basic));
        request.earnings.other = Decimal::from(other_earnings);
        request.other_deductions = Decimal::from(other_deductions);

        let line = calculator.compute(request).unwrap();

        prop_assert_eq!(
            line.net_pay,
            line.gross_pay + line.earnings.other - line.total_deductions - line.other_deductions
        );
        prop_assert!(line.net_pay >= Decimal::ZERO);
    }
}
