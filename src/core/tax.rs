use super::types::{FilingStatus, TaxComponent, TaxEstimate, TaxInputs};

pub const FEDERAL_INCOME_TAX: &str = "Federal Income Tax";
pub const STATE_INCOME_TAX: &str = "State Income Tax";
pub const MEDICARE: &str = "Medicare";
pub const SOCIAL_SECURITY: &str = "Social Security";

const JOINT_FLAT_FEDERAL_RATE: f64 = 0.18;
const STATE_RATE: f64 = 0.05;
const MEDICARE_RATE: f64 = 0.0145;
const SOCIAL_SECURITY_RATE: f64 = 0.062;
const SOCIAL_SECURITY_WAGE_BASE: f64 = 147_000.0;

#[derive(Debug, Clone, Copy)]
pub struct TaxBracket {
    pub lower: f64,
    /// Inclusive; `None` for the top bracket.
    pub upper: Option<f64>,
    pub rate: f64,
    /// Tax owed on income up to `lower`.
    pub base: f64,
}

// The 210k and 520k bases are taken as published and do not equal the
// cumulative tax at the top of the preceding bracket.
pub const SINGLE_FEDERAL_BRACKETS: &[TaxBracket] = &[
    TaxBracket {
        lower: 0.0,
        upper: Some(10_000.0),
        rate: 0.10,
        base: 0.0,
    },
    TaxBracket {
        lower: 10_000.0,
        upper: Some(40_000.0),
        rate: 0.12,
        base: 1_000.0,
    },
    TaxBracket {
        lower: 40_000.0,
        upper: Some(85_000.0),
        rate: 0.22,
        base: 4_600.0,
    },
    TaxBracket {
        lower: 85_000.0,
        upper: Some(165_000.0),
        rate: 0.24,
        base: 14_500.0,
    },
    TaxBracket {
        lower: 165_000.0,
        upper: Some(210_000.0),
        rate: 0.32,
        base: 33_700.0,
    },
    TaxBracket {
        lower: 210_000.0,
        upper: Some(520_000.0),
        rate: 0.35,
        base: 47_900.0,
    },
    TaxBracket {
        lower: 520_000.0,
        upper: None,
        rate: 0.37,
        base: 157_500.0,
    },
];

pub fn estimate_tax(inputs: &TaxInputs) -> TaxEstimate {
    let total_income = inputs.salary + inputs.other_income;
    let taxable_income = (total_income - inputs.deductions).max(0.0);

    let federal = federal_income_tax(taxable_income, inputs.filing_status);
    let state = state_income_tax(taxable_income);
    let medicare = medicare_tax(total_income);
    let social_security = social_security_tax(total_income);

    let total_tax = federal + state + medicare + social_security;
    let effective_rate = if total_income > 0.0 {
        total_tax / total_income * 100.0
    } else {
        0.0
    };

    TaxEstimate {
        total_income,
        taxable_income,
        total_tax,
        effective_rate,
        breakdown: vec![
            TaxComponent {
                name: FEDERAL_INCOME_TAX,
                amount: federal,
            },
            TaxComponent {
                name: STATE_INCOME_TAX,
                amount: state,
            },
            TaxComponent {
                name: MEDICARE,
                amount: medicare,
            },
            TaxComponent {
                name: SOCIAL_SECURITY,
                amount: social_security,
            },
        ],
    }
}

/// Single filers use the bracket table; every other status pays a flat 18%.
pub fn federal_income_tax(taxable_income: f64, filing_status: FilingStatus) -> f64 {
    let taxable = taxable_income.max(0.0);
    match filing_status {
        FilingStatus::Single => bracket_tax(taxable, SINGLE_FEDERAL_BRACKETS),
        FilingStatus::Married | FilingStatus::HeadOfHousehold => {
            taxable * JOINT_FLAT_FEDERAL_RATE
        }
    }
}

fn bracket_tax(taxable: f64, brackets: &[TaxBracket]) -> f64 {
    let bracket = brackets
        .iter()
        .find(|b| b.upper.is_none_or(|upper| taxable <= upper))
        .or(brackets.last());

    match bracket {
        Some(b) => b.base + (taxable - b.lower) * b.rate,
        None => 0.0,
    }
}

pub fn state_income_tax(taxable_income: f64) -> f64 {
    taxable_income.max(0.0) * STATE_RATE
}

pub fn medicare_tax(total_income: f64) -> f64 {
    total_income.max(0.0) * MEDICARE_RATE
}

pub fn social_security_tax(total_income: f64) -> f64 {
    total_income.clamp(0.0, SOCIAL_SECURITY_WAGE_BASE) * SOCIAL_SECURITY_RATE
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn inputs(salary: f64, other: f64, deductions: f64, status: FilingStatus) -> TaxInputs {
        TaxInputs {
            salary,
            other_income: other,
            deductions,
            filing_status: status,
        }
    }

    #[test]
    fn oracle_single_filer_matches_hand_calculation() {
        // taxable 53,000: 4,600 + 13,000 * 22% = 7,460
        let estimate = estimate_tax(&inputs(60_000.0, 5_000.0, 12_000.0, FilingStatus::Single));

        assert_approx(estimate.total_income, 65_000.0);
        assert_approx(estimate.taxable_income, 53_000.0);
        assert_approx(estimate.component(FEDERAL_INCOME_TAX).unwrap(), 7_460.0);
        assert_approx(estimate.component(STATE_INCOME_TAX).unwrap(), 2_650.0);
        assert_approx(estimate.component(MEDICARE).unwrap(), 942.5);
        assert_approx(estimate.component(SOCIAL_SECURITY).unwrap(), 4_030.0);
        assert_approx(estimate.total_tax, 15_082.5);
        assert_approx(estimate.effective_rate, 15_082.5 / 65_000.0 * 100.0);
    }

    #[test]
    fn breakdown_has_four_components_in_fixed_order() {
        let estimate = estimate_tax(&inputs(80_000.0, 0.0, 0.0, FilingStatus::Married));
        let names: Vec<&str> = estimate.breakdown.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![FEDERAL_INCOME_TAX, STATE_INCOME_TAX, MEDICARE, SOCIAL_SECURITY]
        );
    }

    #[test]
    fn first_bracket_boundary_taxes_exactly_one_thousand() {
        let deductions = 13_850.0;
        let estimate = estimate_tax(&inputs(
            10_000.0 + deductions,
            0.0,
            deductions,
            FilingStatus::Single,
        ));
        assert_eq!(estimate.taxable_income, 10_000.0);
        assert_eq!(estimate.component(FEDERAL_INCOME_TAX), Some(1_000.0));
    }

    #[test]
    fn lower_brackets_are_continuous_at_thresholds() {
        for threshold in [10_000.0, 40_000.0, 85_000.0, 165_000.0] {
            let at = federal_income_tax(threshold, FilingStatus::Single);
            let above = federal_income_tax(threshold + 0.01, FilingStatus::Single);
            assert!(
                (above - at).abs() < 0.01,
                "jump at {threshold}: {at} -> {above}"
            );
        }
    }

    #[test]
    fn upper_brackets_use_published_base_amounts() {
        assert_approx(federal_income_tax(210_000.0, FilingStatus::Single), 48_100.0);
        assert_approx(federal_income_tax(210_000.5, FilingStatus::Single), 47_900.175);
        assert_approx(federal_income_tax(520_000.0, FilingStatus::Single), 156_400.0);
        assert_approx(federal_income_tax(600_000.0, FilingStatus::Single), 187_100.0);
    }

    #[test]
    fn social_security_is_capped_at_wage_base() {
        let estimate = estimate_tax(&inputs(200_000.0, 0.0, 0.0, FilingStatus::Single));
        assert_approx(
            estimate.component(SOCIAL_SECURITY).unwrap(),
            147_000.0 * 0.062,
        );
        assert_approx(estimate.component(MEDICARE).unwrap(), 200_000.0 * 0.0145);
    }

    #[test]
    fn payroll_taxes_ignore_deductions() {
        let estimate = estimate_tax(&inputs(30_000.0, 0.0, 50_000.0, FilingStatus::Single));
        assert_eq!(estimate.taxable_income, 0.0);
        assert_eq!(estimate.component(FEDERAL_INCOME_TAX), Some(0.0));
        assert_eq!(estimate.component(STATE_INCOME_TAX), Some(0.0));
        assert_approx(estimate.component(MEDICARE).unwrap(), 435.0);
        assert_approx(estimate.component(SOCIAL_SECURITY).unwrap(), 1_860.0);
    }

    #[test]
    fn zero_income_reports_zero_effective_rate() {
        let estimate = estimate_tax(&inputs(0.0, 0.0, 5_000.0, FilingStatus::HeadOfHousehold));
        assert_eq!(estimate.total_tax, 0.0);
        assert_eq!(estimate.effective_rate, 0.0);
        assert!(!estimate.effective_rate.is_nan());
    }

    #[test]
    fn married_and_head_of_household_use_flat_rate() {
        let married = federal_income_tax(53_000.0, FilingStatus::Married);
        let head = federal_income_tax(53_000.0, FilingStatus::HeadOfHousehold);
        assert_approx(married, 9_540.0);
        assert_approx(head, 9_540.0);
    }

    #[test]
    fn filing_statuses_diverge_on_both_sides_of_the_bracket_rate() {
        // Single's average federal rate is below 18% at modest income and above it at high income.
        let low_single = federal_income_tax(53_000.0, FilingStatus::Single);
        let low_married = federal_income_tax(53_000.0, FilingStatus::Married);
        assert!(low_single < low_married);

        let high_single = federal_income_tax(300_000.0, FilingStatus::Single);
        let high_married = federal_income_tax(300_000.0, FilingStatus::Married);
        assert_approx(high_single, 79_400.0);
        assert_approx(high_married, 54_000.0);
        assert!(high_single > high_married);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_breakdown_sums_to_total_and_components_are_non_negative(
            salary in 0u32..2_000_000,
            other in 0u32..500_000,
            deductions in 0u32..400_000,
            status_idx in 0u8..3,
        ) {
            let status = match status_idx {
                0 => FilingStatus::Single,
                1 => FilingStatus::Married,
                _ => FilingStatus::HeadOfHousehold,
            };
            let estimate = estimate_tax(&inputs(
                salary as f64,
                other as f64,
                deductions as f64,
                status,
            ));

            prop_assert_eq!(estimate.breakdown.len(), 4);
            let summed: f64 = estimate.breakdown.iter().map(|c| c.amount).sum();
            let scale = estimate.total_tax.abs().max(1.0);
            prop_assert!((summed - estimate.total_tax).abs() <= 1e-9 * scale);
            for component in &estimate.breakdown {
                prop_assert!(component.amount >= 0.0);
            }

            let total_income = salary as f64 + other as f64;
            if total_income > 0.0 {
                let expected = estimate.total_tax / total_income * 100.0;
                prop_assert!((estimate.effective_rate - expected).abs() <= 1e-9);
            } else {
                prop_assert_eq!(estimate.effective_rate, 0.0);
            }
        }
    }
}
