use super::types::{InvestmentProjection, ProjectionInputs, YearlyBalance};

/// Projects a balance forward year by year.
///
/// Each year is split into `periods_per_year` ticks. A tick accrues interest on
/// the running balance first and only then adds the contribution, so a
/// contribution starts earning from the following tick.
pub fn project_investment_growth(inputs: &ProjectionInputs) -> InvestmentProjection {
    let annual_rate = inputs.annual_rate_percent / 100.0;
    let periods_per_year = inputs.contribution_frequency.periods_per_year();
    let period_rate = annual_rate / f64::from(periods_per_year);

    let mut balance = inputs.principal;
    let mut total_interest = 0.0;
    let mut total_contributions = 0.0;
    let mut yearly_breakdown = Vec::with_capacity(inputs.years as usize);

    for year in 1..=inputs.years {
        let mut yearly_interest = 0.0;
        for _ in 0..periods_per_year {
            let interest = balance * period_rate;
            balance += interest;
            yearly_interest += interest;

            if inputs.contribution_amount > 0.0 {
                balance += inputs.contribution_amount;
                total_contributions += inputs.contribution_amount;
            }
        }

        total_interest += yearly_interest;
        yearly_breakdown.push(YearlyBalance {
            year,
            amount: balance,
            interest: yearly_interest,
        });
    }

    InvestmentProjection {
        final_amount: balance,
        total_interest,
        total_contributions,
        yearly_breakdown,
    }
}
