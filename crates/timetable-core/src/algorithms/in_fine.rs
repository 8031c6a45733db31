//! Interest-only loan with the whole principal repaid at maturity.

use rust_decimal::Decimal;
use tracing::warn;

use super::{check_params, check_principal, AlgorithmKind, Amortization, Calendar};
use crate::decimal::checked_mul;
use crate::params::LoanParameters;
use crate::term::TermAmounts;
use crate::timetable::Timetable;
use crate::types::Money;
use crate::TimetableResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFine {
    params: LoanParameters,
}

impl InFine {
    pub fn new(params: LoanParameters) -> TimetableResult<Self> {
        check_params(&params, AlgorithmKind::InFine)?;
        Ok(Self { params })
    }
}

impl Amortization for InFine {
    fn params(&self) -> &LoanParameters {
        &self.params
    }

    fn build_timetable(&self, principal: Money) -> TimetableResult<Timetable> {
        check_principal(&self.params, principal)?;
        let calendar = Calendar::new(&self.params, AlgorithmKind::InFine)?;
        let ctx = self.params.context();
        let initial = self.params.initial_values();
        let duration = self.params.duration_in_periods();

        let exact: Vec<Money> = if calendar.is_uniform() {
            let periodic = checked_mul(principal, self.params.periodic_rate(), "amount")?;
            vec![ctx.fit(periodic); duration as usize]
        } else {
            calendar
                .all_rates()?
                .into_iter()
                .map(|rate| checked_mul(principal, rate, "amount").map(|e| ctx.fit(e)))
                .collect::<TimetableResult<_>>()?
        };
        let rounded: Vec<Money> = exact.iter().map(|e| ctx.round_money(*e)).collect();

        // One reconciliation for the whole loan, settled on the last period.
        let loan_interests = ctx.round_money(exact.iter().copied().sum::<Money>());
        let difference = loan_interests - rounded.iter().copied().sum::<Money>();
        let total_interests = initial.paid_interests
            + rounded[(initial.starting_index - 1) as usize..]
                .iter()
                .copied()
                .sum::<Money>()
            + difference;

        let outstanding = principal - initial.paid_capital;
        let mut paid_capital = initial.paid_capital;
        let mut paid_interests = initial.paid_interests;
        let mut rows = Vec::with_capacity((duration - initial.starting_index + 1) as usize);

        for index in initial.starting_index..=duration {
            let is_last = index == duration;
            let capital = if is_last { outstanding } else { Decimal::ZERO };
            let mut interests = rounded[(index - 1) as usize];
            if is_last {
                interests += difference;
                if interests < Decimal::ZERO {
                    warn!(
                        index,
                        %interests,
                        %difference,
                        "rounding difference exceeds the last period's interest"
                    );
                }
            }

            paid_capital += capital;
            paid_interests += interests;
            rows.push(TermAmounts {
                payment: capital + interests,
                capital,
                interests,
                remaining_capital: principal - paid_capital,
                paid_capital,
                remaining_interests: Decimal::ZERO,
                paid_interests,
                rounding: None,
                due_interests: None,
            });
        }

        calendar.assemble(rows, total_interests)
    }
}
