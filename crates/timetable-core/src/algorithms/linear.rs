//! Constant-capital amortization.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::trace;

use super::{check_params, check_principal, AlgorithmKind, Amortization, Calendar};
use crate::decimal::checked_mul;
use crate::params::LoanParameters;
use crate::reconciliation::RoundingAccumulator;
use crate::term::TermAmounts;
use crate::timetable::Timetable;
use crate::types::{Money, Rate};
use crate::TimetableResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Linear {
    params: LoanParameters,
}

impl Linear {
    pub fn new(params: LoanParameters) -> TimetableResult<Self> {
        check_params(&params, AlgorithmKind::Linear)?;
        Ok(Self { params })
    }

    fn amortizing_periods(&self) -> u32 {
        self.params.duration_in_periods() - self.params.deferred_in_periods()
    }

    /// Unrounded capital repaid by every amortizing period.
    fn capital_share(&self, principal: Money) -> Money {
        principal / Decimal::from(self.amortizing_periods())
    }

    /// Exact principal owed at the start of period `index`.
    fn balance_at(&self, principal: Money, index: u32) -> Money {
        let deferred = self.params.deferred_in_periods();
        if index <= deferred {
            return principal;
        }
        principal - self.capital_share(principal) * Decimal::from(index - deferred - 1)
    }

    /// Exact interest of period `index`.
    fn exact_interests(&self, principal: Money, index: u32, rate: Rate) -> TimetableResult<Money> {
        checked_mul(self.balance_at(principal, index), rate, "amount")
    }

    /// Exact interest over the life of the loan.
    ///
    /// With a uniform rate the balances form an arithmetic series, so the sum
    /// is `principal * rate * (n + 1) / 2` plus the deferred periods.
    fn total_interests(&self, principal: Money, calendar: &Calendar) -> TimetableResult<Money> {
        if calendar.is_uniform() {
            let per_period = checked_mul(principal, self.params.periodic_rate(), "amount")?;
            let n = Decimal::from(self.amortizing_periods());
            let deferred = Decimal::from(self.params.deferred_in_periods());
            let series = checked_mul(per_period, n + Decimal::ONE, "amount")? / dec!(2);
            return Ok(series + checked_mul(per_period, deferred, "amount")?);
        }

        calendar
            .all_rates()?
            .into_iter()
            .zip(1u32..)
            .map(|(rate, index)| self.exact_interests(principal, index, rate))
            .sum()
    }
}

impl Amortization for Linear {
    fn params(&self) -> &LoanParameters {
        &self.params
    }

    fn build_timetable(&self, principal: Money) -> TimetableResult<Timetable> {
        check_principal(&self.params, principal)?;
        let calendar = Calendar::new(&self.params, AlgorithmKind::Linear)?;
        let ctx = self.params.context();
        let initial = self.params.initial_values();
        let duration = self.params.duration_in_periods();
        let deferred = self.params.deferred_in_periods();

        let rounded_share = ctx.round_money(self.capital_share(principal));
        let loan_interests = ctx.round_money(self.total_interests(principal, &calendar)?);

        // Replay the periods already paid so the carried rounding, and the
        // interest they were scheduled to charge, match a full build.
        let mut accumulator = RoundingAccumulator::default();
        let mut scheduled = Decimal::ZERO;
        for index in 1..initial.starting_index {
            let exact = self.exact_interests(principal, index, calendar.rate(index)?)?;
            let (next, settlement) = accumulator.settle(ctx.fit(exact), ctx);
            accumulator = next;
            scheduled += settlement.interests;
        }

        let mut paid_capital = initial.paid_capital;
        let mut paid_interests = initial.paid_interests;
        let mut rows = Vec::with_capacity((duration - initial.starting_index + 1) as usize);

        for index in initial.starting_index..=duration {
            let remaining = principal - paid_capital;
            let capital = if index == duration {
                remaining
            } else if index <= deferred {
                Decimal::ZERO
            } else {
                rounded_share.min(remaining)
            };

            let interests = if index == duration {
                // Whatever the carry left over, never below zero.
                (loan_interests - scheduled).max(Decimal::ZERO)
            } else {
                let exact = self.exact_interests(principal, index, calendar.rate(index)?)?;
                let (next, settlement) = accumulator.settle(ctx.fit(exact), ctx);
                if !settlement.adjustment.is_zero() {
                    trace!(index, adjustment = %settlement.adjustment, "rounding cent released");
                }
                accumulator = next;
                settlement.interests
            };

            scheduled += interests;
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

        calendar.assemble(rows, paid_interests)
    }
}
