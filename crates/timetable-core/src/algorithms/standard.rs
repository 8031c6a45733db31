//! Annuity ("French") amortization: a constant payment per period, whose
//! interest share shrinks as capital is repaid.

use rust_decimal::Decimal;
use tracing::trace;

use super::{check_params, check_principal, AlgorithmKind, Amortization, Calendar};
use crate::decimal::checked_mul;
use crate::params::LoanParameters;
use crate::reconciliation::RoundingAccumulator;
use crate::term::{RoundingDetail, TermAmounts};
use crate::time_value::{capital_portion, interest_portion, PaymentTiming};
use crate::timetable::Timetable;
use crate::types::{Money, Rate};
use crate::TimetableResult;

/// Values carried from one period to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StandardState {
    balance: Money,
    paid_capital: Money,
    paid_interests: Money,
    accumulator: RoundingAccumulator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standard {
    params: LoanParameters,
}

impl Standard {
    pub fn new(params: LoanParameters) -> TimetableResult<Self> {
        check_params(&params, AlgorithmKind::Standard)?;
        Ok(Self { params })
    }

    /// Compute period `index` from the state left by the previous period.
    ///
    /// Interest and capital come from the closed-form annuity split of the
    /// whole principal, so each period is independent of earlier rounding;
    /// only the carried rounding delta links consecutive periods.
    fn step(
        &self,
        state: StandardState,
        index: u32,
        rate: Rate,
        principal: Money,
    ) -> TimetableResult<(StandardState, TermAmounts)> {
        let ctx = self.params.context();
        let duration = self.params.duration_in_periods();
        let deferred = self.params.deferred_in_periods();
        let in_deferral = index <= deferred;

        let theoretical = if in_deferral {
            checked_mul(state.balance, rate, "amount")?
        } else {
            -interest_portion(
                rate,
                index - deferred,
                duration - deferred,
                principal,
                Decimal::ZERO,
                PaymentTiming::End,
            )?
        };
        let (accumulator, settlement) = state.accumulator.settle(ctx.fit(theoretical), ctx);
        if !settlement.adjustment.is_zero() {
            trace!(index, adjustment = %settlement.adjustment, "rounding cent released");
        }

        let capital = if index == duration {
            state.balance
        } else if in_deferral {
            Decimal::ZERO
        } else {
            let exact = -capital_portion(
                rate,
                index - deferred,
                duration - deferred,
                principal,
                Decimal::ZERO,
                PaymentTiming::End,
            )?;
            ctx.round_money(exact).min(state.balance)
        };

        let next = StandardState {
            balance: state.balance - capital,
            paid_capital: state.paid_capital + capital,
            paid_interests: state.paid_interests + settlement.interests,
            accumulator,
        };

        let amounts = TermAmounts {
            payment: settlement.interests + capital,
            capital,
            interests: settlement.interests,
            remaining_capital: next.balance,
            paid_capital: next.paid_capital,
            remaining_interests: Decimal::ZERO,
            paid_interests: next.paid_interests,
            rounding: Some(RoundingDetail {
                balance_start: state.balance,
                balance_end: next.balance,
                theoretical_interests: settlement.theoretical,
                delta: settlement.delta,
                accrued_delta: accumulator.accrued(),
                adjustment: settlement.adjustment,
                paid_total: next.paid_capital + next.paid_interests,
            }),
            due_interests: None,
        };

        Ok((next, amounts))
    }
}

impl Amortization for Standard {
    fn params(&self) -> &LoanParameters {
        &self.params
    }

    fn build_timetable(&self, principal: Money) -> TimetableResult<Timetable> {
        check_principal(&self.params, principal)?;
        let calendar = Calendar::new(&self.params, AlgorithmKind::Standard)?;
        let initial = self.params.initial_values();

        let mut state = StandardState {
            balance: principal - initial.paid_capital,
            paid_capital: initial.paid_capital,
            paid_interests: initial.paid_interests,
            accumulator: RoundingAccumulator::new(initial.accrued_delta_interests),
        };

        let duration = self.params.duration_in_periods();
        let mut rows = Vec::with_capacity((duration - initial.starting_index + 1) as usize);
        for index in initial.starting_index..=duration {
            let rate = calendar.rate(index)?;
            let (next, amounts) = self.step(state, index, rate, principal)?;
            rows.push(amounts);
            state = next;
        }

        calendar.assemble(rows, state.paid_interests)
    }
}
