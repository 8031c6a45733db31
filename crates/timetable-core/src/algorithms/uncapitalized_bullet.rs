//! Bullet loan whose interest is never capitalized: simple interest on the
//! principal accrues into a due-interest balance that is settled together
//! with the principal at maturity.

use rust_decimal::Decimal;

use super::{check_params, check_principal, AlgorithmKind, Amortization, Calendar};
use crate::decimal::checked_mul;
use crate::error::TimetableError;
use crate::params::LoanParameters;
use crate::reconciliation::RoundingAccumulator;
use crate::term::{DueInterestDetail, TermAmounts};
use crate::timetable::Timetable;
use crate::types::Money;
use crate::TimetableResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncapitalizedBullet {
    params: LoanParameters,
}

impl UncapitalizedBullet {
    pub fn new(params: LoanParameters) -> TimetableResult<Self> {
        if params.deferred_in_periods() != 0 {
            return Err(TimetableError::InvalidArgument(
                "Uncapitalized bullet loans cannot have deferred periods".into(),
            ));
        }
        if params.interests_start_date().is_some() {
            return Err(TimetableError::InvalidArgument(
                "Uncapitalized bullet loans do not support an interests start date".into(),
            ));
        }
        check_params(&params, AlgorithmKind::UncapitalizedBullet)?;
        Ok(Self { params })
    }
}

impl Amortization for UncapitalizedBullet {
    fn params(&self) -> &LoanParameters {
        &self.params
    }

    fn build_timetable(&self, principal: Money) -> TimetableResult<Timetable> {
        check_principal(&self.params, principal)?;
        let calendar = Calendar::new(&self.params, AlgorithmKind::UncapitalizedBullet)?;
        let ctx = self.params.context();
        let initial = self.params.initial_values();
        let duration = self.params.duration_in_periods();
        let outstanding = principal - initial.paid_capital;

        let mut accumulator = RoundingAccumulator::new(initial.accrued_delta_interests);
        let mut due = initial.due_interests;
        let mut rows = Vec::with_capacity((duration - initial.starting_index + 1) as usize);

        for index in initial.starting_index..=duration {
            let rate = calendar.rate(index)?;
            let exact = checked_mul(principal, rate, "amount")?;
            let (next, settlement) = accumulator.settle(ctx.fit(exact), ctx);
            accumulator = next;

            let beginning = due;
            due += settlement.interests;

            let amounts = if index == duration {
                // Everything still due is settled with the principal.
                TermAmounts {
                    payment: outstanding + due,
                    capital: outstanding,
                    interests: due,
                    remaining_capital: Decimal::ZERO,
                    paid_capital: principal,
                    remaining_interests: Decimal::ZERO,
                    paid_interests: initial.paid_interests + due,
                    rounding: None,
                    due_interests: Some(DueInterestDetail {
                        beginning_due_interests: beginning,
                        accrued_interests: settlement.interests,
                        ending_due_interests: Decimal::ZERO,
                    }),
                }
            } else {
                TermAmounts {
                    payment: Decimal::ZERO,
                    capital: Decimal::ZERO,
                    interests: Decimal::ZERO,
                    remaining_capital: outstanding,
                    paid_capital: initial.paid_capital,
                    remaining_interests: Decimal::ZERO,
                    paid_interests: initial.paid_interests,
                    rounding: None,
                    due_interests: Some(DueInterestDetail {
                        beginning_due_interests: beginning,
                        accrued_interests: settlement.interests,
                        ending_due_interests: due,
                    }),
                }
            };
            rows.push(amounts);
        }

        calendar.assemble(rows, initial.paid_interests + due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn builder() -> crate::params::LoanParametersBuilder {
        LoanParameters::builder(
            dec!(12000),
            dec!(12),
            NaiveDate::from_ymd_opt(2016, 1, 15).unwrap(),
            12,
        )
    }

    #[test]
    fn test_due_interest_accrues_without_compounding() {
        let algo = UncapitalizedBullet::new(builder().build().unwrap()).unwrap();
        let tt = algo.build_full_timetable().unwrap();

        for (pos, term) in tt.terms()[..11].iter().enumerate() {
            let due = term.amounts.due_interests.as_ref().unwrap();
            assert_eq!(term.payment(), Decimal::ZERO);
            assert_eq!(due.accrued_interests, dec!(120));
            assert_eq!(due.ending_due_interests, dec!(120) * Decimal::from(pos as u32 + 1));
        }
        let last = tt.last().unwrap();
        assert_eq!(last.interests(), dec!(1440));
        assert_eq!(last.payment(), dec!(13440));
        assert_eq!(last.amounts.due_interests.as_ref().unwrap().ending_due_interests, Decimal::ZERO);
    }

    #[test]
    fn test_deferral_is_rejected() {
        let params = builder().deferred_in_periods(2).build().unwrap();
        assert!(matches!(
            UncapitalizedBullet::new(params),
            Err(TimetableError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_interests_start_date_is_rejected() {
        let params = builder()
            .interests_start_date(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap())
            .build()
            .unwrap();
        assert!(UncapitalizedBullet::new(params).is_err());
    }
}
