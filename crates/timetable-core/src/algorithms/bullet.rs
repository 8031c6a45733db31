//! Balloon repayment: nothing is paid until maturity, when the principal and
//! the interest compounded over the whole life of the loan fall due at once.

use rust_decimal::Decimal;

use super::{check_params, check_principal, AlgorithmKind, Amortization, Calendar};
use crate::decimal::checked_mul;
use crate::params::LoanParameters;
use crate::term::TermAmounts;
use crate::time_value::compound_factor;
use crate::timetable::Timetable;
use crate::types::Money;
use crate::TimetableResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bullet {
    params: LoanParameters,
}

impl Bullet {
    pub fn new(params: LoanParameters) -> TimetableResult<Self> {
        check_params(&params, AlgorithmKind::Bullet)?;
        Ok(Self { params })
    }

    /// Interest owed at maturity: principal compounded every period, minus principal.
    fn total_interests(&self, principal: Money, calendar: &Calendar) -> TimetableResult<Money> {
        let factor = if calendar.is_uniform() {
            compound_factor(
                self.params.periodic_rate(),
                self.params.duration_in_periods(),
            )?
        } else {
            calendar
                .all_rates()?
                .into_iter()
                .try_fold(Decimal::ONE, |acc, rate| {
                    checked_mul(acc, Decimal::ONE + rate, "duration_in_periods")
                })?
        };
        let ctx = self.params.context();
        let interests = checked_mul(principal, factor - Decimal::ONE, "amount")?;
        Ok(ctx.round_money(ctx.fit(interests)))
    }
}

impl Amortization for Bullet {
    fn params(&self) -> &LoanParameters {
        &self.params
    }

    fn build_timetable(&self, principal: Money) -> TimetableResult<Timetable> {
        check_principal(&self.params, principal)?;
        let calendar = Calendar::new(&self.params, AlgorithmKind::Bullet)?;
        let initial = self.params.initial_values();
        let duration = self.params.duration_in_periods();

        let interests_at_maturity = self.total_interests(principal, &calendar)?;
        let total_interests = initial.paid_interests + interests_at_maturity;
        let outstanding = principal - initial.paid_capital;

        let rows = (initial.starting_index..=duration)
            .map(|index| {
                if index == duration {
                    TermAmounts {
                        payment: outstanding + interests_at_maturity,
                        capital: outstanding,
                        interests: interests_at_maturity,
                        remaining_capital: Decimal::ZERO,
                        paid_capital: principal,
                        remaining_interests: Decimal::ZERO,
                        paid_interests: total_interests,
                        rounding: None,
                        due_interests: None,
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
                        due_interests: None,
                    }
                }
            })
            .collect();

        calendar.assemble(rows, total_interests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RateBasis;
    use crate::period::{Period, PeriodUnit};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_interest_is_compounded_not_simple() {
        let params = LoanParameters::new(
            dec!(1000),
            dec!(12),
            NaiveDate::from_ymd_opt(2016, 1, 15).unwrap(),
            2,
        )
        .unwrap();
        let tt = Bullet::new(params).unwrap().build_full_timetable().unwrap();
        // 1000 * (1.01^2 - 1) = 20.1
        assert_eq!(tt.last().unwrap().interests(), dec!(20.10));
        assert_eq!(tt.terms()[0].payment(), Decimal::ZERO);
        assert_eq!(tt.terms()[0].remaining_interests(), dec!(20.10));
    }

    #[test]
    fn test_explicit_dates_drop_leading_date() {
        let date = |m| NaiveDate::from_ymd_opt(2016, m, 1).unwrap();
        let params = LoanParameters::builder(dec!(1000), dec!(12), date(1), 3)
            .term_dates(vec![date(1), date(2), date(3), date(4)])
            .build()
            .unwrap();
        let tt = Bullet::new(params).unwrap().build_full_timetable().unwrap();
        let due: Vec<NaiveDate> = tt.iter().map(|t| t.due_date).collect();
        assert_eq!(due, vec![date(2), date(3), date(4)]);
    }

    #[test]
    fn test_realistic_explicit_dates_accrue_between_listed_dates() {
        let date = |y| NaiveDate::from_ymd_opt(y, 1, 1).unwrap();
        let params = LoanParameters::builder(dec!(1000000), dec!(10), date(2016), 1)
            .term_dates(vec![date(2016), date(2017)])
            .rate_basis(RateBasis::Realistic)
            .build()
            .unwrap();
        let tt = Bullet::new(params).unwrap().build_full_timetable().unwrap();
        assert_eq!(tt.len(), 1);
        assert_eq!(tt.last().unwrap().due_date, date(2017));
        // one anniversary year at 10%, nothing past the last listed date
        assert_eq!(tt.last().unwrap().interests(), dec!(100000));
    }

    #[test]
    fn test_overflowing_compounding_is_an_error() {
        let params = LoanParameters::builder(
            dec!(1000),
            dec!(100),
            NaiveDate::from_ymd_opt(2016, 1, 15).unwrap(),
            100,
        )
        .period(Period::new(1, PeriodUnit::Year).unwrap())
        .build()
        .unwrap();
        let err = Bullet::new(params).unwrap().build_full_timetable().unwrap_err();
        assert!(matches!(err, crate::TimetableError::InvalidInput { .. }));
    }
}
