//! Calendar-accurate day counting.
//!
//! Used when periods follow real calendar spans instead of uniform fractions
//! of a year: leap-year aware year fractions, the one-year gap rule and
//! annual capitalization of interest across multi-year spans.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use crate::decimal::checked_mul;
use crate::error::TimetableError;
use crate::types::Rate;
use crate::TimetableResult;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Signed number of days from `start` to `end`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

fn anniversary(date: NaiveDate, years: u32) -> TimetableResult<NaiveDate> {
    date.checked_add_months(Months::new(years * 12))
        .ok_or_else(|| TimetableError::DateError(format!("{date} plus {years} year(s) overflows")))
}

/// Days between `from` and the same date one year later (365 or 366).
pub fn one_year_span(from: NaiveDate) -> TimetableResult<i64> {
    Ok(days_between(from, anniversary(from, 1)?))
}

/// Actual/Actual (ISDA) year fraction: days falling in each calendar year
/// are divided by that year's length.
pub fn year_fraction(start: NaiveDate, end: NaiveDate) -> Decimal {
    if start >= end {
        return Decimal::ZERO;
    }

    let mut total = Decimal::ZERO;
    let mut current = start;

    while current.year() < end.year() {
        let next_year = match NaiveDate::from_ymd_opt(current.year() + 1, 1, 1) {
            Some(d) => d,
            None => break,
        };
        total += Decimal::from(days_between(current, next_year))
            / Decimal::from(days_in_year(current.year()));
        current = next_year;
    }

    if current < end {
        total += Decimal::from(days_between(current, end))
            / Decimal::from(days_in_year(current.year()));
    }

    total
}

/// Rate accrued over `[start, end)` for an annual rate (as a decimal).
///
/// Interest is capitalized on each anniversary of `start`; the stub after the
/// last anniversary accrues simple interest on its actual/actual fraction.
pub fn capitalized_rate(annual_rate: Rate, start: NaiveDate, end: NaiveDate) -> TimetableResult<Rate> {
    if end < start {
        return Err(TimetableError::DateError(format!(
            "Accrual window ends ({end}) before it starts ({start})"
        )));
    }

    let mut factor = Decimal::ONE;
    let mut cursor = start;
    let mut years = 0u32;
    loop {
        let next = anniversary(start, years + 1)?;
        if next > end {
            break;
        }
        factor = checked_mul(factor, Decimal::ONE + annual_rate, "annual_interest_rate")?;
        cursor = next;
        years += 1;
    }

    let stub = checked_mul(annual_rate, year_fraction(cursor, end), "annual_interest_rate")?;
    factor = checked_mul(factor, Decimal::ONE + stub, "annual_interest_rate")?;
    Ok(factor - Decimal::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2016));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2017));
        assert_eq!(days_in_year(2016), 366);
    }

    #[test]
    fn test_one_year_span_leap_aware() {
        assert_eq!(one_year_span(date(2016, 1, 15)).unwrap(), 366);
        assert_eq!(one_year_span(date(2016, 3, 1)).unwrap(), 365);
        assert_eq!(one_year_span(date(2015, 3, 1)).unwrap(), 366);
    }

    #[test]
    fn test_year_fraction_within_year() {
        assert_eq!(year_fraction(date(2017, 1, 1), date(2018, 1, 1)), Decimal::ONE);
        assert_eq!(
            year_fraction(date(2016, 1, 1), date(2016, 1, 31)),
            dec!(30) / dec!(366)
        );
    }

    #[test]
    fn test_year_fraction_spanning_years() {
        let fraction = year_fraction(date(2015, 12, 1), date(2016, 2, 1));
        let expected = dec!(31) / dec!(365) + dec!(31) / dec!(366);
        assert_eq!(fraction, expected);
    }

    #[test]
    fn test_capitalized_rate_stub_is_simple() {
        let rate = capitalized_rate(dec!(0.10), date(2017, 1, 1), date(2017, 7, 2)).unwrap();
        let expected = dec!(0.10) * dec!(182) / dec!(365);
        assert!((rate - expected).abs() < dec!(0.0000000000000000001));
    }

    #[test]
    fn test_capitalized_rate_compounds_full_years() {
        let rate = capitalized_rate(dec!(0.10), date(2017, 1, 1), date(2019, 1, 1)).unwrap();
        assert_eq!(rate, dec!(0.21));
    }

    #[test]
    fn test_capitalized_rate_rejects_reversed_window() {
        assert!(capitalized_rate(dec!(0.10), date(2017, 2, 1), date(2017, 1, 1)).is_err());
    }
}
