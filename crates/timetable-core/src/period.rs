use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TimetableError;
use crate::TimetableResult;

/// Calendar unit of a period cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodUnit {
    fn name(self) -> &'static str {
        match self {
            PeriodUnit::Day => "day",
            PeriodUnit::Week => "week",
            PeriodUnit::Month => "month",
            PeriodUnit::Year => "year",
        }
    }

    /// How many of this unit make up one year.
    fn per_year(self) -> u32 {
        match self {
            PeriodUnit::Day => 365,
            PeriodUnit::Week => 52,
            PeriodUnit::Month => 12,
            PeriodUnit::Year => 1,
        }
    }
}

/// Spacing between two consecutive due dates, e.g. `"1 month"` or `"3 months"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    count: u32,
    unit: PeriodUnit,
}

impl Default for Period {
    fn default() -> Self {
        Self::months(1)
    }
}

impl Period {
    pub fn new(count: u32, unit: PeriodUnit) -> TimetableResult<Self> {
        if count == 0 {
            return Err(TimetableError::invalid_input(
                "period",
                "Period length must be at least 1",
            ));
        }
        Ok(Self { count, unit })
    }

    /// `count` months; a zero count is bumped to one month.
    pub fn months(count: u32) -> Self {
        Self {
            count: count.max(1),
            unit: PeriodUnit::Month,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn unit(&self) -> PeriodUnit {
        self.unit
    }

    /// Number of periods in one year, used to derive a periodic rate from an annual one.
    pub fn periods_per_year(&self) -> Decimal {
        Decimal::from(self.unit.per_year()) / Decimal::from(self.count)
    }

    /// `date` moved forward by `steps` periods.
    ///
    /// Month and year steps are always taken from `date` itself, so a start on
    /// the 31st lands on the last day of shorter months without drifting.
    pub fn advance(&self, date: NaiveDate, steps: u32) -> TimetableResult<NaiveDate> {
        let span = self
            .count
            .checked_mul(steps)
            .ok_or_else(|| TimetableError::DateError(format!("{steps} x {self} overflows")))?;
        let moved = match self.unit {
            PeriodUnit::Day => date.checked_add_days(Days::new(u64::from(span))),
            PeriodUnit::Week => date.checked_add_days(Days::new(u64::from(span) * 7)),
            PeriodUnit::Month => date.checked_add_months(Months::new(span)),
            PeriodUnit::Year => span
                .checked_mul(12)
                .and_then(|months| date.checked_add_months(Months::new(months))),
        };
        moved.ok_or_else(|| TimetableError::DateError(format!("{date} plus {steps} x {self} overflows")))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.count == 1 { "" } else { "s" };
        write!(f, "{} {}{}", self.count, self.unit.name(), plural)
    }
}

impl FromStr for Period {
    type Err = TimetableError;

    /// Parses `"<count> <unit>"`, the unit being day, week, month or year
    /// (singular or plural). A bare unit means a count of one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let mut parts = normalized.split_whitespace();
        let (count, unit) = match (parts.next(), parts.next(), parts.next()) {
            (Some(unit), None, None) => (1, unit),
            (Some(count), Some(unit), None) => {
                let count = count.parse::<u32>().map_err(|_| {
                    TimetableError::invalid_input("period", format!("Unsupported period '{s}'"))
                })?;
                (count, unit)
            }
            _ => {
                return Err(TimetableError::invalid_input(
                    "period",
                    format!("Unsupported period '{s}'"),
                ))
            }
        };

        let unit = match unit {
            "day" | "days" => PeriodUnit::Day,
            "week" | "weeks" => PeriodUnit::Week,
            "month" | "months" => PeriodUnit::Month,
            "year" | "years" => PeriodUnit::Year,
            other => {
                return Err(TimetableError::invalid_input(
                    "period",
                    format!("Unsupported period unit '{other}'"),
                ))
            }
        };
        Period::new(count, unit)
    }
}

impl TryFrom<String> for Period {
    type Error = TimetableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_cadence_keys() {
        assert_eq!("1 month".parse::<Period>().unwrap(), Period::months(1));
        assert_eq!("3 Months".parse::<Period>().unwrap(), Period::months(3));
        assert_eq!(
            "year".parse::<Period>().unwrap(),
            Period::new(1, PeriodUnit::Year).unwrap()
        );
        assert_eq!(
            "2 weeks".parse::<Period>().unwrap(),
            Period::new(2, PeriodUnit::Week).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!("1 fortnight".parse::<Period>().is_err());
        assert!("0 months".parse::<Period>().is_err());
        assert!("-1 month".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
        assert!("1 month extra".parse::<Period>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        assert_eq!(Period::months(1).to_string(), "1 month");
        assert_eq!(Period::months(3).to_string(), "3 months");
    }

    #[test]
    fn test_periods_per_year() {
        assert_eq!(Period::months(1).periods_per_year(), dec!(12));
        assert_eq!(Period::months(3).periods_per_year(), dec!(4));
        assert_eq!(Period::new(1, PeriodUnit::Year).unwrap().periods_per_year(), dec!(1));
    }

    #[test]
    fn test_advance_clamps_to_month_end() {
        let start = date(2016, 1, 31);
        let period = Period::months(1);
        assert_eq!(period.advance(start, 1).unwrap(), date(2016, 2, 29));
        assert_eq!(period.advance(start, 2).unwrap(), date(2016, 3, 31));
        assert_eq!(period.advance(start, 0).unwrap(), start);
    }

    #[test]
    fn test_advance_days_and_years() {
        let start = date(2016, 2, 29);
        assert_eq!(
            Period::new(1, PeriodUnit::Year).unwrap().advance(start, 1).unwrap(),
            date(2017, 2, 28)
        );
        assert_eq!(
            Period::new(2, PeriodUnit::Week).unwrap().advance(start, 1).unwrap(),
            date(2016, 3, 14)
        );
    }
}
