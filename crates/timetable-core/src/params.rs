use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{DecimalContext, Rounding, CENT};
use crate::error::TimetableError;
use crate::period::Period;
use crate::types::{Money, Percentage, Rate};
use crate::TimetableResult;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// How the rate of each period is derived from the annual rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBasis {
    /// Annual rate divided by the number of periods per year.
    #[default]
    Periodic,
    /// Actual calendar days between due dates, capitalized yearly.
    Realistic,
}

/// Running values of a schedule resumed part-way through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialValues {
    pub paid_capital: Money,
    pub paid_interests: Money,
    pub accrued_delta_interests: Money,
    pub due_interests: Money,
    /// Index of the first term to compute.
    pub starting_index: u32,
}

impl Default for InitialValues {
    fn default() -> Self {
        Self {
            paid_capital: Money::ZERO,
            paid_interests: Money::ZERO,
            accrued_delta_interests: Money::ZERO,
            due_interests: Money::ZERO,
            starting_index: 1,
        }
    }
}

fn default_period() -> String {
    "1 month".into()
}

/// Loan configuration record as received from an outer layer, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanConfig {
    pub amount: Money,
    /// Annual rate as a percentage (10 = 10%)
    pub annual_interest_rate: Percentage,
    /// ISO date (`YYYY-MM-DD`) of the first due date
    pub starts_at: String,
    pub duration_in_periods: i64,
    #[serde(default)]
    pub deferred_in_periods: i64,
    #[serde(default = "default_period")]
    pub period: String,
    #[serde(default)]
    pub initial_values: InitialValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_dates: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests_start_date: Option<String>,
    #[serde(default)]
    pub rate_basis: RateBasis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default)]
    pub rounding: Rounding,
}

fn parse_date(field: &str, raw: &str) -> TimetableResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
        TimetableError::invalid_input(field, format!("'{raw}' is not a YYYY-MM-DD date ({e})"))
    })
}

fn non_negative_u32(field: &str, value: i64) -> TimetableResult<u32> {
    u32::try_from(value).map_err(|_| {
        TimetableError::invalid_input(field, format!("{value} is not a valid number of periods"))
    })
}

/// Validated loan parameters shared by every algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanParameters {
    amount: Money,
    annual_interest_rate: Percentage,
    starts_at: NaiveDate,
    duration_in_periods: u32,
    deferred_in_periods: u32,
    period: Period,
    initial_values: InitialValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    term_dates: Option<Vec<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interests_start_date: Option<NaiveDate>,
    rate_basis: RateBasis,
    #[serde(skip)]
    context: DecimalContext,
}

/// Builder for [`LoanParameters`]; all checks run in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct LoanParametersBuilder {
    params: LoanParameters,
}

impl LoanParametersBuilder {
    pub fn deferred_in_periods(mut self, deferred: u32) -> Self {
        self.params.deferred_in_periods = deferred;
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.params.period = period;
        self
    }

    pub fn initial_values(mut self, values: InitialValues) -> Self {
        self.params.initial_values = values;
        self
    }

    pub fn term_dates(mut self, dates: Vec<NaiveDate>) -> Self {
        self.params.term_dates = Some(dates);
        self
    }

    pub fn interests_start_date(mut self, date: NaiveDate) -> Self {
        self.params.interests_start_date = Some(date);
        self
    }

    pub fn rate_basis(mut self, basis: RateBasis) -> Self {
        self.params.rate_basis = basis;
        self
    }

    pub fn context(mut self, context: DecimalContext) -> Self {
        self.params.context = context;
        self
    }

    pub fn build(self) -> TimetableResult<LoanParameters> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl LoanParameters {
    pub fn builder(
        amount: Money,
        annual_interest_rate: Percentage,
        starts_at: NaiveDate,
        duration_in_periods: u32,
    ) -> LoanParametersBuilder {
        LoanParametersBuilder {
            params: LoanParameters {
                amount,
                annual_interest_rate,
                starts_at,
                duration_in_periods,
                deferred_in_periods: 0,
                period: Period::default(),
                initial_values: InitialValues::default(),
                term_dates: None,
                interests_start_date: None,
                rate_basis: RateBasis::default(),
                context: DecimalContext::default(),
            },
        }
    }

    /// Parameters with default deferral, cadence and initial values.
    pub fn new(
        amount: Money,
        annual_interest_rate: Percentage,
        starts_at: NaiveDate,
        duration_in_periods: u32,
    ) -> TimetableResult<Self> {
        Self::builder(amount, annual_interest_rate, starts_at, duration_in_periods).build()
    }

    fn validate(&self) -> TimetableResult<()> {
        if self.amount < Decimal::ZERO {
            return Err(TimetableError::invalid_input(
                "amount",
                "Loan amount cannot be negative",
            ));
        }
        if self.annual_interest_rate < Decimal::ZERO {
            return Err(TimetableError::invalid_input(
                "annual_interest_rate",
                "Interest rate cannot be negative",
            ));
        }
        if self.duration_in_periods == 0 {
            return Err(TimetableError::invalid_input(
                "duration_in_periods",
                "Duration must be at least 1 period",
            ));
        }
        if self.deferred_in_periods >= self.duration_in_periods {
            return Err(TimetableError::invalid_input(
                "deferred_in_periods",
                format!(
                    "Deferral ({}) must be shorter than the duration ({})",
                    self.deferred_in_periods, self.duration_in_periods
                ),
            ));
        }

        let initial = &self.initial_values;
        if initial.starting_index == 0 || initial.starting_index > self.duration_in_periods {
            return Err(TimetableError::invalid_input(
                "initial_values.starting_index",
                format!("Starting index must be within 1..={}", self.duration_in_periods),
            ));
        }
        if initial.paid_capital < Decimal::ZERO || initial.paid_capital > self.amount {
            return Err(TimetableError::invalid_input(
                "initial_values.paid_capital",
                "Paid capital must be between 0 and the loan amount",
            ));
        }
        if initial.paid_interests < Decimal::ZERO {
            return Err(TimetableError::invalid_input(
                "initial_values.paid_interests",
                "Paid interests cannot be negative",
            ));
        }
        if initial.due_interests < Decimal::ZERO {
            return Err(TimetableError::invalid_input(
                "initial_values.due_interests",
                "Due interests cannot be negative",
            ));
        }
        if initial.accrued_delta_interests.abs() >= CENT {
            return Err(TimetableError::invalid_input(
                "initial_values.accrued_delta_interests",
                "Accrued rounding delta must stay within one cent",
            ));
        }
        Ok(())
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn annual_interest_rate(&self) -> Percentage {
        self.annual_interest_rate
    }

    pub fn starts_at(&self) -> NaiveDate {
        self.starts_at
    }

    pub fn duration_in_periods(&self) -> u32 {
        self.duration_in_periods
    }

    pub fn deferred_in_periods(&self) -> u32 {
        self.deferred_in_periods
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn initial_values(&self) -> &InitialValues {
        &self.initial_values
    }

    pub fn term_dates(&self) -> Option<&[NaiveDate]> {
        self.term_dates.as_deref()
    }

    pub fn interests_start_date(&self) -> Option<NaiveDate> {
        self.interests_start_date
    }

    pub fn rate_basis(&self) -> RateBasis {
        self.rate_basis
    }

    pub fn context(&self) -> &DecimalContext {
        &self.context
    }

    /// Annual rate as a decimal fraction.
    pub fn annual_rate(&self) -> Rate {
        self.annual_interest_rate / dec!(100)
    }

    /// Uniform rate of one period.
    pub fn periodic_rate(&self) -> Rate {
        self.context
            .fit(self.annual_rate() / self.period.periods_per_year())
    }

    /// Index of the first term a schedule built from these parameters holds.
    pub fn starting_index(&self) -> u32 {
        self.initial_values.starting_index
    }
}

impl TryFrom<LoanConfig> for LoanParameters {
    type Error = TimetableError;

    fn try_from(config: LoanConfig) -> Result<Self, Self::Error> {
        let starts_at = parse_date("starts_at", &config.starts_at)?;
        let duration = non_negative_u32("duration_in_periods", config.duration_in_periods)?;
        let deferred = non_negative_u32("deferred_in_periods", config.deferred_in_periods)?;
        let period: Period = config.period.parse()?;
        let context = match config.precision {
            Some(precision) => DecimalContext::new(precision, config.rounding)?,
            None => DecimalContext::new(DecimalContext::MAX_PRECISION, config.rounding)?,
        };

        let mut builder = LoanParameters::builder(
            config.amount,
            config.annual_interest_rate,
            starts_at,
            duration,
        )
        .deferred_in_periods(deferred)
        .period(period)
        .initial_values(config.initial_values)
        .rate_basis(config.rate_basis)
        .context(context);

        if let Some(raw_dates) = &config.term_dates {
            let dates = raw_dates
                .iter()
                .map(|raw| parse_date("term_dates", raw))
                .collect::<TimetableResult<Vec<_>>>()?;
            builder = builder.term_dates(dates);
        }
        if let Some(raw) = &config.interests_start_date {
            builder = builder.interests_start_date(parse_date("interests_start_date", raw)?);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LoanConfig {
        serde_json::from_value(serde_json::json!({
            "amount": "10000000",
            "annual_interest_rate": "10",
            "starts_at": "2016-01-15",
            "duration_in_periods": 48
        }))
        .unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let params = LoanParameters::try_from(config()).unwrap();
        assert_eq!(params.deferred_in_periods(), 0);
        assert_eq!(params.period(), Period::months(1));
        assert_eq!(params.starting_index(), 1);
        assert_eq!(params.rate_basis(), RateBasis::Periodic);
        assert_eq!(params.context().rounding(), Rounding::HalfEven);
    }

    #[test]
    fn test_periodic_rate_from_percentage() {
        let params = LoanParameters::try_from(config()).unwrap();
        assert_eq!(params.annual_rate(), dec!(0.1));
        assert_eq!(params.periodic_rate(), dec!(0.1) / dec!(12));
    }

    #[test]
    fn test_unparsable_date_is_rejected() {
        let mut cfg = config();
        cfg.starts_at = "15/01/2016".into();
        let err = LoanParameters::try_from(cfg).unwrap_err();
        assert!(matches!(err, TimetableError::InvalidInput { ref field, .. } if field == "starts_at"));
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        let mut cfg = config();
        cfg.duration_in_periods = -4;
        assert!(LoanParameters::try_from(cfg).is_err());
    }

    #[test]
    fn test_deferral_must_be_shorter_than_duration() {
        let mut cfg = config();
        cfg.deferred_in_periods = 48;
        assert!(LoanParameters::try_from(cfg).is_err());
    }

    #[test]
    fn test_unsupported_period_key() {
        let mut cfg = config();
        cfg.period = "1 fortnight".into();
        assert!(LoanParameters::try_from(cfg).is_err());
    }

    #[test]
    fn test_malformed_term_date_is_rejected() {
        let mut cfg = config();
        cfg.term_dates = Some(vec!["2016-01-15".into(), "soon".into()]);
        let err = LoanParameters::try_from(cfg).unwrap_err();
        assert!(matches!(err, TimetableError::InvalidInput { ref field, .. } if field == "term_dates"));
    }

    #[test]
    fn test_initial_values_are_checked() {
        let mut cfg = config();
        cfg.initial_values.starting_index = 49;
        assert!(LoanParameters::try_from(cfg).is_err());

        let mut cfg = config();
        cfg.initial_values.accrued_delta_interests = dec!(0.01);
        assert!(LoanParameters::try_from(cfg).is_err());

        let mut cfg = config();
        cfg.initial_values.paid_capital = dec!(10000001);
        assert!(LoanParameters::try_from(cfg).is_err());
    }

    #[test]
    fn test_missing_required_field_fails_to_deserialize() {
        let result: Result<LoanConfig, _> = serde_json::from_value(serde_json::json!({
            "amount": "1000",
            "starts_at": "2016-01-15",
            "duration_in_periods": 12
        }));
        assert!(result.is_err());
    }
}
