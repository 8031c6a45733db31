//! Amortization algorithms.
//!
//! Each algorithm owns its [`LoanParameters`] and builds one [`Timetable`]
//! per call to [`Amortization::build_timetable`]; the call can be repeated
//! with different principal shares to obtain lender schedules of one loan.

pub mod bullet;
pub mod in_fine;
pub mod linear;
pub mod standard;
pub mod uncapitalized_bullet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::day_count::capitalized_rate;
use crate::error::TimetableError;
use crate::params::{LoanParameters, RateBasis};
use crate::term::TermAmounts;
use crate::timetable::{DueDates, Timetable};
use crate::types::{Money, Rate};
use crate::validation::validate_term_dates;
use crate::TimetableResult;

pub use bullet::Bullet;
pub use in_fine::InFine;
pub use linear::Linear;
pub use standard::Standard;
pub use uncapitalized_bullet::UncapitalizedBullet;

/// Names of the supported amortization policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    Standard,
    Linear,
    Bullet,
    InFine,
    UncapitalizedBullet,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 5] = [
        AlgorithmKind::Standard,
        AlgorithmKind::Linear,
        AlgorithmKind::Bullet,
        AlgorithmKind::InFine,
        AlgorithmKind::UncapitalizedBullet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::Standard => "standard",
            AlgorithmKind::Linear => "linear",
            AlgorithmKind::Bullet => "bullet",
            AlgorithmKind::InFine => "in_fine",
            AlgorithmKind::UncapitalizedBullet => "uncapitalized_bullet",
        }
    }

    /// Length an explicit term-date list must have. Bullet lists start with
    /// the date preceding the first due date so the first gap can be checked.
    pub fn expected_term_dates(self, duration_in_periods: u32) -> usize {
        match self {
            AlgorithmKind::Bullet => duration_in_periods as usize + 1,
            _ => duration_in_periods as usize,
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "standard" | "annuity" => Ok(AlgorithmKind::Standard),
            "linear" => Ok(AlgorithmKind::Linear),
            "bullet" => Ok(AlgorithmKind::Bullet),
            "in_fine" | "infine" => Ok(AlgorithmKind::InFine),
            "uncapitalized_bullet" | "uncapitalizedbullet" => {
                Ok(AlgorithmKind::UncapitalizedBullet)
            }
            _ => Err(TimetableError::invalid_input(
                "algorithm",
                format!("Unknown amortization algorithm '{s}'"),
            )),
        }
    }
}

/// Contract of anything that can produce a timetable from loan parameters.
pub trait Amortization {
    fn params(&self) -> &LoanParameters;

    /// Build the timetable of a `principal` share of the loan.
    fn build_timetable(&self, principal: Money) -> TimetableResult<Timetable> {
        let _ = principal;
        Err(TimetableError::NotImplemented(format!(
            "no amortization algorithm selected for a {}-period loan",
            self.params().duration_in_periods()
        )))
    }

    /// Build the timetable of the whole loan amount.
    fn build_full_timetable(&self) -> TimetableResult<Timetable> {
        self.build_timetable(self.params().amount())
    }
}

/// Bare parameters carry no amortization policy.
impl Amortization for LoanParameters {
    fn params(&self) -> &LoanParameters {
        self
    }
}

/// One amortization policy bound to its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Algorithm {
    Standard(Standard),
    Linear(Linear),
    Bullet(Bullet),
    InFine(InFine),
    UncapitalizedBullet(UncapitalizedBullet),
}

impl Algorithm {
    pub fn new(kind: AlgorithmKind, params: LoanParameters) -> TimetableResult<Self> {
        Ok(match kind {
            AlgorithmKind::Standard => Algorithm::Standard(Standard::new(params)?),
            AlgorithmKind::Linear => Algorithm::Linear(Linear::new(params)?),
            AlgorithmKind::Bullet => Algorithm::Bullet(Bullet::new(params)?),
            AlgorithmKind::InFine => Algorithm::InFine(InFine::new(params)?),
            AlgorithmKind::UncapitalizedBullet => {
                Algorithm::UncapitalizedBullet(UncapitalizedBullet::new(params)?)
            }
        })
    }

    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Algorithm::Standard(_) => AlgorithmKind::Standard,
            Algorithm::Linear(_) => AlgorithmKind::Linear,
            Algorithm::Bullet(_) => AlgorithmKind::Bullet,
            Algorithm::InFine(_) => AlgorithmKind::InFine,
            Algorithm::UncapitalizedBullet(_) => AlgorithmKind::UncapitalizedBullet,
        }
    }

    fn inner(&self) -> &dyn Amortization {
        match self {
            Algorithm::Standard(a) => a,
            Algorithm::Linear(a) => a,
            Algorithm::Bullet(a) => a,
            Algorithm::InFine(a) => a,
            Algorithm::UncapitalizedBullet(a) => a,
        }
    }
}

impl Amortization for Algorithm {
    fn params(&self) -> &LoanParameters {
        self.inner().params()
    }

    fn build_timetable(&self, principal: Money) -> TimetableResult<Timetable> {
        debug!(
            algorithm = %self.kind(),
            %principal,
            duration = self.params().duration_in_periods(),
            "building timetable"
        );
        let timetable = self.inner().build_timetable(principal)?;
        debug!(
            algorithm = %self.kind(),
            terms = timetable.len(),
            total_interests = %timetable.total_interests(),
            "timetable built"
        );
        Ok(timetable)
    }
}

/// Checks shared by every algorithm constructor.
pub(crate) fn check_params(params: &LoanParameters, kind: AlgorithmKind) -> TimetableResult<()> {
    if let Some(dates) = params.term_dates() {
        validate_term_dates(
            dates,
            params.duration_in_periods(),
            params.interests_start_date(),
            kind,
        )?;
    }
    for advisory in advisories(params, kind) {
        warn!(algorithm = %kind, "{advisory}");
    }
    Ok(())
}

/// Parameters that are accepted but have no effect on `kind`.
pub fn advisories(params: &LoanParameters, kind: AlgorithmKind) -> Vec<String> {
    let mut notes = Vec::new();
    if params.deferred_in_periods() > 0
        && matches!(kind, AlgorithmKind::Bullet | AlgorithmKind::InFine)
    {
        notes.push(format!(
            "{} deferred period(s) have no effect on {kind} loans, which repay no capital before maturity",
            params.deferred_in_periods()
        ));
    }
    if params.interests_start_date().is_some() && params.rate_basis() == RateBasis::Periodic {
        notes.push("interests_start_date only affects the realistic rate basis; ignored".into());
    }
    notes
}

pub(crate) fn check_principal(params: &LoanParameters, principal: Money) -> TimetableResult<()> {
    if principal < Money::ZERO {
        return Err(TimetableError::invalid_input(
            "principal",
            "Principal share cannot be negative",
        ));
    }
    if principal < params.initial_values().paid_capital {
        return Err(TimetableError::invalid_input(
            "principal",
            "Principal share is smaller than the capital already paid",
        ));
    }
    Ok(())
}

/// Due dates and per-period rates of one schedule.
pub(crate) struct Calendar<'a> {
    params: &'a LoanParameters,
    due_dates: DueDates,
    leading: Option<NaiveDate>,
}

impl<'a> Calendar<'a> {
    pub(crate) fn new(params: &'a LoanParameters, kind: AlgorithmKind) -> TimetableResult<Self> {
        let due_dates = match params.term_dates() {
            Some(dates) if kind == AlgorithmKind::Bullet => {
                DueDates::explicit(dates.iter().skip(1).copied().collect(), params.period())?
            }
            Some(dates) => DueDates::explicit(dates.to_vec(), params.period())?,
            None => DueDates::cadence(params.starts_at(), params.period()),
        };
        let leading = match params.term_dates() {
            Some(dates) if kind == AlgorithmKind::Bullet && due_dates.is_explicit() => {
                dates.first().copied()
            }
            _ => None,
        };
        Ok(Self {
            params,
            due_dates,
            leading,
        })
    }

    /// Start and end of the accrual window of term `index`.
    ///
    /// A leading date closes each window on the term's own due date, starting
    /// from the previous one. Otherwise a window runs from the term's due date
    /// to the next, and `interests_start_date` may open the first one earlier.
    fn window(&self, index: u32) -> TimetableResult<(NaiveDate, NaiveDate)> {
        match self.leading {
            Some(leading) => {
                let start = match index {
                    1 => leading,
                    _ => self.due_dates.due_date(index - 1)?,
                };
                Ok((start, self.due_dates.due_date(index)?))
            }
            None => {
                let start = match self.params.interests_start_date() {
                    Some(date) if index == 1 => date,
                    _ => self.due_dates.due_date(index)?,
                };
                Ok((start, self.due_dates.due_date(index + 1)?))
            }
        }
    }

    /// Rate accrued by the term numbered `index`.
    pub(crate) fn rate(&self, index: u32) -> TimetableResult<Rate> {
        match self.params.rate_basis() {
            RateBasis::Periodic => Ok(self.params.periodic_rate()),
            RateBasis::Realistic => {
                let (start, end) = self.window(index)?;
                let rate = capitalized_rate(self.params.annual_rate(), start, end)?;
                Ok(self.params.context().fit(rate))
            }
        }
    }

    /// Rates of every term of the loan, term 1 first.
    pub(crate) fn all_rates(&self) -> TimetableResult<Vec<Rate>> {
        (1..=self.params.duration_in_periods())
            .map(|index| self.rate(index))
            .collect()
    }

    pub(crate) fn is_uniform(&self) -> bool {
        self.params.rate_basis() == RateBasis::Periodic
    }

    /// Fill in remaining interests and append the computed terms.
    pub(crate) fn assemble(
        &self,
        rows: Vec<TermAmounts>,
        total_interests: Money,
    ) -> TimetableResult<Timetable> {
        let mut timetable = Timetable::new(self.due_dates.clone(), self.params.starting_index());
        for mut amounts in rows {
            amounts.remaining_interests = total_interests - amounts.paid_interests;
            timetable.push(amounts)?;
        }
        Ok(timetable)
    }
}
