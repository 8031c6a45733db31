use chrono::NaiveDate;

use crate::algorithms::AlgorithmKind;
use crate::day_count::{days_between, one_year_span};
use crate::error::TimetableError;
use crate::TimetableResult;

/// Check an explicit list of due dates used in place of a generated cadence.
///
/// The list must hold `duration_in_periods` dates, plus a leading date for
/// bullet loans (see [`AlgorithmKind::expected_term_dates`]), be strictly
/// increasing, and cannot be combined with an interests start date. Bullet
/// dates may be at most one calendar year apart.
pub fn validate_term_dates(
    dates: &[NaiveDate],
    duration_in_periods: u32,
    interests_start_date: Option<NaiveDate>,
    kind: AlgorithmKind,
) -> TimetableResult<()> {
    if interests_start_date.is_some() {
        return Err(TimetableError::InvalidArgument(
            "An interests start date cannot be combined with explicit term dates".into(),
        ));
    }

    let expected = kind.expected_term_dates(duration_in_periods);
    if dates.len() != expected {
        return Err(TimetableError::InvalidArgument(format!(
            "{kind} loans over {duration_in_periods} periods need {expected} term dates, got {}",
            dates.len()
        )));
    }

    for pair in dates.windows(2) {
        let (previous, next) = (pair[0], pair[1]);
        if next <= previous {
            return Err(TimetableError::InvalidArgument(format!(
                "Term dates must be strictly increasing: {next} follows {previous}"
            )));
        }

        if kind == AlgorithmKind::Bullet {
            let gap = days_between(previous, next);
            let allowed = one_year_span(previous)?;
            if gap > allowed {
                return Err(TimetableError::InvalidArgument(format!(
                    "Bullet term dates {previous} and {next} are {gap} days apart; \
                     at most {allowed} days are allowed"
                )));
            }
        }
    }

    Ok(())
}
