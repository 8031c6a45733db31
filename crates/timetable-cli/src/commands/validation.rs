use chrono::NaiveDate;
use clap::Args;
use serde_json::{json, Value};

use timetable_core::algorithms::AlgorithmKind;
use timetable_core::validate_term_dates;

/// Arguments for checking explicit term dates
#[derive(Args)]
pub struct ValidateDatesArgs {
    /// Algorithm the dates are meant for
    #[arg(long, short = 'a')]
    pub algorithm: AlgorithmKind,

    /// Number of periods of the loan
    #[arg(long, alias = "duration-in-periods")]
    pub duration: u32,

    /// Term dates, comma separated (YYYY-MM-DD)
    #[arg(long, value_delimiter = ',', required = true)]
    pub dates: Vec<String>,

    /// Interests start date, which explicit dates cannot be combined with
    #[arg(long)]
    pub interests_start_date: Option<String>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("'{raw}' is not a YYYY-MM-DD date ({e})").into())
}

pub fn run_validate_dates(args: ValidateDatesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dates = args
        .dates
        .iter()
        .map(|raw| parse_date(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let interests_start_date = args
        .interests_start_date
        .as_deref()
        .map(parse_date)
        .transpose()?;

    validate_term_dates(&dates, args.duration, interests_start_date, args.algorithm)?;

    Ok(json!({
        "result": {
            "valid": true,
            "algorithm": args.algorithm,
            "duration_in_periods": args.duration,
            "term_dates": dates.len(),
            "first_date": dates.first(),
            "last_date": dates.last(),
        }
    }))
}
