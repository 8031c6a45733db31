use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use timetable_core::algorithms::AlgorithmKind;
use timetable_core::schedule::{
    build_lender_schedules, build_schedule, LenderScheduleInput, ScheduleInput,
};

use crate::input;

/// Loan terms given as flags instead of a JSON input
#[derive(Args)]
pub struct LoanArgs {
    /// Amortization algorithm (standard, linear, bullet, in-fine, uncapitalized-bullet)
    #[arg(long, short = 'a')]
    pub algorithm: Option<AlgorithmKind>,

    /// Loan amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Annual interest rate as a percentage (10 = 10%)
    #[arg(long, alias = "annual-interest-rate")]
    pub rate: Option<Decimal>,

    /// First due date (YYYY-MM-DD)
    #[arg(long)]
    pub starts_at: Option<String>,

    /// Number of periods
    #[arg(long, alias = "duration-in-periods")]
    pub duration: Option<i64>,

    /// Number of leading interest-only periods
    #[arg(long, alias = "deferred-in-periods", default_value_t = 0)]
    pub deferred: i64,

    /// Length of one period, e.g. "1 month", "3 months", "1 year"
    #[arg(long, default_value = "1 month")]
    pub period: String,

    /// Explicit due dates, comma separated (YYYY-MM-DD)
    #[arg(long, value_delimiter = ',')]
    pub term_dates: Option<Vec<String>>,

    /// Start of the first accrual window under the realistic rate basis
    #[arg(long)]
    pub interests_start_date: Option<String>,

    /// How periodic rates are derived from the annual rate
    #[arg(long, value_parser = ["periodic", "realistic"], default_value = "periodic")]
    pub rate_basis: String,

    /// Significant digits kept in intermediate results (14-28)
    #[arg(long)]
    pub precision: Option<u32>,

    /// Rounding rule (half_even, half_up, half_down, down, up)
    #[arg(long, value_parser = ["half_even", "half_up", "half_down", "down", "up"], default_value = "half_even")]
    pub rounding: String,
}

impl LoanArgs {
    /// Assemble the JSON request these flags describe.
    fn to_request(&self) -> Result<Map<String, Value>, Box<dyn std::error::Error>> {
        let algorithm = self
            .algorithm
            .ok_or("--algorithm is required (or provide --input)")?;
        let amount = self
            .amount
            .ok_or("--amount is required (or provide --input)")?;
        let rate = self
            .rate
            .ok_or("--rate is required (or provide --input)")?;
        let starts_at = self
            .starts_at
            .as_ref()
            .ok_or("--starts-at is required (or provide --input)")?;
        let duration = self
            .duration
            .ok_or("--duration is required (or provide --input)")?;

        let mut request = Map::new();
        request.insert("algorithm".into(), json!(algorithm));
        request.insert("amount".into(), json!(amount.to_string()));
        request.insert("annual_interest_rate".into(), json!(rate.to_string()));
        request.insert("starts_at".into(), json!(starts_at));
        request.insert("duration_in_periods".into(), json!(duration));
        request.insert("deferred_in_periods".into(), json!(self.deferred));
        request.insert("period".into(), json!(self.period));
        request.insert("rate_basis".into(), json!(self.rate_basis));
        request.insert("rounding".into(), json!(self.rounding));
        if let Some(dates) = &self.term_dates {
            request.insert("term_dates".into(), json!(dates));
        }
        if let Some(date) = &self.interests_start_date {
            request.insert("interests_start_date".into(), json!(date));
        }
        if let Some(precision) = self.precision {
            request.insert("precision".into(), json!(precision));
        }
        Ok(request)
    }
}

/// Arguments for building one timetable
#[derive(Args)]
pub struct BuildArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Schedule only this share of the loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,
}

/// Arguments for lender and borrower timetables
#[derive(Args)]
pub struct LendersArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Principal held by each lender, comma separated
    #[arg(long, value_delimiter = ',')]
    pub shares: Vec<Decimal>,
}

pub fn run_build(args: BuildArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let mut request = args.loan.to_request()?;
        if let Some(principal) = args.principal {
            request.insert("principal".into(), json!(principal.to_string()));
        }
        serde_json::from_value(Value::Object(request))?
    };

    let result = build_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_lenders(args: LendersArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let lender_input: LenderScheduleInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        if args.shares.is_empty() {
            return Err("--shares is required (or provide --input)".into());
        }
        let mut request = args.loan.to_request()?;
        let shares: Vec<String> = args.shares.iter().map(|s| s.to_string()).collect();
        request.insert("shares".into(), json!(shares));
        serde_json::from_value(Value::Object(request))?
    };

    let result = build_lender_schedules(&lender_input)?;
    Ok(serde_json::to_value(result)?)
}
