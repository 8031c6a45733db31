//! Request/response entry points for outer layers: a loan configuration and
//! an algorithm name in, a timetable wrapped in a computation envelope out.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::aggregation::{aggregate, lender_timetables};
use crate::algorithms::{advisories, Algorithm, AlgorithmKind, Amortization};
use crate::error::TimetableError;
use crate::params::{LoanConfig, LoanParameters};
use crate::timetable::Timetable;
use crate::types::*;
use crate::TimetableResult;

/// Input for a single timetable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub algorithm: AlgorithmKind,
    #[serde(flatten)]
    pub loan: LoanConfig,
    /// Share of the loan to schedule; the whole amount when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Money>,
}

/// A timetable with its headline totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub algorithm: AlgorithmKind,
    pub principal: Money,
    pub total_interests: Money,
    pub total_payments: Money,
    pub timetable: Timetable,
}

impl ScheduleOutput {
    fn new(algorithm: AlgorithmKind, principal: Money, timetable: Timetable) -> Self {
        Self {
            algorithm,
            principal,
            total_interests: timetable.total_interests(),
            total_payments: timetable.total_payments(),
            timetable,
        }
    }
}

/// Input for a loan split between several lenders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LenderScheduleInput {
    pub algorithm: AlgorithmKind,
    #[serde(flatten)]
    pub loan: LoanConfig,
    /// Principal held by each lender
    pub shares: Vec<Money>,
}

/// Lender timetables and the borrower timetable they add up to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LenderScheduleOutput {
    pub lenders: Vec<ScheduleOutput>,
    pub borrower: ScheduleOutput,
}

fn prepare(
    kind: AlgorithmKind,
    loan: &LoanConfig,
) -> TimetableResult<(Algorithm, Vec<String>)> {
    let params = LoanParameters::try_from(loan.clone())?;
    let warnings = advisories(&params, kind);
    Ok((Algorithm::new(kind, params)?, warnings))
}

fn assumptions(kind: AlgorithmKind, params: &LoanParameters) -> serde_json::Value {
    serde_json::json!({
        "algorithm": kind,
        "amount": params.amount().to_string(),
        "annual_interest_rate": params.annual_interest_rate().to_string(),
        "starts_at": params.starts_at(),
        "duration_in_periods": params.duration_in_periods(),
        "deferred_in_periods": params.deferred_in_periods(),
        "period": params.period().to_string(),
        "rate_basis": params.rate_basis(),
    })
}

/// Terms left with a negative interest once a rounding difference was settled on them.
fn negative_interest_warnings(timetable: &Timetable) -> Vec<String> {
    timetable
        .iter()
        .filter(|term| term.interests() < Decimal::ZERO)
        .map(|term| {
            format!(
                "Term {} charges {} of interest after absorbing the loan's rounding difference",
                term.index,
                term.interests()
            )
        })
        .collect()
}

/// Build the timetable of one loan (or one share of it).
pub fn build_schedule(
    input: &ScheduleInput,
) -> TimetableResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let (algorithm, mut warnings) = prepare(input.algorithm, &input.loan)?;
    let params = algorithm.params();
    let principal = input.principal.unwrap_or_else(|| params.amount());

    let timetable = algorithm.build_timetable(principal)?;
    warnings.extend(negative_interest_warnings(&timetable));
    let output = ScheduleOutput::new(input.algorithm, principal, timetable);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("Amortization timetable ({})", input.algorithm),
        &assumptions(input.algorithm, params),
        warnings,
        elapsed,
        &params.context().describe(),
        output,
    ))
}

/// Build every lender timetable of a shared loan and the borrower timetable.
pub fn build_lender_schedules(
    input: &LenderScheduleInput,
) -> TimetableResult<ComputationOutput<LenderScheduleOutput>> {
    let start = Instant::now();
    let (algorithm, mut warnings) = prepare(input.algorithm, &input.loan)?;
    let params = algorithm.params();

    if input.shares.iter().any(|share| *share < Decimal::ZERO) {
        return Err(TimetableError::invalid_input(
            "shares",
            "Lender shares cannot be negative",
        ));
    }
    let shared: Money = input.shares.iter().copied().sum();
    if shared != params.amount() {
        warnings.push(format!(
            "Lender shares add up to {shared}, not the loan amount {}",
            params.amount()
        ));
    }

    let lenders = lender_timetables(&algorithm, &input.shares)?;
    for timetable in &lenders {
        warnings.extend(negative_interest_warnings(timetable));
    }
    let borrower = aggregate(&lenders)?;

    let output = LenderScheduleOutput {
        borrower: ScheduleOutput::new(input.algorithm, shared, borrower),
        lenders: input
            .shares
            .iter()
            .zip(lenders)
            .map(|(share, timetable)| ScheduleOutput::new(input.algorithm, *share, timetable))
            .collect(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("Lender and borrower timetables ({})", input.algorithm),
        &assumptions(input.algorithm, params),
        warnings,
        elapsed,
        &params.context().describe(),
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input() -> ScheduleInput {
        serde_json::from_value(serde_json::json!({
            "algorithm": "in_fine",
            "amount": "100000",
            "annual_interest_rate": "4",
            "starts_at": "2020-06-30",
            "duration_in_periods": 24,
            "deferred_in_periods": 3
        }))
        .unwrap()
    }

    #[test]
    fn test_build_schedule_envelope() {
        let result = build_schedule(&input()).unwrap();
        assert_eq!(result.result.timetable.len(), 24);
        assert_eq!(result.result.principal, dec!(100000));
        assert_eq!(result.warnings.len(), 1, "deferral is ignored by in-fine loans");
        assert!(result.methodology.contains("in_fine"));
    }

    #[test]
    fn test_negative_last_interest_is_reported() {
        let request: ScheduleInput = serde_json::from_value(serde_json::json!({
            "algorithm": "in_fine",
            "amount": "1",
            "annual_interest_rate": "7.25",
            "starts_at": "2016-01-15",
            "duration_in_periods": 360
        }))
        .unwrap();
        let result = build_schedule(&request).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("Term 360"), "{}", result.warnings[0]);
    }

    #[test]
    fn test_overflow_is_reported_as_invalid_input() {
        let request: ScheduleInput = serde_json::from_value(serde_json::json!({
            "algorithm": "bullet",
            "amount": "1000",
            "annual_interest_rate": "100",
            "starts_at": "2016-01-15",
            "duration_in_periods": 100,
            "period": "1 year"
        }))
        .unwrap();
        let err = build_schedule(&request).unwrap_err();
        assert!(matches!(err, TimetableError::InvalidInput { .. }));
    }

    #[test]
    fn test_principal_override() {
        let mut request = input();
        request.principal = Some(dec!(25000));
        let result = build_schedule(&request).unwrap();
        assert_eq!(result.result.timetable.last().unwrap().capital(), dec!(25000));
    }

    #[test]
    fn test_lender_schedules_sum_to_borrower() {
        let base = input();
        let request = LenderScheduleInput {
            algorithm: AlgorithmKind::Standard,
            loan: base.loan,
            shares: vec![dec!(70000), dec!(30000)],
        };
        let result = build_lender_schedules(&request).unwrap();
        let out = &result.result;
        assert_eq!(out.lenders.len(), 2);
        assert_eq!(
            out.borrower.total_interests,
            out.lenders[0].total_interests + out.lenders[1].total_interests
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unknown_algorithm_fails_to_parse() {
        let result: Result<ScheduleInput, _> = serde_json::from_value(serde_json::json!({
            "algorithm": "balloon",
            "amount": "1000",
            "annual_interest_rate": "4",
            "starts_at": "2020-06-30",
            "duration_in_periods": 12
        }));
        assert!(result.is_err());
    }
}
