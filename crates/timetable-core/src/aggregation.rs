//! Borrower timetables: the term-by-term sum of the lender timetables of one loan.

use tracing::debug;

use crate::algorithms::Amortization;
use crate::error::TimetableError;
use crate::term::TermAmounts;
use crate::timetable::Timetable;
use crate::types::Money;
use crate::TimetableResult;

/// Sum lender timetables into the borrower timetable.
///
/// Every input must have the same number of terms with matching indices and
/// due dates; index and due date of the result come from the first input.
pub fn aggregate(timetables: &[Timetable]) -> TimetableResult<Timetable> {
    let (first, rest) = timetables.split_first().ok_or_else(|| {
        TimetableError::InvalidArgument(
            "At least one timetable is required to build a borrower timetable".into(),
        )
    })?;

    for (position, other) in rest.iter().enumerate() {
        if other.len() != first.len() {
            return Err(TimetableError::InvalidArgument(format!(
                "Timetable #{} has {} terms, expected {}",
                position + 2,
                other.len(),
                first.len()
            )));
        }
        for (a, b) in first.iter().zip(other) {
            if a.index != b.index || a.due_date != b.due_date {
                return Err(TimetableError::InvalidArgument(format!(
                    "Timetable #{} term {} ({}) is not aligned with term {} ({})",
                    position + 2,
                    b.index,
                    b.due_date,
                    a.index,
                    a.due_date
                )));
            }
        }
    }

    let mut borrower = Timetable::new(first.due_dates().clone(), first.first_index());
    for (position, term) in first.iter().enumerate() {
        let amounts = rest.iter().fold(
            TermAmounts::zero().sum_financials(&term.amounts),
            |acc, other| acc.sum_financials(&other.terms()[position].amounts),
        );
        borrower.push(amounts)?;
    }

    debug!(
        lenders = timetables.len(),
        terms = borrower.len(),
        "aggregated borrower timetable"
    );
    Ok(borrower)
}

/// Build one timetable per lender share of the same loan.
pub fn lender_timetables(
    algorithm: &impl Amortization,
    shares: &[Money],
) -> TimetableResult<Vec<Timetable>> {
    if shares.is_empty() {
        return Err(TimetableError::InvalidArgument(
            "At least one lender share is required".into(),
        ));
    }
    shares
        .iter()
        .map(|share| algorithm.build_timetable(*share))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{Algorithm, AlgorithmKind};
    use crate::params::LoanParameters;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn algorithm(kind: AlgorithmKind, duration: u32) -> Algorithm {
        let params = LoanParameters::new(
            dec!(100000),
            dec!(6),
            NaiveDate::from_ymd_opt(2016, 1, 15).unwrap(),
            duration,
        )
        .unwrap();
        Algorithm::new(kind, params).unwrap()
    }

    #[test]
    fn test_single_timetable_is_identity_on_financials() {
        let lender = algorithm(AlgorithmKind::Linear, 12).build_full_timetable().unwrap();
        let borrower = aggregate(std::slice::from_ref(&lender)).unwrap();
        assert_eq!(borrower, lender);
    }

    #[test]
    fn test_sums_lender_shares() {
        let algo = algorithm(AlgorithmKind::Standard, 24);
        let lenders = lender_timetables(&algo, &[dec!(60000), dec!(40000)]).unwrap();
        let borrower = aggregate(&lenders).unwrap();
        for (i, term) in borrower.iter().enumerate() {
            assert_eq!(
                term.payment(),
                lenders[0].terms()[i].payment() + lenders[1].terms()[i].payment()
            );
            assert_eq!(term.due_date, lenders[0].terms()[i].due_date);
            assert!(term.amounts.rounding.is_none());
        }
        assert_eq!(borrower.last().unwrap().paid_capital(), dec!(100000));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(aggregate(&[]), Err(TimetableError::InvalidArgument(_))));
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let a = algorithm(AlgorithmKind::InFine, 12).build_full_timetable().unwrap();
        let b = algorithm(AlgorithmKind::InFine, 13).build_full_timetable().unwrap();
        assert!(matches!(aggregate(&[a, b]), Err(TimetableError::InvalidArgument(_))));
    }
}
