pub mod aggregation;
pub mod algorithms;
pub mod day_count;
pub mod decimal;
pub mod error;
pub mod params;
pub mod period;
pub mod reconciliation;
pub mod schedule;
pub mod term;
pub mod time_value;
pub mod timetable;
pub mod types;
pub mod validation;

pub use aggregation::aggregate;
pub use algorithms::{Algorithm, AlgorithmKind, Amortization};
pub use decimal::{DecimalContext, Rounding};
pub use error::TimetableError;
pub use params::{InitialValues, LoanConfig, LoanParameters, RateBasis};
pub use period::Period;
pub use term::{Term, TermAmounts};
pub use timetable::{DueDates, Timetable};
pub use types::*;
pub use validation::validate_term_dates;

/// Standard result type for all timetable operations
pub type TimetableResult<T> = Result<T, TimetableError>;
