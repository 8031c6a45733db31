use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Rounding bookkeeping of an annuity period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingDetail {
    /// Principal owed when the period opens
    pub balance_start: Money,
    /// Principal owed once the period's capital is repaid
    pub balance_end: Money,
    /// Unrounded interest of the period
    pub theoretical_interests: Money,
    /// Theoretical minus rounded interest, before any adjustment
    pub delta: Money,
    /// Rounding error still carried after this period
    pub accrued_delta: Money,
    /// Cent moved into (or out of) this period's interest
    pub adjustment: Money,
    /// Capital plus interest paid so far
    pub paid_total: Money,
}

/// Running interest owed but not yet paid, for loans that never capitalize it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueInterestDetail {
    pub beginning_due_interests: Money,
    pub accrued_interests: Money,
    pub ending_due_interests: Money,
}

/// Financial content of one period, as computed by an algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermAmounts {
    pub payment: Money,
    pub capital: Money,
    pub interests: Money,
    pub remaining_capital: Money,
    pub paid_capital: Money,
    pub remaining_interests: Money,
    pub paid_interests: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounding: Option<RoundingDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_interests: Option<DueInterestDetail>,
}

impl TermAmounts {
    pub fn zero() -> Self {
        TermAmounts {
            payment: Money::ZERO,
            capital: Money::ZERO,
            interests: Money::ZERO,
            remaining_capital: Money::ZERO,
            paid_capital: Money::ZERO,
            remaining_interests: Money::ZERO,
            paid_interests: Money::ZERO,
            rounding: None,
            due_interests: None,
        }
    }

    /// Element-wise sum of the financial fields. Algorithm-specific detail is dropped.
    pub fn sum_financials(&self, other: &TermAmounts) -> TermAmounts {
        TermAmounts {
            payment: self.payment + other.payment,
            capital: self.capital + other.capital,
            interests: self.interests + other.interests,
            remaining_capital: self.remaining_capital + other.remaining_capital,
            paid_capital: self.paid_capital + other.paid_capital,
            remaining_interests: self.remaining_interests + other.remaining_interests,
            paid_interests: self.paid_interests + other.paid_interests,
            rounding: None,
            due_interests: None,
        }
    }
}

/// One period of a timetable. Index and due date are assigned by the
/// owning [`Timetable`](crate::timetable::Timetable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub index: u32,
    pub due_date: NaiveDate,
    #[serde(flatten)]
    pub amounts: TermAmounts,
}

impl Term {
    pub(crate) fn new(index: u32, due_date: NaiveDate, amounts: TermAmounts) -> Self {
        Self {
            index,
            due_date,
            amounts,
        }
    }

    pub fn payment(&self) -> Money {
        self.amounts.payment
    }

    pub fn capital(&self) -> Money {
        self.amounts.capital
    }

    pub fn interests(&self) -> Money {
        self.amounts.interests
    }

    pub fn remaining_capital(&self) -> Money {
        self.amounts.remaining_capital
    }

    pub fn paid_capital(&self) -> Money {
        self.amounts.paid_capital
    }

    pub fn remaining_interests(&self) -> Money {
        self.amounts.remaining_interests
    }

    pub fn paid_interests(&self) -> Money {
        self.amounts.paid_interests
    }
}
