use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TimetableError;
use crate::period::Period;
use crate::term::{Term, TermAmounts};
use crate::types::Money;
use crate::TimetableResult;

/// Where the due dates of a timetable come from: a start date stepped by a
/// cadence, or an explicit list supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDates {
    starts_at: NaiveDate,
    period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explicit: Option<Vec<NaiveDate>>,
}

impl DueDates {
    pub fn cadence(starts_at: NaiveDate, period: Period) -> Self {
        Self {
            starts_at,
            period,
            explicit: None,
        }
    }

    /// Due dates taken from `dates` (term 1 first). Indices past the end of the
    /// list keep stepping from the last date by `period`.
    pub fn explicit(dates: Vec<NaiveDate>, period: Period) -> TimetableResult<Self> {
        let starts_at = *dates.first().ok_or_else(|| {
            TimetableError::InvalidArgument("Explicit term dates cannot be empty".into())
        })?;
        Ok(Self {
            starts_at,
            period,
            explicit: Some(dates),
        })
    }

    pub fn starts_at(&self) -> NaiveDate {
        self.starts_at
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit.is_some()
    }

    /// Due date of the term numbered `index` (1-based).
    pub fn due_date(&self, index: u32) -> TimetableResult<NaiveDate> {
        if index == 0 {
            return Err(TimetableError::InvalidArgument(
                "Term indices start at 1".into(),
            ));
        }
        match &self.explicit {
            Some(dates) => {
                let listed = dates.len() as u32;
                if index <= listed {
                    Ok(dates[(index - 1) as usize])
                } else {
                    self.period.advance(dates[dates.len() - 1], index - listed)
                }
            }
            None => self.period.advance(self.starts_at, index - 1),
        }
    }
}

/// Ordered, append-only sequence of terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    #[serde(flatten)]
    due_dates: DueDates,
    first_index: u32,
    terms: Vec<Term>,
}

impl Timetable {
    /// An empty timetable whose first appended term gets `first_index`
    /// (1 unless a schedule is being resumed).
    pub fn new(due_dates: DueDates, first_index: u32) -> Self {
        Self {
            due_dates,
            first_index: first_index.max(1),
            terms: Vec::new(),
        }
    }

    /// Append a term; its index and due date follow from its position.
    pub fn push(&mut self, amounts: TermAmounts) -> TimetableResult<&Term> {
        let index = self.first_index + self.terms.len() as u32;
        let due_date = self.due_dates.due_date(index)?;
        self.terms.push(Term::new(index, due_date, amounts));
        Ok(&self.terms[self.terms.len() - 1])
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Term> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Term by its index (not its position).
    pub fn term(&self, index: u32) -> Option<&Term> {
        index
            .checked_sub(self.first_index)
            .and_then(|pos| self.terms.get(pos as usize))
    }

    pub fn last(&self) -> Option<&Term> {
        self.terms.last()
    }

    pub fn due_dates(&self) -> &DueDates {
        &self.due_dates
    }

    pub fn starts_at(&self) -> NaiveDate {
        self.due_dates.starts_at()
    }

    pub fn period(&self) -> Period {
        self.due_dates.period()
    }

    pub fn first_index(&self) -> u32 {
        self.first_index
    }

    /// Interest paid over the life of the loan, including any interest paid
    /// before a resumed schedule started.
    pub fn total_interests(&self) -> Money {
        self.last()
            .map(|t| t.amounts.paid_interests + t.amounts.remaining_interests)
            .unwrap_or(Money::ZERO)
    }

    /// Sum of the payments listed in this timetable.
    pub fn total_payments(&self) -> Money {
        self.terms.iter().map(|t| t.amounts.payment).sum()
    }
}

impl<'a> IntoIterator for &'a Timetable {
    type Item = &'a Term;
    type IntoIter = std::slice::Iter<'a, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}
