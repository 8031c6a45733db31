//! Cent-by-cent rounding reconciliation.
//!
//! Each period's exact interest is rounded to cents and the rounding error
//! is carried forward. Whenever the carried error reaches a full cent, that
//! cent is moved into the current period's interest, so the carried error
//! stays strictly within one cent and the rounded interests add up to the
//! exact total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{DecimalContext, CENT};
use crate::types::Money;

/// Outcome of rounding one period's interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub theoretical: Money,
    pub rounded: Money,
    pub delta: Money,
    pub adjustment: Money,
    /// Rounded interest plus adjustment: the amount actually charged.
    pub interests: Money,
}

/// Rounding error carried between periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingAccumulator {
    accrued: Money,
}

impl RoundingAccumulator {
    pub fn new(accrued: Money) -> Self {
        Self { accrued }
    }

    pub fn accrued(&self) -> Money {
        self.accrued
    }

    /// Round `theoretical` and fold its rounding error into the carried delta.
    pub fn settle(self, theoretical: Money, ctx: &DecimalContext) -> (Self, Settlement) {
        let rounded = ctx.round_money(theoretical);
        let delta = theoretical - rounded;
        let mut accrued = self.accrued + delta;

        let adjustment = if accrued >= CENT {
            accrued -= CENT;
            CENT
        } else if accrued <= -CENT {
            accrued += CENT;
            -CENT
        } else {
            Decimal::ZERO
        };

        (
            Self { accrued },
            Settlement {
                theoretical,
                rounded,
                delta,
                adjustment,
                interests: rounded + adjustment,
            },
        )
    }
}
