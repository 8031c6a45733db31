//! Decimal arithmetic context.
//!
//! Every amount and rate in the crate is a `rust_decimal::Decimal`. The
//! precision (significant digits) and the rounding rule are carried by a
//! [`DecimalContext`] value bound to each set of loan parameters rather than
//! by any process-wide setting.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::TimetableError;
use crate::types::Money;
use crate::TimetableResult;

/// Decimal places of a rounded money amount.
pub const MONEY_DP: u32 = 2;

/// Smallest rounded money step.
pub const CENT: Money = dec!(0.01);

/// `a * b`, or an overflow error naming `field`.
pub(crate) fn checked_mul(a: Decimal, b: Decimal, field: &str) -> TimetableResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| TimetableError::overflow(field))
}

/// Rounding rule applied when an exact value is quantized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Round half to even ("banker's rounding").
    #[default]
    HalfEven,
    HalfUp,
    HalfDown,
    Down,
    Up,
}

impl Rounding {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Rounding::HalfEven => RoundingStrategy::MidpointNearestEven,
            Rounding::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Rounding::HalfDown => RoundingStrategy::MidpointTowardZero,
            Rounding::Down => RoundingStrategy::ToZero,
            Rounding::Up => RoundingStrategy::AwayFromZero,
        }
    }
}

/// Precision and rounding configuration for schedule arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalContext {
    precision: u32,
    rounding: Rounding,
}

impl Default for DecimalContext {
    fn default() -> Self {
        Self {
            precision: Self::MAX_PRECISION,
            rounding: Rounding::HalfEven,
        }
    }
}

impl DecimalContext {
    /// Fewest significant digits a schedule may be computed with.
    pub const MIN_PRECISION: u32 = 14;
    /// The 96-bit mantissa of `Decimal` holds 28 significant digits.
    pub const MAX_PRECISION: u32 = 28;

    pub fn new(precision: u32, rounding: Rounding) -> TimetableResult<Self> {
        if !(Self::MIN_PRECISION..=Self::MAX_PRECISION).contains(&precision) {
            return Err(TimetableError::invalid_input(
                "precision",
                format!(
                    "Precision must be between {} and {} significant digits",
                    Self::MIN_PRECISION,
                    Self::MAX_PRECISION
                ),
            ));
        }
        Ok(Self {
            precision,
            rounding,
        })
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    /// Round an amount to cents.
    pub fn round_money(&self, value: Decimal) -> Money {
        self.round_dp(value, MONEY_DP)
    }

    pub fn round_dp(&self, value: Decimal, dp: u32) -> Decimal {
        value.round_dp_with_strategy(dp, self.rounding.strategy())
    }

    /// Limit a value to the context's significant digits.
    pub fn fit(&self, value: Decimal) -> Decimal {
        if self.precision >= Self::MAX_PRECISION {
            return value;
        }
        value
            .round_sf_with_strategy(self.precision, self.rounding.strategy())
            .unwrap_or(value)
    }

    /// Human readable description used in output metadata.
    pub fn describe(&self) -> String {
        format!("decimal/{}sf/{:?}", self.precision, self.rounding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rounds_half_to_even() {
        let ctx = DecimalContext::default();
        assert_eq!(ctx.round_money(dec!(0.125)), dec!(0.12));
        assert_eq!(ctx.round_money(dec!(0.135)), dec!(0.14));
        assert_eq!(ctx.round_money(dec!(-0.125)), dec!(-0.12));
    }

    #[test]
    fn test_half_up_context() {
        let ctx = DecimalContext::new(20, Rounding::HalfUp).unwrap();
        assert_eq!(ctx.round_money(dec!(0.125)), dec!(0.13));
    }

    #[test]
    fn test_fit_limits_significant_digits() {
        let ctx = DecimalContext::new(14, Rounding::HalfEven).unwrap();
        let third = Decimal::ONE / dec!(3);
        assert_eq!(ctx.fit(third), dec!(0.33333333333333));
        assert_eq!(DecimalContext::default().fit(third), third);
    }

    #[test]
    fn test_checked_mul_reports_overflow() {
        assert_eq!(checked_mul(dec!(2), dec!(3), "amount").unwrap(), dec!(6));
        let err = checked_mul(Decimal::MAX, dec!(2), "amount").unwrap_err();
        assert!(matches!(err, TimetableError::InvalidInput { ref field, .. } if field == "amount"));
    }

    #[test]
    fn test_precision_out_of_range() {
        assert!(DecimalContext::new(8, Rounding::HalfEven).is_err());
        assert!(DecimalContext::new(29, Rounding::HalfEven).is_err());
    }
}
