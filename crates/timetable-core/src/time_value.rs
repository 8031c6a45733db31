//! Closed-form annuity formulas.
//!
//! Signs follow the cash-flow convention: money received is positive and
//! money paid out is negative, so the payment on a positive present value
//! comes back negative.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::checked_mul;
use crate::error::TimetableError;
use crate::types::{Money, Rate};
use crate::TimetableResult;

/// When payments fall within each period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTiming {
    #[default]
    End,
    Begin,
}

impl PaymentTiming {
    fn weight(self) -> Decimal {
        match self {
            PaymentTiming::End => Decimal::ZERO,
            PaymentTiming::Begin => Decimal::ONE,
        }
    }
}

fn check_rate(rate: Rate) -> TimetableResult<()> {
    if rate <= dec!(-1) {
        return Err(TimetableError::invalid_input(
            "rate",
            "Periodic rate must be greater than -100%",
        ));
    }
    Ok(())
}

/// `(1 + rate)^nper`
pub fn compound_factor(rate: Rate, nper: u32) -> TimetableResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powi(i64::from(nper))
        .ok_or_else(|| TimetableError::overflow("duration_in_periods"))
}

/// `(1 + rate * timing) * (factor - 1)`, the shared numerator of the annuity factors.
fn annuity_numerator(
    rate: Rate,
    factor: Decimal,
    timing: PaymentTiming,
) -> TimetableResult<Decimal> {
    checked_mul(
        Decimal::ONE + rate * timing.weight(),
        factor - Decimal::ONE,
        "duration_in_periods",
    )
}

/// Future Value
pub fn fv(
    rate: Rate,
    nper: u32,
    pmt: Money,
    present_value: Money,
    timing: PaymentTiming,
) -> TimetableResult<Money> {
    check_rate(rate)?;
    if rate.is_zero() {
        return Ok(-(present_value + pmt * Decimal::from(nper)));
    }

    let factor = compound_factor(rate, nper)?;
    let annuity_factor = annuity_numerator(rate, factor, timing)? / rate;

    Ok(-(checked_mul(present_value, factor, "amount")?
        + checked_mul(pmt, annuity_factor, "amount")?))
}

/// Present Value
pub fn pv(
    rate: Rate,
    nper: u32,
    pmt: Money,
    future_value: Money,
    timing: PaymentTiming,
) -> TimetableResult<Money> {
    check_rate(rate)?;
    if rate.is_zero() {
        return Ok(-(future_value + pmt * Decimal::from(nper)));
    }

    let factor = compound_factor(rate, nper)?;
    let annuity_factor = annuity_numerator(rate, factor, timing)? / rate;

    Ok(-(future_value + checked_mul(pmt, annuity_factor, "amount")?) / factor)
}

/// Payment (PMT): the constant periodic payment that amortizes `present_value`
/// down to `future_value` over `nper` periods.
pub fn pmt(
    rate: Rate,
    nper: u32,
    present_value: Money,
    future_value: Money,
    timing: PaymentTiming,
) -> TimetableResult<Money> {
    if nper == 0 {
        return Err(TimetableError::invalid_input(
            "nper",
            "Number of periods must be > 0",
        ));
    }
    check_rate(rate)?;

    // A zero rate degenerates the annuity factor to nper.
    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let factor = compound_factor(rate, nper)?;
    let annuity_factor = annuity_numerator(rate, factor, timing)?;
    let owed = future_value + checked_mul(present_value, factor, "amount")?;

    Ok(-checked_mul(owed, rate, "amount")? / annuity_factor)
}

/// Interest component of the constant payment at period `per` (IPMT).
pub fn interest_portion(
    rate: Rate,
    per: u32,
    nper: u32,
    present_value: Money,
    future_value: Money,
    timing: PaymentTiming,
) -> TimetableResult<Money> {
    if per == 0 || per > nper {
        return Err(TimetableError::invalid_input(
            "per",
            format!("Period {per} is outside 1..={nper}"),
        ));
    }

    let payment = pmt(rate, nper, present_value, future_value, timing)?;
    // Balance remaining after per - 1 payments, times the rate.
    let balance = fv(rate, per - 1, payment, present_value, timing)?;
    let interest = checked_mul(balance, rate, "amount")?;

    Ok(match timing {
        PaymentTiming::End => interest,
        PaymentTiming::Begin if per == 1 => Decimal::ZERO,
        PaymentTiming::Begin => interest / (Decimal::ONE + rate),
    })
}

/// Capital component of the constant payment at period `per` (PPMT).
pub fn capital_portion(
    rate: Rate,
    per: u32,
    nper: u32,
    present_value: Money,
    future_value: Money,
    timing: PaymentTiming,
) -> TimetableResult<Money> {
    let payment = pmt(rate, nper, present_value, future_value, timing)?;
    let interest = interest_portion(rate, per, nper, present_value, future_value, timing)?;
    Ok(payment - interest)
}
