//! Integer-cents money arithmetic
//!
//! Every amount is a non-negative `i64` in the smallest currency unit.
//! Rates (tax, platform fee, split share) are `Decimal` fractions so the
//! multiplication is exact; the result is rounded once, half-up
//! (`MidpointAwayFromZero`, identical to half-up on non-negative values).

use rust_decimal::prelude::*;

use crate::error::{AppError, AppResult, ErrorCode};

/// Platform cut of a processed payment (6%)
pub const APPLICATION_FEE_RATE: Decimal = Decimal::from_parts(6, 0, 0, false, 2);

/// Share of the estimate total billed by each split invoice (50%)
pub const SPLIT_SHARE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Monetary breakdown of a document header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

fn overflow() -> AppError {
    AppError::with_message(ErrorCode::InvalidAmount, "Amount exceeds supported range")
}

/// Round a cent amount to a whole cent, half-up.
fn round_cents(value: Decimal) -> AppResult<i64> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(overflow)
}

fn require_rate(rate: Decimal, field: &str) -> AppResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be between 0 and 1, got {rate}"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

fn require_non_negative(value: i64, field: &str) -> AppResult<()> {
    if value < 0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidAmount,
            format!("{field} must be non-negative, got {value}"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// `quantity × unit_cents` for one line item.
pub fn line_amount(quantity: i64, unit_cents: i64) -> AppResult<i64> {
    if quantity < 1 {
        return Err(AppError::validation(format!(
            "quantity must be at least 1, got {quantity}"
        ))
        .with_detail("field", "quantity"));
    }
    if unit_cents < 0 {
        return Err(AppError::validation(format!(
            "unit_cents must be non-negative, got {unit_cents}"
        ))
        .with_detail("field", "unit_cents"));
    }
    quantity.checked_mul(unit_cents).ok_or_else(overflow)
}

/// Sum of `quantity × unit_cents` over `(quantity, unit_cents)` pairs.
pub fn subtotal<I>(lines: I) -> AppResult<i64>
where
    I: IntoIterator<Item = (i64, i64)>,
{
    lines.into_iter().try_fold(0_i64, |acc, (quantity, unit_cents)| {
        acc.checked_add(line_amount(quantity, unit_cents)?)
            .ok_or_else(overflow)
    })
}

/// `round(subtotal_cents × rate)`, rate a fraction in `[0, 1]`.
pub fn tax(subtotal_cents: i64, rate: Decimal) -> AppResult<i64> {
    require_non_negative(subtotal_cents, "subtotal_cents")?;
    require_rate(rate, "tax_rate")?;
    round_cents(Decimal::from(subtotal_cents) * rate)
}

/// `subtotal + tax - discount`; a negative result is rejected.
pub fn total(subtotal_cents: i64, tax_cents: i64, discount_cents: i64) -> AppResult<i64> {
    require_non_negative(subtotal_cents, "subtotal_cents")?;
    require_non_negative(tax_cents, "tax_cents")?;
    require_non_negative(discount_cents, "discount_cents")?;
    let gross = subtotal_cents.checked_add(tax_cents).ok_or_else(overflow)?;
    let total = gross - discount_cents;
    if total < 0 {
        return Err(AppError::validation(format!(
            "discount ({discount_cents}) exceeds subtotal plus tax ({gross})"
        ))
        .with_detail("field", "discount_cents"));
    }
    Ok(total)
}

/// `round(amount_cents × fee_rate)`
pub fn application_fee(amount_cents: i64, fee_rate: Decimal) -> AppResult<i64> {
    require_non_negative(amount_cents, "amount_cents")?;
    require_rate(fee_rate, "fee_rate")?;
    round_cents(Decimal::from(amount_cents) * fee_rate)
}

/// Amount billed by one split invoice: `round(total_cents × 0.5)`.
///
/// Both halves use the same formula, so an odd total bills one extra cent
/// across deposit and balance.
pub fn split_amount(total_cents: i64) -> AppResult<i64> {
    require_non_negative(total_cents, "total_cents")?;
    round_cents(Decimal::from(total_cents) * SPLIT_SHARE)
}

/// Compute header totals for a new document.
pub fn compute_totals<I>(lines: I, tax_rate: Decimal, discount_cents: i64) -> AppResult<Totals>
where
    I: IntoIterator<Item = (i64, i64)>,
{
    let subtotal_cents = subtotal(lines)?;
    let tax_cents = tax(subtotal_cents, tax_rate)?;
    let total_cents = total(subtotal_cents, tax_cents, discount_cents)?;
    Ok(Totals {
        subtotal_cents,
        tax_cents,
        discount_cents,
        total_cents,
    })
}

impl Totals {
    /// Check `total == subtotal + tax - discount` on a stored or edited header.
    pub fn verify(&self) -> AppResult<()> {
        let expected = total(self.subtotal_cents, self.tax_cents, self.discount_cents)?;
        if expected != self.total_cents {
            return Err(AppError::with_message(
                ErrorCode::TotalsMismatch,
                format!(
                    "total_cents is {} but subtotal + tax - discount is {expected}",
                    self.total_cents
                ),
            ));
        }
        Ok(())
    }
}
