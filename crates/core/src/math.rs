use alloy::primitives::{U256, U512};
use rust_decimal::Decimal;

use crate::error::MathError;

/// 2^96, the fixed-point scale for prices and amounts.
pub const Q96: U256 = U256::from_limbs([0, 1 << (96 - 64), 0, 0]);
pub const RESOLUTION: usize = 96;

/// Fractional digits kept when rendering a Q96 value as a decimal.
const DISPLAY_DIGITS: u32 = 18;
/// Largest mantissa a `Decimal` can hold (2^96 - 1).
const DECIMAL_MAX_MANTISSA: u128 = (1u128 << 96) - 1;

/// Decimal to Q96, rounding half up to the nearest 2^-96.
pub fn to_fixed(value: Decimal) -> Result<U256, MathError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(MathError::Negative);
    }

    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let divisor = U256::from(10u128.pow(value.scale()));
    let scaled = mantissa << RESOLUTION;

    Ok((scaled + (divisor >> 1usize)) / divisor)
}

/// Q96 to decimal with 18 fractional digits, rounded half up. Saturates at
/// `Decimal::MAX`.
pub fn from_fixed(value: U256) -> Decimal {
    let integer = value >> RESOLUTION;
    if integer > U256::from(DECIMAL_MAX_MANTISSA) {
        return Decimal::MAX;
    }

    let fraction = value & (Q96 - U256::from(1u8));
    let fraction = (fraction * U256::from(10u128.pow(DISPLAY_DIGITS)) + (Q96 >> 1usize)) >> RESOLUTION;

    let whole = Decimal::from_i128_with_scale(integer.to::<u128>() as i128, 0);
    let fraction = Decimal::from_i128_with_scale(fraction.to::<u128>() as i128, DISPLAY_DIGITS);

    whole
        .checked_add(fraction)
        .unwrap_or(Decimal::MAX)
        .normalize()
}

/// Ceiling division; a zero divisor yields zero.
pub fn div_up(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::ZERO;
    }
    let quotient = a / b;
    if (a % b).is_zero() {
        quotient
    } else {
        quotient + U256::from(1u8)
    }
}

/// `a * b / denominator` with a 512-bit intermediate, rounded down.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let product = U512::from(a) * U512::from(b);
    narrow(product / U512::from(denominator))
}

/// `a * b / denominator` with a 512-bit intermediate, rounded up.
pub fn mul_div_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let product = U512::from(a) * U512::from(b);
    let denominator = U512::from(denominator);
    let quotient = product / denominator;
    if (product % denominator).is_zero() {
        narrow(quotient)
    } else {
        narrow(quotient + U512::from(1u8))
    }
}

/// Whether `a * b >= c * d`, compared without overflow.
pub fn product_at_least(a: U256, b: U256, c: U256, d: U256) -> bool {
    U512::from(a) * U512::from(b) >= U512::from(c) * U512::from(d)
}

fn narrow(value: U512) -> Result<U256, MathError> {
    if value > U512::from(U256::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(value.to::<U256>())
}
