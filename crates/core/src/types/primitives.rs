use std::fmt;

use alloy::primitives::U256;
use rust_decimal::Decimal;

use crate::{error::MathError, math};

/// Parts of the total supply released over the whole auction (1e7 = 100%).
pub const MPS_TOTAL: u32 = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSpacing(Decimal);

impl TickSpacing {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Alignment is decided on the decimal value, before any Q96 rounding.
    pub fn aligns(&self, price: Decimal) -> bool {
        !self.0.is_zero() && (price % self.0).is_zero()
    }
}

/// Q96 price, currency per token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(U256);

impl Price {
    pub const ZERO: Self = Self(U256::ZERO);
    /// Terminates the tick chain; compares above every real price.
    pub const TAIL: Self = Self(U256::MAX);

    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn from_decimal(value: Decimal) -> Result<Self, MathError> {
        math::to_fixed(value).map(Self)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn to_decimal(&self) -> Decimal {
        math::from_fixed(self.0)
    }

    pub fn is_tail(&self) -> bool {
        *self == Self::TAIL
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_tail() {
            f.write_str("tail")
        } else {
            write!(f, "{}", self.to_decimal())
        }
    }
}

/// Q96 currency amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct CurrencyAmount(U256);

impl CurrencyAmount {
    pub const ZERO: Self = Self(U256::ZERO);

    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn from_decimal(value: Decimal) -> Result<Self, MathError> {
        math::to_fixed(value).map(Self)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn to_decimal(&self) -> Decimal {
        math::from_fixed(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Result<Self, MathError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    pub fn checked_sub(self, other: Self) -> Result<Self, MathError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(MathError::Underflow)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

/// Q96 token amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TokenAmount(U256);

impl TokenAmount {
    pub const ZERO: Self = Self(U256::ZERO);

    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn from_decimal(value: Decimal) -> Result<Self, MathError> {
        math::to_fixed(value).map(Self)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn to_decimal(&self) -> Decimal {
        math::from_fixed(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Result<Self, MathError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MathError::Overflow)
    }
}

/// A Q96 quantity carried at `MPS_TOTAL` times its value, so per-block
/// emission shares accumulate without dividing by the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ValueX7(U256);

impl ValueX7 {
    pub const ZERO: Self = Self(U256::ZERO);

    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn from_q96(value: U256) -> Result<Self, MathError> {
        value
            .checked_mul(U256::from(MPS_TOTAL))
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Back to plain Q96, rounding down.
    pub fn scale_down(&self) -> U256 {
        self.0 / U256::from(MPS_TOTAL)
    }

    pub fn to_decimal(&self) -> Decimal {
        math::from_fixed(self.scale_down())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Result<Self, MathError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BidId(u64);

impl BidId {
    pub const FIRST: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for BidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockNumber(u64);

impl BlockNumber {
    pub const MAX: Self = Self(u64::MAX);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Mps(u32);

impl Mps {
    pub const FULL: Self = Self(MPS_TOTAL);
    pub const ZERO: Self = Self(0);

    pub fn new(value: u32) -> Self {
        Self(value.min(MPS_TOTAL))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn remaining(&self) -> Self {
        Self(Self::FULL.0 - self.0)
    }

    pub fn is_sold_out(&self) -> bool {
        self.0 >= Self::FULL.0
    }

    pub fn delta_since(&self, earlier: Self) -> Self {
        Self(self.0.saturating_sub(earlier.0))
    }

    /// Released fraction in `[0, 1]`.
    pub fn to_fraction(&self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(MPS_TOTAL)
    }
}
