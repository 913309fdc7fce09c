use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::primitives::{BidId, BlockNumber, Price};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    State(#[from] StateError),
}

impl Error {
    /// True for internal inconsistencies, false for rejected input.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            Self::Ledger(_) | Self::Math(_) | Self::Settlement(_) | Self::State(_)
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("end block {end} must be after start block {start}")]
    InvalidDuration { start: u64, end: u64 },

    #[error("emission schedule has no steps")]
    EmptySchedule,

    #[error("emission step {index} has zero duration")]
    ZeroStepDuration { index: usize },

    #[error("emission steps span {actual} blocks but the auction spans {expected}")]
    StepDurationMismatch { expected: u64, actual: u64 },

    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("required currency raised cannot be negative")]
    NegativeRequiredRaise,

    #[error("floor price {floor} is not a multiple of tick spacing {spacing}")]
    FloorNotAligned { floor: Decimal, spacing: Decimal },

    #[error("claim block {claim} precedes end block {end}")]
    ClaimBeforeEnd { claim: u64, end: u64 },

    #[error("{field} is out of range: {source}")]
    OutOfRange {
        field: &'static str,
        source: MathError,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("bid price must be above current clearing price ({clearing_price})")]
    BidBelowClearingPrice { clearing_price: Decimal },

    #[error("bid price must be a positive multiple of tick spacing {tick_spacing}")]
    InvalidPrice { tick_spacing: Decimal },

    #[error("bid amount must be greater than zero")]
    AmountTooSmall,

    #[error("auction already over")]
    AuctionIsOver,

    #[error("auction not over yet")]
    AuctionNotOver,

    #[error("auction is sold out")]
    AuctionSoldOut,

    #[error("bid owner must be specified")]
    MissingOwner,

    #[error("{field} is out of range for fixed-point arithmetic")]
    ValueOutOfRange { field: &'static str },
}

/// Every check a rejected request failed, reported together.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }

    pub fn single(error: ValidationError) -> Self {
        Self(vec![error])
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }

}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("rejected: ")?;
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("previous tick price {prev} must be below {price}")]
    TickPreviousInvalid { prev: Price, price: Price },

    #[error("tick at {price} is not initialized")]
    TickNotInitialized { price: Price },

    #[error("tick chain broken at {price}")]
    ChainBroken { price: Price },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,

    #[error("arithmetic underflow")]
    Underflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("negative value in unsigned fixed-point domain")]
    Negative,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettlementError {
    #[error("negative {quantity} delta between checkpoints {start} and {end}")]
    NegativeDelta {
        quantity: &'static str,
        start: BlockNumber,
        end: BlockNumber,
    },

    #[error("checkpoint at block {0} missing")]
    CheckpointMissing(BlockNumber),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("bid {0} not found")]
    BidNotFound(BidId),

    #[error("no checkpoint recorded")]
    NoCheckpoint,
}
