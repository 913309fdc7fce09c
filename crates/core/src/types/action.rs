use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::primitives::{BlockNumber, CurrencyAmount, Price};

/// A bid as requested by a caller, in human-scale units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitBidInput {
    pub max_price: Decimal,
    pub amount: Decimal,
    pub owner: String,
}

impl SubmitBidInput {
    pub fn new(max_price: Decimal, amount: Decimal, owner: impl Into<String>) -> Self {
        Self {
            max_price,
            amount,
            owner: owner.into(),
        }
    }
}

/// A bid that passed validation, converted to the fixed-point domain.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBid {
    pub max_price: Price,
    pub amount: CurrencyAmount,
    pub effective_amount: CurrencyAmount,
    pub owner: String,
}

/// A bid stamped with the block at which a replay submits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledBid {
    pub block: u64,
    pub max_price: Decimal,
    pub amount: Decimal,
    pub owner: String,
}

impl ScheduledBid {
    pub fn new(block: u64, max_price: Decimal, amount: Decimal, owner: impl Into<String>) -> Self {
        Self {
            block,
            max_price,
            amount,
            owner: owner.into(),
        }
    }

    pub fn block(&self) -> BlockNumber {
        BlockNumber::new(self.block)
    }

    pub fn input(&self) -> SubmitBidInput {
        SubmitBidInput::new(self.max_price, self.amount, self.owner.clone())
    }
}
