use alloy::primitives::U256;

use super::primitives::{BlockNumber, Mps, Price, ValueX7};

/// Accounting snapshot taken at the end of every advanced block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub block: BlockNumber,
    pub clearing_price: Price,
    pub cumulative_mps: Mps,
    /// Running sum of `mps * 2^192 / clearing_price`.
    pub cumulative_mps_per_price: U256,
    pub currency_raised: ValueX7,
    pub total_cleared: ValueX7,
    /// Currency taken from the tick sitting exactly at the clearing price
    /// during this block only.
    pub currency_raised_at_clearing_price: ValueX7,
    pub prev_block: Option<BlockNumber>,
}

impl Checkpoint {
    pub fn initial(block: BlockNumber, floor_price: Price) -> Self {
        Self {
            block,
            clearing_price: floor_price,
            cumulative_mps: Mps::ZERO,
            cumulative_mps_per_price: U256::ZERO,
            currency_raised: ValueX7::ZERO,
            total_cleared: ValueX7::ZERO,
            currency_raised_at_clearing_price: ValueX7::ZERO,
            prev_block: None,
        }
    }

    pub fn remaining_mps(&self) -> Mps {
        self.cumulative_mps.remaining()
    }
}
