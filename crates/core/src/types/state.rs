use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::{
    bid::Bid,
    checkpoint::Checkpoint,
    config::AuctionConfig,
    primitives::{BidId, BlockNumber, CurrencyAmount, Mps, Price, TokenAmount, ValueX7},
};
use crate::{error::StateError, ledger::TickLedger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraduationStatus {
    NotGraduated,
    Graduated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionPhase {
    Active { blocks_remaining: u64 },
    Ended,
}

/// Everything that changes while an auction runs. Owned by a single caller
/// and mutated only by bid submission, block advancement and settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub current_block: BlockNumber,
    pub clearing_price: Price,
    pub currency_raised: ValueX7,
    pub total_cleared: ValueX7,
    /// Effective demand of every tick strictly above the clearing price.
    pub sum_demand_above_clearing: CurrencyAmount,
    pub cumulative_mps: Mps,
    pub bids: BTreeMap<BidId, Bid>,
    pub ticks: TickLedger,
    pub checkpoints: BTreeMap<BlockNumber, Checkpoint>,
    pub graduation: GraduationStatus,
    pub is_ended: bool,
    pub next_bid_id: BidId,
    /// Lowest initialized tick above the clearing price, or `Price::TAIL`.
    pub next_active_tick_price: Price,
}

impl SimulationState {
    pub fn new(config: &AuctionConfig) -> Self {
        let mut checkpoints = BTreeMap::new();
        checkpoints.insert(
            config.start_block,
            Checkpoint::initial(config.start_block, config.floor_price),
        );

        Self {
            current_block: config.start_block,
            clearing_price: config.floor_price,
            currency_raised: ValueX7::ZERO,
            total_cleared: ValueX7::ZERO,
            sum_demand_above_clearing: CurrencyAmount::ZERO,
            cumulative_mps: Mps::ZERO,
            bids: BTreeMap::new(),
            ticks: TickLedger::new(config.floor_price),
            checkpoints,
            graduation: GraduationStatus::NotGraduated,
            is_ended: false,
            next_bid_id: BidId::FIRST,
            next_active_tick_price: Price::TAIL,
        }
    }

    pub fn phase(&self, config: &AuctionConfig) -> AuctionPhase {
        if self.is_ended || self.current_block >= config.end_block {
            AuctionPhase::Ended
        } else {
            AuctionPhase::Active {
                blocks_remaining: config.end_block.as_u64() - self.current_block.as_u64(),
            }
        }
    }

    pub fn is_graduated(&self) -> bool {
        matches!(self.graduation, GraduationStatus::Graduated)
    }

    pub fn latest_checkpoint(&self) -> Result<&Checkpoint, StateError> {
        self.checkpoints
            .values()
            .next_back()
            .ok_or(StateError::NoCheckpoint)
    }

    pub fn checkpoint(&self, block: BlockNumber) -> Option<&Checkpoint> {
        self.checkpoints.get(&block)
    }

    pub fn bid(&self, id: BidId) -> Result<&Bid, StateError> {
        self.bids.get(&id).ok_or(StateError::BidNotFound(id))
    }

    /// Currency raised so far, rounded down to Q96.
    pub fn raised(&self) -> CurrencyAmount {
        CurrencyAmount::new(self.currency_raised.scale_down())
    }

    /// Tokens cleared so far, rounded down to Q96.
    pub fn cleared(&self) -> TokenAmount {
        TokenAmount::new(self.total_cleared.scale_down())
    }

    /// Released share of the supply in `[0, 1]`.
    pub fn progress(&self) -> Decimal {
        self.cumulative_mps.to_fraction()
    }
}
