use crate::{
    distribution::Distribution,
    error::ValidationErrors,
    types::{
        action::ScheduledBid,
        primitives::{BidId, BlockNumber, Price},
    },
};

/// What happened during one advanced block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockReport {
    pub block: BlockNumber,
    pub clearing_price: Price,
    pub ticks_crossed: usize,
    pub sold: Distribution,
    pub graduated: bool,
    pub ended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockResult {
    Advanced(BlockReport),
    /// The auction had already reached its end block; only `is_ended` was set.
    Finished,
}

impl BlockResult {
    pub fn report(&self) -> Option<&BlockReport> {
        match self {
            Self::Advanced(report) => Some(report),
            Self::Finished => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedBid {
    pub bid: ScheduledBid,
    pub submitted_at: BlockNumber,
    pub errors: ValidationErrors,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorResult {
    pub bids_submitted: Vec<BidId>,
    pub bids_rejected: Vec<RejectedBid>,
    pub blocks_advanced: u64,
    pub final_block: BlockNumber,
    pub reason: CompletionReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    AuctionEnded,
    TargetReached,
}
