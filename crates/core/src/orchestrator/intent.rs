use crate::{
    error::ValidationErrors,
    types::{
        action::SubmitBidInput,
        primitives::{BidId, BlockNumber},
    },
};

/// A caller's request against a running simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SubmitBid(SubmitBidInput),
    AdvanceOne,
    AdvanceTo(BlockNumber),
    Settle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    Success(IntentResult),
    Rejected {
        intent: Intent,
        errors: ValidationErrors,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentResult {
    BidSubmitted(BidId),
    Advanced { blocks: u64 },
    Settled { bids: usize },
}
