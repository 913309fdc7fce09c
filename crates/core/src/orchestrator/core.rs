use tracing::{debug, info, warn};

use crate::{
    error::Error,
    orchestrator::{
        BlockResult, CompletionReason, Intent, IntentOutcome, IntentResult, OrchestratorResult,
        RejectedBid,
    },
    simulator::Simulator,
    types::{
        action::ScheduledBid,
        primitives::{BidId, BlockNumber},
    },
};

/// Drives a [`Simulator`] through a sequence of intents or a block-stamped
/// bid schedule, keeping a tally of what was accepted and rejected.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    simulator: Simulator,
    bids_submitted: Vec<BidId>,
    bids_rejected: Vec<RejectedBid>,
    blocks_advanced: u64,
}

impl Orchestrator {
    pub fn new(simulator: Simulator) -> Self {
        Self {
            simulator,
            bids_submitted: Vec::new(),
            bids_rejected: Vec::new(),
            blocks_advanced: 0,
        }
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn into_simulator(self) -> Simulator {
        self.simulator
    }

    /// Applies one intent. Rejected input comes back as
    /// [`IntentOutcome::Rejected`]; internal defects are returned as errors.
    pub fn execute(&mut self, intent: Intent) -> Result<IntentOutcome, Error> {
        let result = match &intent {
            Intent::SubmitBid(input) => self
                .simulator
                .submit_bid(input)
                .map(IntentResult::BidSubmitted),
            Intent::AdvanceOne => {
                self.simulator
                    .advance_one_block()
                    .map(|result| IntentResult::Advanced {
                        blocks: match result {
                            BlockResult::Advanced(_) => 1,
                            BlockResult::Finished => 0,
                        },
                    })
            }
            Intent::AdvanceTo(target) => self
                .simulator
                .advance_to_block(*target)
                .map(|blocks| IntentResult::Advanced { blocks }),
            Intent::Settle => self
                .simulator
                .settle_all()
                .map(|bids| IntentResult::Settled { bids }),
        };

        match result {
            Ok(result) => {
                self.record_result(&result);
                Ok(IntentOutcome::Success(result))
            }
            Err(Error::Validation(errors)) => Ok(IntentOutcome::Rejected { intent, errors }),
            Err(error) => Err(error),
        }
    }

    /// Replays bids in block order: the simulation is advanced to each bid's
    /// block before it is submitted. Rejected bids are logged and recorded.
    /// Bids stamped after `until` are left out and the simulation is never
    /// advanced past it.
    pub fn replay(
        &mut self,
        bids: &[ScheduledBid],
        until: Option<BlockNumber>,
    ) -> Result<(), Error> {
        let mut ordered: Vec<&ScheduledBid> = bids
            .iter()
            .filter(|bid| until.is_none_or(|until| bid.block() <= until))
            .collect();
        ordered.sort_by_key(|bid| bid.block);

        let skipped = bids.len() - ordered.len();
        if skipped > 0 {
            debug!(skipped, ?until, "bids after the target block left out");
        }

        for bid in ordered {
            self.execute(Intent::AdvanceTo(bid.block()))?;

            let submitted_at = self.simulator.state().current_block;
            if let IntentOutcome::Rejected { errors, .. } =
                self.execute(Intent::SubmitBid(bid.input()))?
            {
                warn!(
                    block = bid.block,
                    owner = %bid.owner,
                    max_price = %bid.max_price,
                    amount = %bid.amount,
                    %errors,
                    "scheduled bid rejected"
                );
                self.bids_rejected.push(RejectedBid {
                    bid: bid.clone(),
                    submitted_at,
                    errors,
                });
            }
        }

        Ok(())
    }

    /// Replays `bids`, advances to `target` (the end block when `None`) and
    /// settles every bid if the auction ended. With an explicit target only
    /// bids stamped at or before it are replayed.
    pub fn run(
        &mut self,
        bids: &[ScheduledBid],
        target: Option<BlockNumber>,
    ) -> Result<OrchestratorResult, Error> {
        self.replay(bids, target)?;

        let target = target.unwrap_or(self.simulator.config().end_block);
        self.execute(Intent::AdvanceTo(target))?;

        if !self.simulator.state().is_ended {
            return Ok(self.finalize(CompletionReason::TargetReached));
        }

        self.execute(Intent::Settle)?;
        info!(
            submitted = self.bids_submitted.len(),
            rejected = self.bids_rejected.len(),
            graduated = self.simulator.state().is_graduated(),
            "scenario finished"
        );

        Ok(self.finalize(CompletionReason::AuctionEnded))
    }

    fn record_result(&mut self, result: &IntentResult) {
        match result {
            IntentResult::BidSubmitted(id) => self.bids_submitted.push(*id),
            IntentResult::Advanced { blocks } => self.blocks_advanced += blocks,
            IntentResult::Settled { .. } => {}
        }
    }

    fn finalize(&self, reason: CompletionReason) -> OrchestratorResult {
        OrchestratorResult {
            bids_submitted: self.bids_submitted.clone(),
            bids_rejected: self.bids_rejected.clone(),
            blocks_advanced: self.blocks_advanced,
            final_block: self.simulator.state().current_block,
            reason,
        }
    }
}
