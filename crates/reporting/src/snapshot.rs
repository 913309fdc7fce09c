//! Portable JSON snapshot of a simulation.
//!
//! A snapshot stores the configuration and the bids as submitted, plus
//! read-only summaries of the state and checkpoints. Restoring never loads
//! internal structures: bids are replayed through the engine in block order
//! and the result is advanced to the exported block.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use cca_sim_core::{
    AuctionParameters, Bid, BidStatus, BlockNumber, Orchestrator, OrchestratorResult, ScheduledBid,
    SimulationState, Simulator,
};

use crate::{
    error::ReportError,
    series::{ChartPoint, chart_series},
};

pub const SNAPSHOT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub config: AuctionParameters,
    pub state: StateSummary,
    pub bids: Vec<BidRecord>,
    pub checkpoints: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub current_block: u64,
    pub clearing_price: Decimal,
    pub currency_raised: Decimal,
    pub total_cleared: Decimal,
    pub cumulative_mps: u32,
    pub is_graduated: bool,
    pub is_ended: bool,
}

impl From<&SimulationState> for StateSummary {
    fn from(state: &SimulationState) -> Self {
        Self {
            current_block: state.current_block.as_u64(),
            clearing_price: state.clearing_price.to_decimal(),
            currency_raised: state.raised().to_decimal(),
            total_cleared: state.cleared().to_decimal(),
            cumulative_mps: state.cumulative_mps.as_u32(),
            is_graduated: state.is_graduated(),
            is_ended: state.is_ended,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidRecord {
    pub id: u64,
    pub owner: String,
    pub max_price: Decimal,
    pub amount: Decimal,
    pub start_block: u64,
    pub status: BidStatus,
    #[serde(default)]
    pub effective_amount: Decimal,
    #[serde(default)]
    pub tokens_filled: Decimal,
    #[serde(default)]
    pub currency_spent: Decimal,
    #[serde(default)]
    pub refund: Decimal,
}

impl From<&Bid> for BidRecord {
    fn from(bid: &Bid) -> Self {
        Self {
            id: bid.id.as_u64(),
            owner: bid.owner.clone(),
            max_price: bid.max_price.to_decimal(),
            amount: bid.amount.to_decimal(),
            start_block: bid.start_block.as_u64(),
            status: bid.status,
            effective_amount: bid.effective_amount.to_decimal(),
            tokens_filled: bid.tokens_filled.to_decimal(),
            currency_spent: bid.currency_spent.to_decimal(),
            refund: bid.refund.to_decimal(),
        }
    }
}

/// A simulator rebuilt from a snapshot, with the replay tally.
#[derive(Debug, Clone)]
pub struct Restored {
    pub simulator: Simulator,
    pub result: OrchestratorResult,
}

impl Snapshot {
    pub fn capture(simulator: &Simulator) -> Self {
        let state = simulator.state();

        Self {
            version: SNAPSHOT_VERSION.to_string(),
            config: simulator.config().parameters().clone(),
            state: StateSummary::from(state),
            bids: state.bids.values().map(BidRecord::from).collect(),
            checkpoints: chart_series(state),
        }
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and checks a snapshot document without replaying it.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<(), ReportError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(ReportError::UnsupportedVersion {
                found: self.version.clone(),
                expected: SNAPSHOT_VERSION,
            });
        }

        let start = self.config.start_block;
        let end = self.config.end_block;
        let current = self.state.current_block;
        if current < start || current > end {
            return Err(ReportError::shape(
                "state",
                format!("current block {current} outside {start}..={end}"),
            ));
        }

        let mut ids = HashSet::new();
        for bid in &self.bids {
            if !ids.insert(bid.id) {
                return Err(ReportError::shape("bids", format!("duplicate bid id {}", bid.id)));
            }
            if bid.start_block < start || bid.start_block > current {
                return Err(ReportError::shape(
                    "bids",
                    format!(
                        "bid {} starts at block {} outside {start}..={current}",
                        bid.id, bid.start_block
                    ),
                ));
            }
        }

        if !self
            .checkpoints
            .windows(2)
            .all(|pair| pair[0].block < pair[1].block)
        {
            return Err(ReportError::shape("checkpoints", "blocks are not ascending"));
        }

        Ok(())
    }

    /// Bids in submission order, stamped with the block they were placed at.
    pub fn scheduled_bids(&self) -> Vec<ScheduledBid> {
        let mut records: Vec<&BidRecord> = self.bids.iter().collect();
        records.sort_by_key(|bid| (bid.start_block, bid.id));

        records
            .into_iter()
            .map(|bid| {
                ScheduledBid::new(bid.start_block, bid.max_price, bid.amount, bid.owner.clone())
            })
            .collect()
    }

    /// Replays the snapshot through a fresh simulator. Bids the engine now
    /// rejects are reported in the result rather than failing the restore.
    pub fn restore(&self) -> Result<Restored, ReportError> {
        let mut orchestrator = Orchestrator::new(Simulator::from_parameters(self.config.clone())?);

        let target = BlockNumber::new(self.state.current_block);
        let result = orchestrator.run(&self.scheduled_bids(), Some(target))?;

        if result.bids_submitted.len() != self.bids.len() {
            warn!(
                expected = self.bids.len(),
                restored = result.bids_submitted.len(),
                "snapshot restored with rejected bids"
            );
        }
        info!(
            block = self.state.current_block,
            bids = result.bids_submitted.len(),
            "snapshot restored"
        );

        Ok(Restored {
            simulator: orchestrator.into_simulator(),
            result,
        })
    }
}
