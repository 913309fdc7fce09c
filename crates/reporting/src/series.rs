use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cca_sim_core::{Checkpoint, SimulationState};

/// One checkpoint rendered for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub block: u64,
    pub clearing_price: Decimal,
    pub currency_raised: Decimal,
    pub total_cleared: Decimal,
    pub cumulative_mps: u32,
}

impl From<&Checkpoint> for ChartPoint {
    fn from(checkpoint: &Checkpoint) -> Self {
        Self {
            block: checkpoint.block.as_u64(),
            clearing_price: checkpoint.clearing_price.to_decimal(),
            currency_raised: checkpoint.currency_raised.to_decimal(),
            total_cleared: checkpoint.total_cleared.to_decimal(),
            cumulative_mps: checkpoint.cumulative_mps.as_u32(),
        }
    }
}

pub fn chart_series(state: &SimulationState) -> Vec<ChartPoint> {
    state.checkpoints.values().map(ChartPoint::from).collect()
}

/// Effective demand resting at one price level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandLevel {
    pub price: Decimal,
    pub demand: Decimal,
    pub bid_count: usize,
    pub is_above_clearing: bool,
    pub is_at_clearing: bool,
}

/// Demand per initialized tick in ascending price order. The floor is listed
/// only when bids rest on it.
pub fn demand_distribution(state: &SimulationState) -> Vec<DemandLevel> {
    state
        .ticks
        .iter()
        .filter(|tick| !tick.bid_ids.is_empty())
        .map(|tick| DemandLevel {
            price: tick.price.to_decimal(),
            demand: tick.currency_demand.to_decimal(),
            bid_count: tick.bid_ids.len(),
            is_above_clearing: tick.price > state.clearing_price,
            is_at_clearing: tick.price == state.clearing_price,
        })
        .collect()
}
