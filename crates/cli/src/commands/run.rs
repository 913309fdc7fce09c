use std::{fmt, fs, path::Path};

use cca_sim_core::{BlockNumber, Orchestrator, OrchestratorResult, RejectedBid, Simulator};
use cca_sim_reporting::{
    AuctionSummary, ChartPoint, DemandLevel, Snapshot, chart_series, demand_distribution,
};
use eyre::{Result, WrapErr};

use crate::config::Scenario;

/// Everything printed after a simulation, plus the snapshot to export.
#[derive(Debug, Clone)]
pub struct Report {
    pub summary: AuctionSummary,
    pub result: OrchestratorResult,
    pub demand: Vec<DemandLevel>,
    pub series: Vec<ChartPoint>,
    pub snapshot: Snapshot,
    pub show_demand: bool,
}

impl Report {
    pub fn new(simulator: &Simulator, result: OrchestratorResult) -> Self {
        Self {
            summary: AuctionSummary::capture(simulator),
            result,
            demand: demand_distribution(simulator.state()),
            series: chart_series(simulator.state()),
            snapshot: Snapshot::capture(simulator),
            show_demand: false,
        }
    }

    pub fn with_demand(mut self, show: bool) -> Self {
        self.show_demand = show;
        self
    }

    pub fn export(&self, path: &Path) -> Result<()> {
        fs::write(path, self.snapshot.to_json()?)
            .wrap_err_with(|| format!("failed to write snapshot to {}", path.display()))
    }

    /// Writes the per-block chart series as a JSON array.
    pub fn export_series(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.series)?;
        fs::write(path, json)
            .wrap_err_with(|| format!("failed to write series to {}", path.display()))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)?;

        if !self.result.bids_rejected.is_empty() {
            writeln!(f)?;
            writeln!(f, "rejected bids:")?;
            for RejectedBid {
                bid,
                submitted_at,
                errors,
            } in &self.result.bids_rejected
            {
                writeln!(
                    f,
                    "  {} @ block {submitted_at}: {} at {} ({errors})",
                    bid.owner, bid.amount, bid.max_price
                )?;
            }
        }

        if self.show_demand && !self.demand.is_empty() {
            writeln!(f)?;
            writeln!(f, "{:>12} {:>16} {:>5}  position", "price", "demand", "bids")?;
            for level in &self.demand {
                let position = if level.is_at_clearing {
                    "at clearing"
                } else if level.is_above_clearing {
                    "above"
                } else {
                    "below"
                };
                writeln!(
                    f,
                    "{:>12} {:>16} {:>5}  {position}",
                    level.price.normalize(),
                    level.demand.round_dp(4).normalize(),
                    level.bid_count
                )?;
            }
        }

        Ok(())
    }
}

/// Replays the scenario and advances to `target`, or to the end block and
/// settlement when no target is given.
pub fn run(scenario: &Scenario, target: Option<u64>) -> Result<Report> {
    let simulator = Simulator::from_parameters(scenario.parameters.clone())
        .wrap_err("invalid auction parameters")?;
    let mut orchestrator = Orchestrator::new(simulator);

    let result = orchestrator.run(&scenario.bids, target.map(BlockNumber::new))?;

    Ok(Report::new(orchestrator.simulator(), result))
}
