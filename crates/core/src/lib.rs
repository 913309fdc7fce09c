pub mod distribution;
pub mod error;
pub mod ledger;
pub mod math;
pub mod orchestrator;
pub mod presets;
pub mod schedule;
pub mod settlement;
pub mod simulator;
pub mod solver;
pub mod types;
pub mod validation;

pub use error::*;
pub use orchestrator::{
    BlockReport, BlockResult, CompletionReason, Intent, IntentOutcome, IntentResult, Orchestrator,
    OrchestratorResult, RejectedBid,
};
pub use presets::{EmissionTemplate, PresetScenario, StepShare, preset, presets};
pub use simulator::Simulator;
pub use types::*;
pub use validation::validate_submit_bid;
