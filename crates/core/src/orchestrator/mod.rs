pub mod block;
pub mod core;
pub mod intent;
pub mod result;

pub use block::{advance_one_block, advance_to_block, submit_bid};
pub use self::core::Orchestrator;
pub use intent::{Intent, IntentOutcome, IntentResult};
pub use result::{BlockReport, BlockResult, CompletionReason, OrchestratorResult, RejectedBid};
