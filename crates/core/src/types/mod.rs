//! Value types shared across the engine.

pub mod action;
pub mod bid;
pub mod checkpoint;
pub mod config;
pub mod primitives;
pub mod state;

pub use action::*;
pub use bid::*;
pub use checkpoint::*;
pub use config::*;
pub use primitives::*;
pub use state::*;
