use crate::types::{
    config::{AuctionConfig, AuctionStep},
    primitives::{BlockNumber, MPS_TOTAL, Mps},
};

/// Share of the total supply released by the end of `block`.
pub fn cumulative_mps(config: &AuctionConfig, block: BlockNumber) -> Mps {
    if block <= config.start_block {
        return Mps::ZERO;
    }
    if block >= config.end_block {
        return Mps::FULL;
    }

    let mut elapsed = block.as_u64() - config.start_block.as_u64();
    let mut released = 0u64;

    for step in &config.steps {
        if elapsed == 0 {
            break;
        }
        let blocks = elapsed.min(step.block_delta);
        released = released.saturating_add(u64::from(step.mps).saturating_mul(blocks));
        elapsed -= blocks;
    }

    let released = released.min(u64::from(MPS_TOTAL));
    Mps::new(u32::try_from(released).unwrap_or(MPS_TOTAL))
}

/// The emission step in effect at some block, with its block range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepWindow {
    pub index: usize,
    pub step: AuctionStep,
    pub start_block: BlockNumber,
    pub end_block: BlockNumber,
}

impl StepWindow {
    pub fn contains(&self, block: BlockNumber) -> bool {
        block >= self.start_block && block < self.end_block
    }
}

pub fn current_step(config: &AuctionConfig, block: BlockNumber) -> Option<StepWindow> {
    let mut start = config.start_block.as_u64();

    for (index, step) in config.steps.iter().enumerate() {
        let end = start.saturating_add(step.block_delta);
        let window = StepWindow {
            index,
            step: *step,
            start_block: BlockNumber::new(start),
            end_block: BlockNumber::new(end),
        };
        if window.contains(block) {
            return Some(window);
        }
        start = end;
    }

    None
}
