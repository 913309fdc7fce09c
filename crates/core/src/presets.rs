//! Ready-made emission schedules and auction scenarios.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::types::{
    action::ScheduledBid,
    config::{AuctionParameters, AuctionStep},
    primitives::MPS_TOTAL,
};

/// Blocks between the end of an auction and its claim block when a schedule
/// is built from shares.
pub const CLAIM_DELAY: u64 = 100;

/// A draft schedule segment: a share of the supply released evenly over
/// `block_delta` blocks. Shares need not add up to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepShare {
    pub percent: Decimal,
    pub block_delta: u64,
}

impl StepShare {
    pub fn new(percent: Decimal, block_delta: u64) -> Self {
        Self {
            percent,
            block_delta,
        }
    }
}

/// Turns percent shares into per-block emission steps. Shares are scaled to
/// 100% and the rounding residue is folded into the last step.
pub fn normalize_steps(shares: &[StepShare]) -> Vec<AuctionStep> {
    let total: Decimal = shares.iter().map(|share| share.percent).sum();
    if total <= Decimal::ZERO {
        return vec![AuctionStep::new(1000, 10_000)];
    }

    let mps_total = Decimal::from(MPS_TOTAL);
    let mut steps: Vec<AuctionStep> = shares
        .iter()
        .map(|share| {
            let mps = if share.block_delta == 0 {
                Decimal::ZERO
            } else {
                share.percent / total * mps_total / Decimal::from(share.block_delta)
            };
            AuctionStep::new(round_mps(mps), share.block_delta)
        })
        .collect();

    let released: u64 = steps.iter().map(AuctionStep::emission).sum();
    if let Some(last) = steps.last_mut().filter(|step| step.block_delta > 0) {
        let residue = i128::from(MPS_TOTAL) - i128::from(released);
        let correction = Decimal::from(residue) / Decimal::from(last.block_delta);
        let corrected = Decimal::from(last.mps) + correction;
        last.mps = round_mps(corrected);
    }

    steps
}

fn round_mps(value: Decimal) -> u32 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .max(Decimal::ZERO)
        .to_u32()
        .unwrap_or(MPS_TOTAL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionTemplate {
    Linear,
    FrontLoaded,
    BackLoaded,
}

impl EmissionTemplate {
    pub const ALL: [Self; 3] = [Self::Linear, Self::FrontLoaded, Self::BackLoaded];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::FrontLoaded => "front_loaded",
            Self::BackLoaded => "back_loaded",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|template| template.key() == key)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Linear => "ten equal tranches of 1,000 blocks",
            Self::FrontLoaded => "half over 2,500 blocks, the rest over 10,000",
            Self::BackLoaded => "5% over 5,000 blocks, 95% over the next 5,000",
        }
    }

    pub fn shares(&self) -> Vec<StepShare> {
        match self {
            Self::Linear => vec![StepShare::new(Decimal::TEN, 1000); 10],
            Self::FrontLoaded => vec![
                StepShare::new(Decimal::from(50), 2500),
                StepShare::new(Decimal::from(50), 10_000),
            ],
            Self::BackLoaded => vec![
                StepShare::new(Decimal::from(5), 5000),
                StepShare::new(Decimal::from(95), 5000),
            ],
        }
    }

    pub fn steps(&self) -> Vec<AuctionStep> {
        normalize_steps(&self.shares())
    }

    /// Replaces the schedule of `parameters`, moving the end and claim blocks
    /// to match the template's length.
    pub fn apply(&self, parameters: &mut AuctionParameters) {
        let steps = self.steps();
        let duration = steps
            .iter()
            .fold(0u64, |total, step| total.saturating_add(step.block_delta));
        parameters.end_block = parameters.start_block.saturating_add(duration);
        parameters.claim_block = Some(parameters.end_block.saturating_add(CLAIM_DELAY));
        parameters.steps = steps;
    }
}

/// Parameters used when nothing else is specified: one million tokens
/// released evenly over 10,000 blocks from a floor of 0.001.
pub fn default_parameters() -> AuctionParameters {
    AuctionParameters {
        total_supply: Decimal::from(1_000_000),
        floor_price: Decimal::new(1, 3),
        tick_spacing: Decimal::new(1, 4),
        start_block: 0,
        end_block: 10_000,
        claim_block: Some(10_000 + CLAIM_DELAY),
        required_currency_raised: Decimal::from(100),
        steps: vec![AuctionStep::new(1000, 10_000)],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresetScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: AuctionParameters,
    pub bids: Vec<ScheduledBid>,
}

pub fn presets() -> Vec<PresetScenario> {
    vec![
        cold_start(),
        hot_auction(),
        graduation_edge(),
        partial_fill(),
        time_weighting(),
    ]
}

pub fn preset(key: &str) -> Option<PresetScenario> {
    presets().into_iter().find(|scenario| scenario.key == key)
}

fn bid(block: u64, price: Decimal, amount: Decimal, owner: &str) -> ScheduledBid {
    ScheduledBid::new(block, price, amount, owner)
}

fn cold_start() -> PresetScenario {
    PresetScenario {
        key: "cold_start",
        name: "Cold start",
        description: "a few small bids just above the floor",
        parameters: default_parameters(),
        bids: vec![
            bid(100, Decimal::new(12, 4), Decimal::from(5), "User_1"),
            bid(500, Decimal::new(11, 4), Decimal::from(3), "User_2"),
            bid(1000, Decimal::new(15, 4), Decimal::from(8), "User_3"),
        ],
    }
}

fn hot_auction() -> PresetScenario {
    let bids = (0..50u64)
        .map(|i| {
            let price = Decimal::new(11 + ((i * 37) % 90) as i64, 4);
            let amount = Decimal::ONE + Decimal::new(((i * 53) % 300) as i64, 1);
            ScheduledBid::new((i * 97) % 5000, price, amount, format!("User_{}", i + 1))
        })
        .collect();

    PresetScenario {
        key: "hot_auction",
        name: "Hot auction",
        description: "fifty bids spread over the first half, pushing the price up",
        parameters: default_parameters(),
        bids,
    }
}

fn graduation_edge() -> PresetScenario {
    PresetScenario {
        key: "graduation_edge",
        name: "Graduation edge",
        description: "total raise lands right around the graduation threshold",
        parameters: default_parameters(),
        bids: vec![
            bid(100, Decimal::new(2, 3), Decimal::from(30), "User_1"),
            bid(500, Decimal::new(25, 4), Decimal::from(25), "User_2"),
            bid(1000, Decimal::new(3, 3), Decimal::from(20), "User_3"),
            bid(2000, Decimal::new(22, 4), Decimal::from(23), "User_4"),
        ],
    }
}

fn partial_fill() -> PresetScenario {
    PresetScenario {
        key: "partial_fill",
        name: "Partial fill",
        description: "several bids sharing one price level",
        parameters: AuctionParameters {
            required_currency_raised: Decimal::from(50),
            ..default_parameters()
        },
        bids: vec![
            bid(100, Decimal::new(2, 3), Decimal::from(20), "User_1"),
            bid(200, Decimal::new(2, 3), Decimal::from(15), "User_2"),
            bid(300, Decimal::new(2, 3), Decimal::from(25), "User_3"),
            bid(400, Decimal::new(2, 3), Decimal::from(10), "User_4"),
        ],
    }
}

fn time_weighting() -> PresetScenario {
    PresetScenario {
        key: "time_weighting",
        name: "Time weighting",
        description: "equal bids placed early, midway and late",
        parameters: AuctionParameters {
            required_currency_raised: Decimal::from(50),
            ..default_parameters()
        },
        bids: vec![
            bid(100, Decimal::new(3, 3), Decimal::TEN, "Early_User"),
            bid(5000, Decimal::new(3, 3), Decimal::TEN, "Mid_User"),
            bid(9000, Decimal::new(3, 3), Decimal::TEN, "Late_User"),
        ],
    }
}
