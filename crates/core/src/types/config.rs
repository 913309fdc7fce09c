use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::primitives::{BlockNumber, CurrencyAmount, MPS_TOTAL, Price, TickSpacing, TokenAmount};
use crate::error::ConfigError;

/// One segment of the emission schedule: `mps` released per block for
/// `block_delta` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionStep {
    pub mps: u32,
    pub block_delta: u64,
}

impl AuctionStep {
    pub fn new(mps: u32, block_delta: u64) -> Self {
        Self { mps, block_delta }
    }

    pub fn emission(&self) -> u64 {
        u64::from(self.mps).saturating_mul(self.block_delta)
    }
}

/// Human-scale auction parameters, as read from files and snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionParameters {
    pub total_supply: Decimal,
    pub floor_price: Decimal,
    pub tick_spacing: Decimal,
    pub start_block: u64,
    pub end_block: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_block: Option<u64>,
    pub required_currency_raised: Decimal,
    pub steps: Vec<AuctionStep>,
}

/// Validated, immutable auction configuration in the fixed-point domain.
#[derive(Debug, Clone, PartialEq)]
pub struct AuctionConfig {
    pub start_block: BlockNumber,
    pub end_block: BlockNumber,
    pub claim_block: BlockNumber,
    pub total_supply: TokenAmount,
    pub tick_spacing: TickSpacing,
    pub floor_price: Price,
    pub required_currency_raised: CurrencyAmount,
    pub steps: Vec<AuctionStep>,
    parameters: AuctionParameters,
}

impl AuctionConfig {
    pub fn from_parameters(parameters: AuctionParameters) -> Result<Self, ConfigError> {
        let AuctionParameters {
            total_supply,
            floor_price,
            tick_spacing,
            start_block,
            end_block,
            claim_block,
            required_currency_raised,
            ref steps,
        } = parameters;

        if end_block <= start_block {
            return Err(ConfigError::InvalidDuration {
                start: start_block,
                end: end_block,
            });
        }
        if steps.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        if let Some(index) = steps.iter().position(|step| step.block_delta == 0) {
            return Err(ConfigError::ZeroStepDuration { index });
        }

        let expected = end_block - start_block;
        let actual = steps
            .iter()
            .fold(0u64, |total, step| total.saturating_add(step.block_delta));
        if actual != expected {
            return Err(ConfigError::StepDurationMismatch { expected, actual });
        }

        for (field, value) in [
            ("total supply", total_supply),
            ("floor price", floor_price),
            ("tick spacing", tick_spacing),
        ] {
            if value <= Decimal::ZERO {
                return Err(ConfigError::NonPositive { field });
            }
        }
        if required_currency_raised.is_sign_negative() && !required_currency_raised.is_zero() {
            return Err(ConfigError::NegativeRequiredRaise);
        }

        let spacing = TickSpacing::new(tick_spacing);
        if !spacing.aligns(floor_price) {
            return Err(ConfigError::FloorNotAligned {
                floor: floor_price,
                spacing: tick_spacing,
            });
        }

        let claim_block = claim_block.unwrap_or(end_block);
        if claim_block < end_block {
            return Err(ConfigError::ClaimBeforeEnd {
                claim: claim_block,
                end: end_block,
            });
        }

        let total_emission = steps
            .iter()
            .fold(0u64, |total, step| total.saturating_add(step.emission()));
        if total_emission != u64::from(MPS_TOTAL) {
            warn!(
                total_emission,
                expected = MPS_TOTAL,
                "emission schedule does not release exactly the total supply"
            );
        }

        let total_supply = TokenAmount::from_decimal(total_supply).map_err(|source| {
            ConfigError::OutOfRange {
                field: "total supply",
                source,
            }
        })?;
        let floor_price = Price::from_decimal(floor_price).map_err(|source| {
            ConfigError::OutOfRange {
                field: "floor price",
                source,
            }
        })?;
        let required_currency_raised = CurrencyAmount::from_decimal(required_currency_raised)
            .map_err(|source| ConfigError::OutOfRange {
                field: "required currency raised",
                source,
            })?;

        Ok(Self {
            start_block: BlockNumber::new(start_block),
            end_block: BlockNumber::new(end_block),
            claim_block: BlockNumber::new(claim_block),
            total_supply,
            tick_spacing: spacing,
            floor_price,
            required_currency_raised,
            steps: steps.clone(),
            parameters,
        })
    }

    /// The parameters this configuration was built from.
    pub fn parameters(&self) -> &AuctionParameters {
        &self.parameters
    }

    /// A bid price must be a positive multiple of the tick spacing.
    pub fn is_valid_price(&self, price: Decimal) -> bool {
        price > Decimal::ZERO && self.tick_spacing.aligns(price)
    }

    pub fn duration(&self) -> u64 {
        self.end_block.as_u64() - self.start_block.as_u64()
    }

    pub fn total_emission(&self) -> u64 {
        self.steps
            .iter()
            .fold(0u64, |total, step| total.saturating_add(step.emission()))
    }

    pub fn is_graduation_threshold(&self, raised: CurrencyAmount) -> bool {
        raised >= self.required_currency_raised
    }
}

impl TryFrom<AuctionParameters> for AuctionConfig {
    type Error = ConfigError;

    fn try_from(parameters: AuctionParameters) -> Result<Self, Self::Error> {
        Self::from_parameters(parameters)
    }
}

#[cfg(test)]
pub(crate) fn test_parameters() -> AuctionParameters {
    AuctionParameters {
        total_supply: Decimal::from(1000),
        floor_price: Decimal::ONE,
        tick_spacing: Decimal::ONE,
        start_block: 0,
        end_block: 10,
        claim_block: None,
        required_currency_raised: Decimal::ZERO,
        steps: vec![AuctionStep::new(1_000_000, 10)],
    }
}
