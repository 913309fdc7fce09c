use alloy::primitives::U256;
use rust_decimal::Decimal;

use crate::{
    error::{MathError, ValidationError, ValidationErrors},
    math,
    types::{
        action::{PreparedBid, SubmitBidInput},
        config::AuctionConfig,
        primitives::{CurrencyAmount, MPS_TOTAL, Price},
        state::{AuctionPhase, SimulationState},
    },
};

/// Checks a bid against the current state and converts it to fixed point.
///
/// Every failed check is reported; nothing is applied on failure.
pub fn validate_submit_bid(
    input: &SubmitBidInput,
    state: &SimulationState,
    config: &AuctionConfig,
) -> Result<PreparedBid, ValidationErrors> {
    let mut errors = Vec::new();

    let max_price = Price::from_decimal(input.max_price).ok();
    if max_price.is_some_and(|price| price <= state.clearing_price) {
        errors.push(ValidationError::BidBelowClearingPrice {
            clearing_price: state.clearing_price.to_decimal(),
        });
    }

    if !config.is_valid_price(input.max_price) {
        errors.push(ValidationError::InvalidPrice {
            tick_spacing: config.tick_spacing.as_decimal(),
        });
    }

    if input.amount <= Decimal::ZERO {
        errors.push(ValidationError::AmountTooSmall);
    }

    match state.phase(config) {
        AuctionPhase::Ended => errors.push(ValidationError::AuctionIsOver),
        AuctionPhase::Active { .. } if state.cumulative_mps.is_sold_out() => {
            errors.push(ValidationError::AuctionSoldOut)
        }
        AuctionPhase::Active { .. } => {}
    }

    if input.owner.trim().is_empty() {
        errors.push(ValidationError::MissingOwner);
    }

    if !errors.is_empty() {
        return Err(ValidationErrors::new(errors));
    }

    let max_price = max_price.ok_or_else(|| {
        ValidationErrors::single(ValidationError::ValueOutOfRange { field: "max price" })
    })?;
    let amount = CurrencyAmount::from_decimal(input.amount)
        .map_err(|_| ValidationErrors::single(ValidationError::ValueOutOfRange { field: "amount" }))?;
    let effective_amount = effective_amount(amount, state)
        .map_err(|_| ValidationErrors::single(ValidationError::ValueOutOfRange { field: "amount" }))?;

    Ok(PreparedBid {
        max_price,
        amount,
        effective_amount,
        owner: input.owner.trim().to_string(),
    })
}

/// Scales `amount` up by the inverse of the unreleased share of supply, so
/// later bids weigh more per block than earlier ones of the same size.
pub fn effective_amount(
    amount: CurrencyAmount,
    state: &SimulationState,
) -> Result<CurrencyAmount, MathError> {
    let remaining = state.cumulative_mps.remaining().as_u32();
    if remaining == 0 {
        return Ok(amount);
    }

    math::mul_div(
        amount.as_u256(),
        U256::from(MPS_TOTAL),
        U256::from(remaining),
    )
    .map(CurrencyAmount::new)
}
