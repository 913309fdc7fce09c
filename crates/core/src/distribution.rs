use alloy::primitives::U256;

use crate::{
    error::MathError,
    math::{self, Q96},
    solver::ClearingOutcome,
    types::{
        config::AuctionConfig,
        primitives::{MPS_TOTAL, Mps, ValueX7},
        state::SimulationState,
    },
};

/// One block's sales, all scaled by `MPS_TOTAL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Distribution {
    pub currency_raised: ValueX7,
    pub tokens_cleared: ValueX7,
    pub currency_raised_at_clearing_price: ValueX7,
}

/// Sells the tokens released by `delta` at the solved clearing price.
///
/// Demand strictly above the price is filled in full. A tick sitting exactly
/// at the price only tops up to the supply's value at that price, and never
/// beyond its own demand.
pub fn distribute(
    state: &SimulationState,
    config: &AuctionConfig,
    delta: Mps,
    outcome: &ClearingOutcome,
) -> Result<Distribution, MathError> {
    if delta == Mps::ZERO {
        return Ok(Distribution::default());
    }

    let delta = U256::from(delta.as_u32());
    let price = outcome.clearing_price;
    let supply = config.total_supply.as_u256();

    let above = scale(outcome.sum_demand_above_clearing.as_u256(), delta)?;

    let at_clearing_price = match state.ticks.get(price).filter(|tick| tick.has_demand()) {
        Some(tick) => {
            let implied = scale(math::mul_div(supply, price.as_u256(), Q96)?, delta)?;
            let share = scale(tick.currency_demand.as_u256(), delta)?;
            implied.saturating_sub(above).min(share)
        }
        None => U256::ZERO,
    };

    let raised = above
        .checked_add(at_clearing_price)
        .ok_or(MathError::Overflow)?;

    let tokens = math::mul_div_up(raised, Q96, price.as_u256())?;
    let capacity = scale(supply, U256::from(MPS_TOTAL))?.saturating_sub(state.total_cleared.as_u256());

    Ok(Distribution {
        currency_raised: ValueX7::new(raised),
        tokens_cleared: ValueX7::new(tokens.min(capacity)),
        currency_raised_at_clearing_price: ValueX7::new(at_clearing_price),
    })
}

fn scale(value: U256, factor: U256) -> Result<U256, MathError> {
    value.checked_mul(factor).ok_or(MathError::Overflow)
}
