use alloy::primitives::U256;
use tracing::debug;

use crate::{
    error::{Error, MathError, SettlementError, ValidationError, ValidationErrors},
    math::{self, Q96},
    types::{
        bid::{Bid, BidStatus, Moneyness},
        checkpoint::Checkpoint,
        config::AuctionConfig,
        primitives::{BlockNumber, CurrencyAmount, MPS_TOTAL, TokenAmount},
        state::{AuctionPhase, SimulationState},
    },
};

/// Final outcome of one bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub status: BidStatus,
    pub tokens_filled: TokenAmount,
    pub currency_spent: CurrencyAmount,
    pub refund: CurrencyAmount,
}

#[derive(Debug, Clone, Copy, Default)]
struct Fill {
    tokens: U256,
    currency: U256,
}

impl Fill {
    fn combine(self, other: Self) -> Result<Self, MathError> {
        Ok(Self {
            tokens: self.tokens.checked_add(other.tokens).ok_or(MathError::Overflow)?,
            currency: self
                .currency
                .checked_add(other.currency)
                .ok_or(MathError::Overflow)?,
        })
    }
}

/// Returns a copy of `bid` with its final status, fill and refund.
pub fn settle_bid(bid: &Bid, state: &SimulationState, config: &AuctionConfig) -> Result<Bid, Error> {
    let settlement = compute_settlement(bid, state, config)?;

    Ok(Bid {
        status: settlement.status,
        tokens_filled: settlement.tokens_filled,
        currency_spent: settlement.currency_spent,
        refund: settlement.refund,
        ..bid.clone()
    })
}

pub fn compute_settlement(
    bid: &Bid,
    state: &SimulationState,
    config: &AuctionConfig,
) -> Result<Settlement, Error> {
    if !matches!(state.phase(config), AuctionPhase::Ended) {
        return Err(ValidationErrors::single(ValidationError::AuctionNotOver).into());
    }

    if !state.is_graduated() {
        return Ok(Settlement {
            status: BidStatus::Refunded,
            tokens_filled: TokenAmount::ZERO,
            currency_spent: CurrencyAmount::ZERO,
            refund: bid.amount,
        });
    }

    let start = checkpoint(state, bid.start_block)?;
    let remaining = match start.remaining_mps().as_u32() {
        0 => U256::from(MPS_TOTAL),
        remaining => U256::from(remaining),
    };

    let moneyness = bid.moneyness(state.clearing_price);
    let fill = match moneyness {
        Moneyness::InTheMoney => {
            let end = state.latest_checkpoint()?;
            fully_filled(bid, start, end, remaining)?
        }
        Moneyness::AtTheMoney | Moneyness::OutOfTheMoney => {
            let last_full = checkpoint(state, bid.last_fully_filled_checkpoint_block)?;
            let full = fully_filled(bid, start, last_full, remaining)?;
            let partial = partially_filled(bid, state, last_full.block, remaining)?;
            full.combine(partial)?
        }
    };

    let spent = CurrencyAmount::new(fill.currency).min(bid.amount);
    let settlement = Settlement {
        status: BidStatus::evaluate(moneyness, true, true),
        tokens_filled: TokenAmount::new(fill.tokens),
        currency_spent: spent,
        refund: bid.amount.checked_sub(spent)?,
    };

    debug!(
        bid = %bid.id,
        status = %settlement.status,
        tokens = %settlement.tokens_filled.to_decimal(),
        spent = %settlement.currency_spent.to_decimal(),
        "settled bid"
    );

    Ok(settlement)
}

fn checkpoint(state: &SimulationState, block: BlockNumber) -> Result<&Checkpoint, SettlementError> {
    state
        .checkpoint(block)
        .ok_or(SettlementError::CheckpointMissing(block))
}

/// Fill while the bid sat strictly above the clearing price, from the
/// integrals accumulated between two checkpoints.
fn fully_filled(
    bid: &Bid,
    start: &Checkpoint,
    end: &Checkpoint,
    remaining: U256,
) -> Result<Fill, Error> {
    let negative = |quantity| SettlementError::NegativeDelta {
        quantity,
        start: start.block,
        end: end.block,
    };

    let mps_delta = end
        .cumulative_mps
        .as_u32()
        .checked_sub(start.cumulative_mps.as_u32())
        .ok_or_else(|| negative("cumulative mps"))?;
    let mps_per_price_delta = end
        .cumulative_mps_per_price
        .checked_sub(start.cumulative_mps_per_price)
        .ok_or_else(|| negative("cumulative mps per price"))?;

    let amount = bid.amount.as_u256();
    let tokens = math::mul_div(amount, mps_per_price_delta, Q96 * remaining)?;
    let currency = if tokens.is_zero() {
        U256::ZERO
    } else {
        math::mul_div_up(amount, U256::from(mps_delta), remaining)?
    };

    Ok(Fill { tokens, currency })
}

/// The bid's share of what its tick sold while the clearing price sat
/// exactly on it, after `last_full` and before the bid was outbid.
fn partially_filled(
    bid: &Bid,
    state: &SimulationState,
    last_full: BlockNumber,
    remaining: U256,
) -> Result<Fill, Error> {
    let window_end = bid.outbid_checkpoint_block.unwrap_or(BlockNumber::MAX);
    if last_full >= window_end {
        return Ok(Fill::default());
    }

    let mut raised_at_price = U256::ZERO;
    for checkpoint in state.checkpoints.range(last_full.next()..window_end).map(|(_, cp)| cp) {
        if checkpoint.clearing_price == bid.max_price {
            raised_at_price = raised_at_price
                .checked_add(checkpoint.currency_raised_at_clearing_price.as_u256())
                .ok_or(MathError::Overflow)?;
        }
    }

    let tick_demand = state.ticks.demand_at(bid.max_price).as_u256();
    if raised_at_price.is_zero() || tick_demand.is_zero() {
        return Ok(Fill::default());
    }

    let denominator = tick_demand
        .checked_mul(remaining)
        .ok_or(MathError::Overflow)?;
    let amount = bid.amount.as_u256();
    let currency = math::mul_div_up(amount, raised_at_price, denominator)?;
    let tokens = math::mul_div(
        math::mul_div(amount, raised_at_price, denominator)?,
        Q96,
        bid.max_price.as_u256(),
    )?;

    Ok(Fill { tokens, currency })
}
