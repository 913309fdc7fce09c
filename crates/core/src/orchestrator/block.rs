use alloy::primitives::U256;
use tracing::{debug, info};

use super::result::{BlockReport, BlockResult};
use crate::{
    distribution,
    error::{Error, MathError},
    ledger::Tick,
    schedule, solver,
    types::{
        action::SubmitBidInput,
        bid::{Bid, BidStatus},
        checkpoint::Checkpoint,
        config::AuctionConfig,
        primitives::{BidId, BlockNumber, CurrencyAmount, Mps, Price, TokenAmount},
        state::{GraduationStatus, SimulationState},
    },
    validation,
};

/// Validates and records a bid at the current block, then re-solves the
/// clearing price so later bids in the same block see the new demand.
///
/// Rejected bids leave `state` untouched.
pub fn submit_bid(
    state: &mut SimulationState,
    config: &AuctionConfig,
    input: &SubmitBidInput,
) -> Result<BidId, Error> {
    let prepared = validation::validate_submit_bid(input, state, config)?;

    let prev = state
        .ticks
        .prev_tick_price(prepared.max_price, state.next_active_tick_price)?;
    let sum_above = state
        .sum_demand_above_clearing
        .checked_add(prepared.effective_amount)?;

    let id = state.next_bid_id;
    let tick: &mut Tick = state.ticks.initialize_tick_if_needed(
        prev,
        prepared.max_price,
        &mut state.next_active_tick_price,
    )?;
    tick.add_bid(id, prepared.effective_amount)?;
    state.sum_demand_above_clearing = sum_above;

    state.bids.insert(
        id,
        Bid {
            id,
            owner: prepared.owner,
            max_price: prepared.max_price,
            amount: prepared.amount,
            start_block: state.current_block,
            start_cumulative_mps: state.cumulative_mps,
            effective_amount: prepared.effective_amount,
            status: BidStatus::Active,
            tokens_filled: TokenAmount::ZERO,
            currency_spent: CurrencyAmount::ZERO,
            refund: CurrencyAmount::ZERO,
            last_fully_filled_checkpoint_block: state.current_block,
            outbid_checkpoint_block: None,
        },
    );
    state.next_bid_id = id.next();

    let outcome = solver::solve(state, config)?;
    state.clearing_price = outcome.clearing_price;
    state.sum_demand_above_clearing = outcome.sum_demand_above_clearing;
    state.next_active_tick_price = outcome.next_active_tick_price;

    debug!(
        bid = %id,
        block = %state.current_block,
        price = %prepared.max_price,
        amount = %prepared.amount.to_decimal(),
        effective = %prepared.effective_amount.to_decimal(),
        clearing_price = %state.clearing_price,
        "bid submitted"
    );

    Ok(id)
}

/// Moves the auction forward by one block: releases supply, solves the
/// clearing price, sells, checkpoints and re-evaluates every bid.
pub fn advance_one_block(
    state: &mut SimulationState,
    config: &AuctionConfig,
) -> Result<BlockResult, Error> {
    if state.current_block >= config.end_block {
        state.is_ended = true;
        return Ok(BlockResult::Finished);
    }

    let block = state.current_block.next();
    let cumulative_mps = schedule::cumulative_mps(config, block);
    let delta = cumulative_mps.delta_since(state.cumulative_mps);

    let outcome = solver::solve(state, config)?;
    let sold = distribution::distribute(state, config, delta, &outcome)?;

    let currency_raised = state.currency_raised.checked_add(sold.currency_raised)?;
    let total_cleared = state.total_cleared.checked_add(sold.tokens_cleared)?;
    let previous = state.latest_checkpoint()?;
    let cumulative_mps_per_price = previous
        .cumulative_mps_per_price
        .checked_add(mps_per_price(delta, outcome.clearing_price)?)
        .ok_or(MathError::Overflow)?;
    let prev_block = previous.block;

    let was_graduated = state.is_graduated();
    let graduated =
        config.is_graduation_threshold(CurrencyAmount::new(currency_raised.scale_down()));
    let ended = block >= config.end_block;

    state.checkpoints.insert(
        block,
        Checkpoint {
            block,
            clearing_price: outcome.clearing_price,
            cumulative_mps,
            cumulative_mps_per_price,
            currency_raised,
            total_cleared,
            currency_raised_at_clearing_price: sold.currency_raised_at_clearing_price,
            prev_block: Some(prev_block),
        },
    );

    state.current_block = block;
    state.cumulative_mps = cumulative_mps;
    state.clearing_price = outcome.clearing_price;
    state.sum_demand_above_clearing = outcome.sum_demand_above_clearing;
    state.next_active_tick_price = outcome.next_active_tick_price;
    state.currency_raised = currency_raised;
    state.total_cleared = total_cleared;
    state.graduation = if graduated {
        GraduationStatus::Graduated
    } else {
        GraduationStatus::NotGraduated
    };
    state.is_ended = ended;

    for bid in state.bids.values_mut() {
        bid.record_checkpoint(block, outcome.clearing_price, ended, graduated);
    }

    debug!(
        %block,
        clearing_price = %outcome.clearing_price,
        ticks_crossed = outcome.ticks_crossed,
        raised = %state.raised().to_decimal(),
        cleared = %state.cleared().to_decimal(),
        "advanced block"
    );
    if graduated && !was_graduated {
        info!(%block, raised = %state.raised().to_decimal(), "auction graduated");
    }
    if ended {
        info!(
            %block,
            clearing_price = %outcome.clearing_price,
            graduated,
            "auction ended"
        );
    }

    Ok(BlockResult::Advanced(BlockReport {
        block,
        clearing_price: outcome.clearing_price,
        ticks_crossed: outcome.ticks_crossed,
        sold,
        graduated,
        ended,
    }))
}

/// Advances block by block up to `min(target, end_block)`. Returns how many
/// blocks were advanced.
pub fn advance_to_block(
    state: &mut SimulationState,
    config: &AuctionConfig,
    target: BlockNumber,
) -> Result<u64, Error> {
    let target = target.min(config.end_block);
    let mut advanced = 0;

    while state.current_block < target {
        match advance_one_block(state, config)? {
            BlockResult::Advanced(_) => advanced += 1,
            BlockResult::Finished => break,
        }
    }

    Ok(advanced)
}

/// `delta * 2^192 / price`: emission per unit of price, kept in Q96.
fn mps_per_price(delta: Mps, price: Price) -> Result<U256, MathError> {
    let scaled = U256::from(delta.as_u32()) << 192usize;
    scaled
        .checked_div(price.as_u256())
        .ok_or(MathError::DivisionByZero)
}
