use tracing::debug;

use crate::{
    error::{Error, LedgerError},
    math::{self, Q96},
    types::{
        config::AuctionConfig,
        primitives::{CurrencyAmount, Price},
        state::SimulationState,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearingOutcome {
    pub clearing_price: Price,
    pub sum_demand_above_clearing: CurrencyAmount,
    pub next_active_tick_price: Price,
    pub ticks_crossed: usize,
}

impl ClearingOutcome {
    fn unchanged(state: &SimulationState) -> Self {
        Self {
            clearing_price: state.clearing_price,
            sum_demand_above_clearing: state.sum_demand_above_clearing,
            next_active_tick_price: state.next_active_tick_price,
            ticks_crossed: 0,
        }
    }
}

/// Finds the price at which the demand above it buys the whole supply.
///
/// Ticks are crossed while their price is already covered by the demand
/// remaining above them. The result never drops below the current clearing
/// price or the highest tick crossed.
pub fn solve(state: &SimulationState, config: &AuctionConfig) -> Result<ClearingOutcome, Error> {
    if state.cumulative_mps.is_sold_out() {
        return Ok(ClearingOutcome::unchanged(state));
    }

    let supply = config.total_supply.as_u256();
    let mut sum = state.sum_demand_above_clearing;
    let mut next = state.next_active_tick_price;
    let mut minimum = state.clearing_price;
    let mut candidate = math::mul_div_up(sum.as_u256(), Q96, supply)?;
    let mut ticks_crossed = 0;

    while !next.is_tail()
        && (math::product_at_least(sum.as_u256(), Q96, supply, next.as_u256())
            || candidate == next.as_u256())
    {
        let tick = state
            .ticks
            .get(next)
            .ok_or(LedgerError::TickNotInitialized { price: next })?;

        sum = sum.checked_sub(tick.currency_demand)?;
        minimum = next;
        next = tick.next;
        candidate = math::mul_div_up(sum.as_u256(), Q96, supply)?;
        ticks_crossed += 1;

        debug!(
            tick = %tick.price,
            demand = %tick.currency_demand.to_decimal(),
            remaining = %sum.to_decimal(),
            "crossed tick"
        );
    }

    let clearing_price = Price::new(candidate).max(minimum);

    Ok(ClearingOutcome {
        clearing_price,
        sum_demand_above_clearing: sum,
        next_active_tick_price: next,
        ticks_crossed,
    })
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{
        config::test_parameters,
        primitives::{BidId, Mps},
    };

    fn config() -> AuctionConfig {
        AuctionConfig::from_parameters(test_parameters()).expect("should be valid")
    }

    fn price(value: u64) -> Price {
        Price::from_decimal(Decimal::from(value)).expect("valid price")
    }

    fn add_demand(state: &mut SimulationState, at: u64, amount: u64) {
        let amount = CurrencyAmount::from_decimal(Decimal::from(amount)).expect("valid amount");
        let floor = state.ticks.floor();
        state
            .ticks
            .initialize_tick_if_needed(floor, price(at), &mut state.next_active_tick_price)
            .expect("should insert")
            .add_bid(BidId::FIRST, amount)
            .expect("should add demand");
        state.sum_demand_above_clearing = state
            .sum_demand_above_clearing
            .checked_add(amount)
            .expect("fits");
    }

    #[test]
    fn thin_demand_leaves_price_at_floor() {
        let config = config();
        let mut state = SimulationState::new(&config);
        add_demand(&mut state, 2, 500);

        let outcome = solve(&state, &config).expect("should solve");

        assert_eq!(outcome.clearing_price, config.floor_price);
        assert_eq!(outcome.next_active_tick_price, price(2));
        assert_eq!(outcome.ticks_crossed, 0);
    }

    #[test]
    fn candidate_between_ticks_is_used() {
        let config = config();
        let mut state = SimulationState::new(&config);
        add_demand(&mut state, 2, 1500);

        let outcome = solve(&state, &config).expect("should solve");

        assert_eq!(outcome.clearing_price.to_decimal(), Decimal::new(15, 1));
        assert_eq!(outcome.next_active_tick_price, price(2));
    }

    #[test]
    fn covered_tick_is_crossed() {
        let config = config();
        let mut state = SimulationState::new(&config);
        add_demand(&mut state, 2, 2500);

        let outcome = solve(&state, &config).expect("should solve");

        assert_eq!(outcome.clearing_price, price(2));
        assert!(outcome.sum_demand_above_clearing.is_zero());
        assert_eq!(outcome.next_active_tick_price, Price::TAIL);
        assert_eq!(outcome.ticks_crossed, 1);
    }

    #[test]
    fn crossing_continues_through_several_ticks() {
        let config = config();
        let mut state = SimulationState::new(&config);
        add_demand(&mut state, 2, 1500);
        add_demand(&mut state, 4, 3000);

        let outcome = solve(&state, &config).expect("should solve");

        assert_eq!(outcome.clearing_price, price(3));
        assert_eq!(outcome.next_active_tick_price, price(4));
        assert_eq!(outcome.ticks_crossed, 1);
        assert_eq!(
            outcome.sum_demand_above_clearing,
            CurrencyAmount::from_decimal(Decimal::from(3000)).expect("valid")
        );
    }

    #[test]
    fn sold_out_auction_keeps_its_price() {
        let config = config();
        let mut state = SimulationState::new(&config);
        add_demand(&mut state, 4, 9000);
        state.cumulative_mps = Mps::FULL;

        let outcome = solve(&state, &config).expect("should solve");

        assert_eq!(outcome.clearing_price, config.floor_price);
        assert_eq!(outcome.ticks_crossed, 0);
    }

    #[test]
    fn price_never_retreats_below_current() {
        let config = config();
        let mut state = SimulationState::new(&config);
        add_demand(&mut state, 5, 100);
        state.clearing_price = Price::new(U256::from(3u8) * Q96);

        let outcome = solve(&state, &config).expect("should solve");

        assert_eq!(outcome.clearing_price, price(3));
    }
}
