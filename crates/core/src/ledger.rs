use std::collections::BTreeMap;

use crate::{
    error::{LedgerError, MathError},
    types::primitives::{BidId, CurrencyAmount, Price},
};

/// Aggregated demand at one initialized price level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub price: Price,
    /// Sum of the effective amounts of every bid at this price.
    pub currency_demand: CurrencyAmount,
    pub bid_ids: Vec<BidId>,
    /// Next higher initialized price, or `Price::TAIL`.
    pub next: Price,
}

impl Tick {
    fn new(price: Price, next: Price) -> Self {
        Self {
            price,
            currency_demand: CurrencyAmount::ZERO,
            bid_ids: Vec::new(),
            next,
        }
    }

    pub fn add_bid(&mut self, id: BidId, effective_amount: CurrencyAmount) -> Result<(), MathError> {
        self.currency_demand = self.currency_demand.checked_add(effective_amount)?;
        self.bid_ids.push(id);
        Ok(())
    }

    pub fn has_demand(&self) -> bool {
        !self.currency_demand.is_zero()
    }
}

/// Ascending chain of ticks rooted at the floor price.
///
/// Ticks are keyed by price so lookups never chase pointers; the `next`
/// links are kept alongside to preserve the chain contract the solver walks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickLedger {
    floor: Price,
    ticks: BTreeMap<Price, Tick>,
}

impl TickLedger {
    pub fn new(floor: Price) -> Self {
        let mut ticks = BTreeMap::new();
        ticks.insert(floor, Tick::new(floor, Price::TAIL));
        Self { floor, ticks }
    }

    pub fn floor(&self) -> Price {
        self.floor
    }

    pub fn get(&self, price: Price) -> Option<&Tick> {
        self.ticks.get(&price)
    }

    pub fn contains(&self, price: Price) -> bool {
        self.ticks.contains_key(&price)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn demand_at(&self, price: Price) -> CurrencyAmount {
        self.ticks
            .get(&price)
            .map_or(CurrencyAmount::ZERO, |tick| tick.currency_demand)
    }

    /// Largest initialized price below `price`, searched from the lowest
    /// active tick when it sits below `price` and from the floor otherwise.
    pub fn prev_tick_price(&self, price: Price, next_active: Price) -> Result<Price, LedgerError> {
        let mut prev = self.floor;
        if next_active < price && next_active >= prev && self.contains(next_active) {
            prev = next_active;
        }

        loop {
            let tick = self
                .ticks
                .get(&prev)
                .ok_or(LedgerError::TickNotInitialized { price: prev })?;

            if tick.next >= price || tick.next == prev {
                break Ok(prev);
            }
            prev = tick.next;
        }
    }

    /// Returns the tick at `price`, splicing a new one into the chain after
    /// `prev` (or a later tick) when none exists yet.
    ///
    /// `next_active` is moved down to `price` when the new tick lands between
    /// the clearing price and the previous lowest active tick.
    pub fn initialize_tick_if_needed(
        &mut self,
        prev: Price,
        price: Price,
        next_active: &mut Price,
    ) -> Result<&mut Tick, LedgerError> {
        if self.ticks.contains_key(&price) {
            return self
                .ticks
                .get_mut(&price)
                .ok_or(LedgerError::TickNotInitialized { price });
        }

        if prev >= price {
            return Err(LedgerError::TickPreviousInvalid { prev, price });
        }
        if !self.ticks.contains_key(&prev) {
            return Err(LedgerError::TickNotInitialized { price: prev });
        }

        let mut cursor = prev;
        let old_next = loop {
            let next = self
                .ticks
                .get(&cursor)
                .ok_or(LedgerError::ChainBroken { price: cursor })?
                .next;
            if next >= price {
                break next;
            }
            if !self.ticks.contains_key(&next) {
                return Err(LedgerError::ChainBroken { price: cursor });
            }
            cursor = next;
        };

        self.ticks.insert(price, Tick::new(price, old_next));
        if let Some(tick) = self.ticks.get_mut(&cursor) {
            tick.next = price;
        }
        if old_next == *next_active {
            *next_active = price;
        }

        self.ticks
            .get_mut(&price)
            .ok_or(LedgerError::TickNotInitialized { price })
    }

    /// Walks the chain from the floor along `next` links.
    pub fn iter(&self) -> Chain<'_> {
        Chain {
            ledger: self,
            cursor: Some(self.floor),
        }
    }

    /// Checks that the chain is strictly ascending, ends at the tail, and
    /// reaches every initialized tick.
    pub fn verify_chain(&self) -> Result<(), LedgerError> {
        let mut visited = 0usize;
        let mut cursor = self.floor;

        loop {
            let tick = self
                .ticks
                .get(&cursor)
                .ok_or(LedgerError::ChainBroken { price: cursor })?;
            visited += 1;

            if tick.next.is_tail() {
                break;
            }
            if tick.next <= cursor || visited > self.ticks.len() {
                return Err(LedgerError::ChainBroken { price: cursor });
            }
            cursor = tick.next;
        }

        if visited == self.ticks.len() {
            Ok(())
        } else {
            Err(LedgerError::ChainBroken { price: cursor })
        }
    }
}

pub struct Chain<'a> {
    ledger: &'a TickLedger,
    cursor: Option<Price>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Tick;

    fn next(&mut self) -> Option<Self::Item> {
        let tick = self.ledger.get(self.cursor?)?;
        self.cursor = (!tick.next.is_tail()).then_some(tick.next);
        Some(tick)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::*;

    fn price(value: u64) -> Price {
        Price::new(U256::from(value))
    }

    fn ledger() -> TickLedger {
        TickLedger::new(price(10))
    }

    #[test]
    fn new_ledger_holds_only_the_floor() {
        let ledger = ledger();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(price(10)).map(|tick| tick.next), Some(Price::TAIL));
        ledger.verify_chain().expect("chain should be intact");
    }

    #[test]
    fn ticks_splice_in_ascending_order() {
        let mut ledger = ledger();
        let mut next_active = Price::TAIL;

        ledger
            .initialize_tick_if_needed(price(10), price(30), &mut next_active)
            .expect("should insert 30");
        assert_eq!(next_active, price(30));

        ledger
            .initialize_tick_if_needed(price(10), price(50), &mut next_active)
            .expect("should insert 50 after walking past 30");
        assert_eq!(next_active, price(30));

        ledger
            .initialize_tick_if_needed(price(10), price(20), &mut next_active)
            .expect("should insert 20");
        assert_eq!(next_active, price(20));

        let prices: Vec<Price> = ledger.iter().map(|tick| tick.price).collect();
        assert_eq!(prices, vec![price(10), price(20), price(30), price(50)]);
        ledger.verify_chain().expect("chain should be intact");
    }

    #[test]
    fn existing_tick_is_returned_unchanged() {
        let mut ledger = ledger();
        let mut next_active = Price::TAIL;

        ledger
            .initialize_tick_if_needed(price(10), price(30), &mut next_active)
            .expect("should insert")
            .add_bid(BidId::FIRST, CurrencyAmount::new(U256::from(7u8)))
            .expect("should add demand");

        let tick = ledger
            .initialize_tick_if_needed(price(50), price(30), &mut next_active)
            .expect("existing tick ignores the hint");

        assert_eq!(tick.currency_demand, CurrencyAmount::new(U256::from(7u8)));
        assert_eq!(tick.bid_ids, vec![BidId::FIRST]);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn bad_hints_are_rejected() {
        let mut ledger = ledger();
        let mut next_active = Price::TAIL;

        assert_eq!(
            ledger
                .initialize_tick_if_needed(price(40), price(30), &mut next_active)
                .map(|_| ()),
            Err(LedgerError::TickPreviousInvalid {
                prev: price(40),
                price: price(30)
            })
        );
        assert_eq!(
            ledger
                .initialize_tick_if_needed(price(15), price(30), &mut next_active)
                .map(|_| ()),
            Err(LedgerError::TickNotInitialized { price: price(15) })
        );
        assert_eq!(next_active, Price::TAIL);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn prev_tick_hint_starts_from_active_tick() {
        let mut ledger = ledger();
        let mut next_active = Price::TAIL;
        for p in [20, 30, 50] {
            ledger
                .initialize_tick_if_needed(price(10), price(p), &mut next_active)
                .expect("should insert");
        }

        assert_eq!(ledger.prev_tick_price(price(40), price(20)), Ok(price(30)));
        assert_eq!(ledger.prev_tick_price(price(15), price(20)), Ok(price(10)));
        assert_eq!(ledger.prev_tick_price(price(60), Price::TAIL), Ok(price(50)));
        assert_eq!(ledger.prev_tick_price(price(30), price(20)), Ok(price(20)));
    }

    #[test]
    fn demand_lookup_defaults_to_zero() {
        let ledger = ledger();

        assert!(ledger.demand_at(price(99)).is_zero());
        assert!(!ledger.get(price(10)).expect("floor").has_demand());
    }
}
