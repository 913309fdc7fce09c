use std::fmt;

use serde::{Deserialize, Serialize};

use super::primitives::{BidId, BlockNumber, CurrencyAmount, Mps, Price, TokenAmount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Active,
    PartiallyFilled,
    FullyFilled,
    Outbid,
    Refunded,
}

impl BidStatus {
    /// Status implied by the bid's position against the clearing price.
    pub fn evaluate(moneyness: Moneyness, is_ended: bool, is_graduated: bool) -> Self {
        if is_ended && !is_graduated {
            return Self::Refunded;
        }

        match moneyness {
            Moneyness::InTheMoney if is_ended => Self::FullyFilled,
            Moneyness::InTheMoney => Self::Active,
            Moneyness::AtTheMoney => Self::PartiallyFilled,
            Moneyness::OutOfTheMoney => Self::Outbid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PartiallyFilled => "partially_filled",
            Self::FullyFilled => "fully_filled",
            Self::Outbid => "outbid",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moneyness {
    InTheMoney,
    AtTheMoney,
    OutOfTheMoney,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bid {
    pub id: BidId,
    pub owner: String,
    pub max_price: Price,
    pub amount: CurrencyAmount,
    pub start_block: BlockNumber,
    pub start_cumulative_mps: Mps,
    /// Nominal amount scaled by the share of supply still unreleased at
    /// submission.
    pub effective_amount: CurrencyAmount,
    pub status: BidStatus,
    pub tokens_filled: TokenAmount,
    pub currency_spent: CurrencyAmount,
    pub refund: CurrencyAmount,
    pub last_fully_filled_checkpoint_block: BlockNumber,
    pub outbid_checkpoint_block: Option<BlockNumber>,
}

impl Bid {
    pub fn moneyness(&self, clearing_price: Price) -> Moneyness {
        if self.max_price > clearing_price {
            Moneyness::InTheMoney
        } else if self.max_price == clearing_price {
            Moneyness::AtTheMoney
        } else {
            Moneyness::OutOfTheMoney
        }
    }

    /// Applies one checkpoint's clearing price to the bid's status and hints.
    pub fn record_checkpoint(
        &mut self,
        block: BlockNumber,
        clearing_price: Price,
        is_ended: bool,
        is_graduated: bool,
    ) {
        let moneyness = self.moneyness(clearing_price);
        match moneyness {
            Moneyness::InTheMoney => self.last_fully_filled_checkpoint_block = block,
            Moneyness::OutOfTheMoney if self.outbid_checkpoint_block.is_none() => {
                self.outbid_checkpoint_block = Some(block);
            }
            Moneyness::AtTheMoney | Moneyness::OutOfTheMoney => {}
        }
        self.status = BidStatus::evaluate(moneyness, is_ended, is_graduated);
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::*;

    fn bid_at(price: u64) -> Bid {
        Bid {
            id: BidId::FIRST,
            owner: "alice".to_string(),
            max_price: Price::new(U256::from(price)),
            amount: CurrencyAmount::new(U256::from(100u64)),
            start_block: BlockNumber::new(0),
            start_cumulative_mps: Mps::ZERO,
            effective_amount: CurrencyAmount::new(U256::from(100u64)),
            status: BidStatus::Active,
            tokens_filled: TokenAmount::ZERO,
            currency_spent: CurrencyAmount::ZERO,
            refund: CurrencyAmount::ZERO,
            last_fully_filled_checkpoint_block: BlockNumber::new(0),
            outbid_checkpoint_block: None,
        }
    }

    #[test]
    fn running_auction_statuses() {
        let price = |p: u64| Price::new(U256::from(p));
        let mut bid = bid_at(10);

        bid.record_checkpoint(BlockNumber::new(1), price(5), false, false);
        assert_eq!(bid.status, BidStatus::Active);
        assert_eq!(bid.last_fully_filled_checkpoint_block, BlockNumber::new(1));

        bid.record_checkpoint(BlockNumber::new(2), price(10), false, true);
        assert_eq!(bid.status, BidStatus::PartiallyFilled);
        assert_eq!(bid.last_fully_filled_checkpoint_block, BlockNumber::new(1));

        bid.record_checkpoint(BlockNumber::new(3), price(11), false, true);
        bid.record_checkpoint(BlockNumber::new(4), price(12), false, true);
        assert_eq!(bid.status, BidStatus::Outbid);
        assert_eq!(bid.outbid_checkpoint_block, Some(BlockNumber::new(3)));
    }

    #[test]
    fn ended_auction_statuses() {
        assert_eq!(
            BidStatus::evaluate(Moneyness::InTheMoney, true, true),
            BidStatus::FullyFilled
        );
        assert_eq!(
            BidStatus::evaluate(Moneyness::AtTheMoney, true, true),
            BidStatus::PartiallyFilled
        );
        assert_eq!(
            BidStatus::evaluate(Moneyness::OutOfTheMoney, true, true),
            BidStatus::Outbid
        );
        for moneyness in [
            Moneyness::InTheMoney,
            Moneyness::AtTheMoney,
            Moneyness::OutOfTheMoney,
        ] {
            assert_eq!(
                BidStatus::evaluate(moneyness, true, false),
                BidStatus::Refunded
            );
        }
    }

    #[test]
    fn status_renders_in_snake_case() {
        assert_eq!(BidStatus::PartiallyFilled.to_string(), "partially_filled");
        assert_eq!(BidStatus::FullyFilled.as_str(), "fully_filled");
    }
}
