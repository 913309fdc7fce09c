use std::fmt;

use rust_decimal::Decimal;

use cca_sim_core::{AuctionPhase, Bid, BidStatus, Simulator};

const PRICE_DP: u32 = 6;
const AMOUNT_DP: u32 = 4;

/// Plain-text overview of an auction and its bids.
#[derive(Debug, Clone, PartialEq)]
pub struct AuctionSummary {
    pub current_block: u64,
    pub end_block: u64,
    pub phase: AuctionPhase,
    pub clearing_price: Decimal,
    pub currency_raised: Decimal,
    pub required_currency_raised: Decimal,
    pub total_cleared: Decimal,
    pub total_supply: Decimal,
    pub progress: Decimal,
    pub is_graduated: bool,
    pub bids: Vec<BidLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BidLine {
    pub id: u64,
    pub owner: String,
    pub start_block: u64,
    pub max_price: Decimal,
    pub amount: Decimal,
    pub status: BidStatus,
    pub tokens_filled: Decimal,
    pub currency_spent: Decimal,
    pub refund: Decimal,
}

impl From<&Bid> for BidLine {
    fn from(bid: &Bid) -> Self {
        Self {
            id: bid.id.as_u64(),
            owner: bid.owner.clone(),
            start_block: bid.start_block.as_u64(),
            max_price: bid.max_price.to_decimal(),
            amount: bid.amount.to_decimal(),
            status: bid.status,
            tokens_filled: bid.tokens_filled.to_decimal(),
            currency_spent: bid.currency_spent.to_decimal(),
            refund: bid.refund.to_decimal(),
        }
    }
}

impl AuctionSummary {
    pub fn capture(simulator: &Simulator) -> Self {
        let config = simulator.config();
        let state = simulator.state();
        let parameters = config.parameters();

        Self {
            current_block: state.current_block.as_u64(),
            end_block: config.end_block.as_u64(),
            phase: state.phase(config),
            clearing_price: state.clearing_price.to_decimal(),
            currency_raised: state.raised().to_decimal(),
            required_currency_raised: parameters.required_currency_raised,
            total_cleared: state.cleared().to_decimal(),
            total_supply: parameters.total_supply,
            progress: state.progress(),
            is_graduated: state.is_graduated(),
            bids: state.bids.values().map(BidLine::from).collect(),
        }
    }
}

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp(dp).normalize()
}

impl fmt::Display for AuctionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.phase {
            AuctionPhase::Active { blocks_remaining } => {
                format!("active, {blocks_remaining} blocks left")
            }
            AuctionPhase::Ended => "ended".to_string(),
        };
        let graduation = if self.is_graduated {
            "graduated"
        } else {
            "not graduated"
        };

        writeln!(f, "block          {} / {} ({phase})", self.current_block, self.end_block)?;
        writeln!(f, "clearing price {}", round(self.clearing_price, PRICE_DP))?;
        writeln!(
            f,
            "raised         {} / {} ({graduation})",
            round(self.currency_raised, AMOUNT_DP),
            round(self.required_currency_raised, AMOUNT_DP)
        )?;
        writeln!(
            f,
            "cleared        {} / {} ({}% released)",
            round(self.total_cleared, AMOUNT_DP),
            round(self.total_supply, AMOUNT_DP),
            round(self.progress * Decimal::ONE_HUNDRED, 2)
        )?;

        if self.bids.is_empty() {
            return writeln!(f, "no bids");
        }

        writeln!(f)?;
        writeln!(
            f,
            "{:>4}  {:<12} {:>7} {:>12} {:>12} {:<16} {:>16} {:>12} {:>12}",
            "id", "owner", "block", "max price", "amount", "status", "tokens", "spent", "refund"
        )?;
        for bid in &self.bids {
            writeln!(
                f,
                "{:>4}  {:<12} {:>7} {:>12} {:>12} {:<16} {:>16} {:>12} {:>12}",
                bid.id,
                bid.owner,
                bid.start_block,
                round(bid.max_price, PRICE_DP),
                round(bid.amount, AMOUNT_DP),
                bid.status.as_str(),
                round(bid.tokens_filled, AMOUNT_DP),
                round(bid.currency_spent, AMOUNT_DP),
                round(bid.refund, AMOUNT_DP),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cca_sim_core::{AuctionParameters, AuctionStep, BlockNumber, SubmitBidInput};

    use super::*;

    fn simulator() -> Simulator {
        Simulator::from_parameters(AuctionParameters {
            total_supply: Decimal::from(1000),
            floor_price: Decimal::ONE,
            tick_spacing: Decimal::ONE,
            start_block: 0,
            end_block: 10,
            claim_block: None,
            required_currency_raised: Decimal::from(100),
            steps: vec![AuctionStep::new(1_000_000, 10)],
        })
        .expect("valid parameters")
    }

    #[test]
    fn empty_auction_says_so() {
        let text = AuctionSummary::capture(&simulator()).to_string();

        assert!(text.contains("block          0 / 10 (active, 10 blocks left)"));
        assert!(text.contains("not graduated"));
        assert!(text.ends_with("no bids\n"));
    }

    #[test]
    fn settled_auction_lists_every_bid() {
        let mut simulator = simulator();
        simulator
            .submit_bid(&SubmitBidInput::new(
                Decimal::from(2),
                Decimal::from(1500),
                "alice",
            ))
            .expect("accepted");
        simulator
            .advance_to_block(BlockNumber::new(10))
            .expect("advance");
        simulator.settle_all().expect("settle");

        let summary = AuctionSummary::capture(&simulator);
        let text = summary.to_string();

        assert_eq!(summary.phase, AuctionPhase::Ended);
        assert!(summary.is_graduated);
        assert_eq!(summary.bids.len(), 1);
        assert_eq!(summary.bids[0].status, BidStatus::FullyFilled);
        assert!(text.contains("(ended)"));
        assert!(text.contains("alice"));
        assert!(text.contains("fully_filled"));
        assert!(text.contains("100% released"));
    }
}
