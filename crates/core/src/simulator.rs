use tracing::info;

use crate::{
    error::Error,
    orchestrator::{self, BlockResult},
    schedule::{self, StepWindow},
    settlement,
    types::{
        action::SubmitBidInput,
        bid::Bid,
        config::{AuctionConfig, AuctionParameters},
        primitives::{BidId, BlockNumber},
        state::SimulationState,
    },
};

/// An auction configuration together with the single live state it drives.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: AuctionConfig,
    state: SimulationState,
}

impl Simulator {
    pub fn new(config: AuctionConfig) -> Self {
        let state = SimulationState::new(&config);
        Self { config, state }
    }

    pub fn from_parameters(parameters: AuctionParameters) -> Result<Self, Error> {
        Ok(Self::new(AuctionConfig::from_parameters(parameters)?))
    }

    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn submit_bid(&mut self, input: &SubmitBidInput) -> Result<BidId, Error> {
        orchestrator::submit_bid(&mut self.state, &self.config, input)
    }

    pub fn advance_one_block(&mut self) -> Result<BlockResult, Error> {
        orchestrator::advance_one_block(&mut self.state, &self.config)
    }

    pub fn advance_to_block(&mut self, target: BlockNumber) -> Result<u64, Error> {
        orchestrator::advance_to_block(&mut self.state, &self.config, target)
    }

    /// Final view of one bid; the stored bid is not modified.
    pub fn settle_bid(&self, id: BidId) -> Result<Bid, Error> {
        let bid = self.state.bid(id)?;
        settlement::settle_bid(bid, &self.state, &self.config)
    }

    /// Settles every bid and writes the results back. Nothing is written
    /// unless every bid settles.
    pub fn settle_all(&mut self) -> Result<usize, Error> {
        let settled = self
            .state
            .bids
            .values()
            .map(|bid| settlement::settle_bid(bid, &self.state, &self.config))
            .collect::<Result<Vec<_>, _>>()?;

        let count = settled.len();
        for bid in settled {
            self.state.bids.insert(bid.id, bid);
        }

        Ok(count)
    }

    /// Drops all bids and history, returning to the start block.
    pub fn reset(&mut self) {
        info!(start_block = %self.config.start_block, "simulation reset");
        self.state = SimulationState::new(&self.config);
    }

    pub fn current_step(&self) -> Option<StepWindow> {
        schedule::current_step(&self.config, self.state.current_block)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        error::ValidationError,
        types::{bid::BidStatus, config::test_parameters},
    };

    fn simulator(required: i64) -> Simulator {
        let mut parameters = test_parameters();
        parameters.required_currency_raised = Decimal::from(required);
        Simulator::from_parameters(parameters).expect("should be valid")
    }

    fn submit(simulator: &mut Simulator, price: i64, amount: i64, owner: &str) -> BidId {
        simulator
            .submit_bid(&SubmitBidInput::new(
                Decimal::from(price),
                Decimal::from(amount),
                owner,
            ))
            .expect("should accept")
    }

    fn assert_close(actual: Decimal, expected: Decimal) {
        let tolerance = Decimal::new(1, 12);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn settlement_waits_for_the_end() {
        let mut simulator = simulator(0);
        let id = submit(&mut simulator, 2, 100, "alice");

        let error = simulator.settle_bid(id).expect_err("auction still running");

        assert!(matches!(
            error,
            Error::Validation(ref errors) if errors.contains(&ValidationError::AuctionNotOver)
        ));
    }

    #[test]
    fn bid_above_clearing_price_is_fully_filled() {
        let mut simulator = simulator(0);
        let id = submit(&mut simulator, 2, 1500, "alice");
        simulator
            .advance_to_block(BlockNumber::new(10))
            .expect("should advance");

        let bid = simulator.settle_bid(id).expect("should settle");

        assert_eq!(bid.status, BidStatus::FullyFilled);
        assert_close(bid.currency_spent.to_decimal(), Decimal::from(1500));
        assert_close(bid.tokens_filled.to_decimal(), Decimal::from(1000));
        assert_close(bid.refund.to_decimal(), Decimal::ZERO);
        assert_close(simulator.state().cleared().to_decimal(), Decimal::from(1000));
    }

    #[test]
    fn bid_at_clearing_price_is_partially_filled() {
        let mut simulator = simulator(0);
        let id = submit(&mut simulator, 2, 2500, "alice");
        simulator
            .advance_to_block(BlockNumber::new(10))
            .expect("should advance");

        let bid = simulator.settle_bid(id).expect("should settle");

        assert_eq!(bid.status, BidStatus::PartiallyFilled);
        assert_close(bid.currency_spent.to_decimal(), Decimal::from(2000));
        assert_close(bid.tokens_filled.to_decimal(), Decimal::from(1000));
        assert_close(bid.refund.to_decimal(), Decimal::from(500));
    }

    #[test]
    fn bids_sharing_the_clearing_tick_split_pro_rata() {
        let mut simulator = simulator(0);
        let first = submit(&mut simulator, 2, 1500, "alice");
        let second = submit(&mut simulator, 2, 1000, "bob");
        simulator
            .advance_to_block(BlockNumber::new(10))
            .expect("should advance");
        simulator.settle_all().expect("should settle");

        let first = simulator.state().bid(first).expect("first");
        let second = simulator.state().bid(second).expect("second");

        assert_close(first.currency_spent.to_decimal(), Decimal::from(1200));
        assert_close(first.tokens_filled.to_decimal(), Decimal::from(600));
        assert_close(second.currency_spent.to_decimal(), Decimal::from(800));
        assert_close(second.tokens_filled.to_decimal(), Decimal::from(400));
    }

    #[test]
    fn outbid_bid_keeps_what_it_bought_earlier() {
        let mut simulator = simulator(0);
        let early = submit(&mut simulator, 2, 1500, "alice");
        simulator
            .advance_to_block(BlockNumber::new(5))
            .expect("should advance");
        let late = submit(&mut simulator, 4, 1500, "bob");
        simulator
            .advance_to_block(BlockNumber::new(10))
            .expect("should advance");

        let early_bid = simulator.settle_bid(early).expect("should settle");
        let late_bid = simulator.settle_bid(late).expect("should settle");

        assert_eq!(early_bid.status, BidStatus::Outbid);
        assert_eq!(early_bid.outbid_checkpoint_block, Some(BlockNumber::new(6)));
        assert_close(early_bid.currency_spent.to_decimal(), Decimal::from(750));
        assert_close(early_bid.tokens_filled.to_decimal(), Decimal::from(500));
        assert_close(early_bid.refund.to_decimal(), Decimal::from(750));

        assert_eq!(late_bid.status, BidStatus::FullyFilled);
        assert_close(late_bid.currency_spent.to_decimal(), Decimal::from(1500));
        assert_close(late_bid.tokens_filled.to_decimal(), Decimal::from(500));
    }

    #[test]
    fn failed_graduation_refunds_everything() {
        let mut simulator = simulator(5000);
        let id = submit(&mut simulator, 2, 1500, "alice");
        simulator
            .advance_to_block(BlockNumber::new(10))
            .expect("should advance");

        simulator.settle_all().expect("should settle");
        let bid = simulator.state().bid(id).expect("bid");

        assert_eq!(bid.status, BidStatus::Refunded);
        assert!(bid.tokens_filled.is_zero());
        assert_eq!(bid.refund, bid.amount);
    }

    #[test]
    fn reset_returns_to_a_fresh_state() {
        let mut simulator = simulator(0);
        submit(&mut simulator, 2, 100, "alice");
        simulator
            .advance_to_block(BlockNumber::new(4))
            .expect("should advance");

        simulator.reset();

        assert_eq!(simulator.state(), &SimulationState::new(simulator.config()));
        assert_eq!(simulator.current_step().map(|step| step.index), Some(0));
    }
}
