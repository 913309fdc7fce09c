use alloy::primitives::U256;
use cca_sim_core::{
    AuctionParameters, AuctionStep, BidStatus, BlockNumber, Orchestrator, ScheduledBid, Simulator,
    SubmitBidInput, presets,
};
use rust_decimal::Decimal;

fn small_parameters(required: i64) -> AuctionParameters {
    AuctionParameters {
        total_supply: Decimal::from(1000),
        floor_price: Decimal::ONE,
        tick_spacing: Decimal::ONE,
        start_block: 0,
        end_block: 10,
        claim_block: None,
        required_currency_raised: Decimal::from(required),
        steps: vec![AuctionStep::new(1_000_000, 10)],
    }
}

fn large_parameters(required: i64) -> AuctionParameters {
    AuctionParameters {
        total_supply: Decimal::from(1_000_000),
        floor_price: Decimal::new(1, 3),
        tick_spacing: Decimal::new(1, 4),
        start_block: 0,
        end_block: 10_000,
        claim_block: Some(10_100),
        required_currency_raised: Decimal::from(required),
        steps: vec![AuctionStep::new(1000, 10_000)],
    }
}

fn input(price: i64, amount: i64, owner: &str) -> SubmitBidInput {
    SubmitBidInput::new(Decimal::from(price), Decimal::from(amount), owner)
}

fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} +/- {tolerance}, got {actual}"
    );
}

fn run(parameters: AuctionParameters, bids: &[ScheduledBid]) -> Simulator {
    let simulator = Simulator::from_parameters(parameters).expect("valid parameters");
    let mut orchestrator = Orchestrator::new(simulator);
    orchestrator.run(bids, None).expect("scenario should run");
    orchestrator.into_simulator()
}

#[test]
fn single_bid_over_a_long_auction_graduates() {
    let bids = [ScheduledBid::new(
        100,
        Decimal::new(2, 3),
        Decimal::from(20),
        "alice",
    )];

    let simulator = run(large_parameters(10), &bids);
    let state = simulator.state();

    assert!(state.is_ended);
    assert!(state.is_graduated());
    assert_eq!(state.clearing_price.to_decimal(), Decimal::new(1, 3));

    let bid = state.bids.values().next().expect("one bid");
    assert_eq!(bid.status, BidStatus::FullyFilled);
    assert_close(
        bid.currency_spent.to_decimal(),
        Decimal::from(20),
        Decimal::new(1, 6),
    );
    assert_close(
        bid.tokens_filled.to_decimal(),
        Decimal::from(20_000),
        Decimal::new(1, 3),
    );
}

#[test]
fn raise_below_threshold_refunds_the_bid() {
    let bids = [ScheduledBid::new(
        100,
        Decimal::new(2, 3),
        Decimal::from(20),
        "alice",
    )];

    let simulator = run(large_parameters(100), &bids);
    let bid = simulator.state().bids.values().next().expect("one bid");

    assert!(!simulator.state().is_graduated());
    assert_eq!(bid.status, BidStatus::Refunded);
    assert_eq!(bid.refund, bid.amount);
}

#[test]
fn clearing_price_never_decreases() {
    let scenario = presets::preset("hot_auction").expect("preset exists");
    let simulator = run(scenario.parameters, &scenario.bids);

    let prices: Vec<_> = simulator
        .state()
        .checkpoints
        .values()
        .map(|checkpoint| checkpoint.clearing_price)
        .collect();

    assert!(prices.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn cleared_tokens_never_exceed_supply() {
    let mut simulator = Simulator::from_parameters(small_parameters(0)).expect("valid");
    simulator.submit_bid(&input(3, 5000, "alice")).expect("accepted");
    simulator.submit_bid(&input(5, 4000, "bob")).expect("accepted");
    simulator.advance_to_block(BlockNumber::new(10)).expect("advance");

    let supply = simulator.config().total_supply.as_u256();
    for checkpoint in simulator.state().checkpoints.values() {
        assert!(checkpoint.total_cleared.scale_down() <= supply);
    }
    assert_close(
        simulator.state().cleared().to_decimal(),
        Decimal::from(1000),
        Decimal::new(1, 9),
    );
}

#[test]
fn spent_and_refund_add_up_to_the_amount() {
    let scenario = presets::preset("graduation_edge").expect("preset exists");
    let simulator = run(scenario.parameters, &scenario.bids);

    assert_eq!(simulator.state().bids.len(), scenario.bids.len());
    for bid in simulator.state().bids.values() {
        assert_eq!(
            bid.currency_spent.checked_add(bid.refund).expect("no overflow"),
            bid.amount,
            "bid {}",
            bid.id
        );
    }
}

#[test]
fn stepping_and_jumping_reach_the_same_state() {
    let mut stepped = Simulator::from_parameters(small_parameters(0)).expect("valid");
    let mut jumped = stepped.clone();
    for simulator in [&mut stepped, &mut jumped] {
        simulator.submit_bid(&input(2, 1500, "alice")).expect("accepted");
        simulator.submit_bid(&input(4, 700, "bob")).expect("accepted");
    }

    for _ in 0..7 {
        stepped.advance_one_block().expect("advance");
    }
    let advanced = jumped.advance_to_block(BlockNumber::new(7)).expect("advance");

    assert_eq!(advanced, 7);
    assert_eq!(stepped.state(), jumped.state());

    let before = jumped.state().clone();
    let again = jumped.advance_to_block(BlockNumber::new(7)).expect("advance");
    assert_eq!(again, 0);
    assert_eq!(jumped.state(), &before);
}

#[test]
fn tick_chain_stays_ordered() {
    let scenario = presets::preset("hot_auction").expect("preset exists");
    let simulator = run(scenario.parameters, &scenario.bids);
    let ticks = &simulator.state().ticks;

    ticks.verify_chain().expect("chain should be intact");
    let prices: Vec<_> = ticks.iter().map(|tick| tick.price).collect();
    assert_eq!(prices.len(), ticks.len());
    assert!(prices.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn later_bids_carry_more_weight() {
    let mut simulator = Simulator::from_parameters(large_parameters(0)).expect("valid");
    let input = SubmitBidInput::new(Decimal::new(3, 3), Decimal::TEN, "alice");

    simulator.advance_to_block(BlockNumber::new(100)).expect("advance");
    let early = simulator.submit_bid(&input).expect("accepted");
    simulator.advance_to_block(BlockNumber::new(9000)).expect("advance");
    let late = simulator.submit_bid(&input).expect("accepted");

    let state = simulator.state();
    let early = state.bid(early).expect("early");
    let late = state.bid(late).expect("late");

    assert_eq!(early.amount, late.amount);
    assert!(late.effective_amount > early.effective_amount);
    assert_close(
        late.effective_amount.to_decimal(),
        Decimal::from(100),
        Decimal::new(1, 9),
    );
}

#[test]
fn every_preset_runs_to_completion() {
    for scenario in presets::presets() {
        let simulator = run(scenario.parameters.clone(), &scenario.bids);
        let state = simulator.state();

        assert!(state.is_ended, "preset {}", scenario.key);
        assert!(
            state.cumulative_mps.as_u32() <= cca_sim_core::MPS_TOTAL,
            "preset {}",
            scenario.key
        );
        assert!(
            state.total_cleared.scale_down() <= simulator.config().total_supply.as_u256(),
            "preset {}",
            scenario.key
        );
        assert!(
            state
                .bids
                .values()
                .all(|bid| bid.status != BidStatus::Active),
            "preset {}",
            scenario.key
        );
    }
}

#[test]
fn raise_matches_sum_of_spent_currency() {
    let bids = [
        ScheduledBid::new(0, Decimal::from(2), Decimal::from(1500), "alice"),
        ScheduledBid::new(0, Decimal::from(2), Decimal::from(1000), "bob"),
        ScheduledBid::new(3, Decimal::from(4), Decimal::from(300), "carol"),
    ];
    let simulator = run(small_parameters(0), &bids);
    let state = simulator.state();

    assert_eq!(state.clearing_price.to_decimal(), Decimal::from(2));
    assert!(
        state
            .checkpoints
            .values()
            .any(|checkpoint| !checkpoint.currency_raised_at_clearing_price.is_zero())
    );
    let statuses: Vec<_> = state.bids.values().map(|bid| bid.status).collect();
    assert_eq!(
        statuses,
        vec![
            BidStatus::PartiallyFilled,
            BidStatus::PartiallyFilled,
            BidStatus::FullyFilled
        ]
    );

    let spent: U256 = state
        .bids
        .values()
        .map(|bid| bid.currency_spent.as_u256())
        .fold(U256::ZERO, |total, spent| total + spent);
    let raised = state.raised().to_decimal();
    let spent = cca_sim_core::CurrencyAmount::new(spent).to_decimal();

    assert!(state.is_graduated());
    assert_close(raised, Decimal::from(2000), Decimal::new(1, 6));
    assert_close(spent, raised, Decimal::new(1, 6));
}
