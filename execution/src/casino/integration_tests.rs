//! Integration tests for casino game execution.
//!
//! These tests run whole rounds of every family from start to a terminal
//! phase and check long-run returns against the payout math.

use super::blackjack::{self, BlackjackRound};
use super::bones::{self, BonesRound, BonesSetup};
use super::cases::{CaseSpin, LootTable};
use super::doors::{self, DoorsRound, DoorsRules};
use super::payout::{bones_multiplier, door_multiplier};
use super::upgrade::UpgradeRound;
use super::{GameResult, GameRng, Round};
use arcade_types::casino::{
    CardPhase, Case, CaseItem, Item, LootPhase, Phase, RiskTier, SpinMode, TileKind, TilePhase,
};

const TRIALS: u64 = 20_000;

fn first_unrevealed_safe(hidden: &[TileKind], visible: &[Option<TileKind>]) -> u8 {
    hidden
        .iter()
        .zip(visible)
        .position(|(&kind, seen)| kind == TileKind::Safe && seen.is_none())
        .unwrap() as u8
}

/// Test every family reaches a terminal phase through the dispatch enum.
#[test]
fn test_all_families_terminate() {
    let mut rng = GameRng::new(1, 1, 0);

    let mut tiles = BonesRound::start(10, BonesSetup::new(3).unwrap(), &mut rng);
    let index = first_unrevealed_safe(tiles.answer_key(), tiles.visible());
    tiles.process_move(bones::Move::Reveal(index)).unwrap();
    tiles.process_move(bones::Move::Cashout).unwrap();

    let mut run = DoorsRound::start(10, RiskTier::Low, DoorsRules::default(), &mut rng);
    let index = first_unrevealed_safe(run.answer_key(), run.visible());
    run.process_move(doors::Move::Open(index), &mut rng).unwrap();
    run.process_move(doors::Move::Cashout, &mut rng).unwrap();

    let mut hand = BlackjackRound::start(10, 4, &mut rng);
    while hand.phase() == CardPhase::PlayerTurn {
        hand.process_move(blackjack::Move::Stand).unwrap();
    }
    hand.play_dealer().unwrap();

    let table = LootTable::new(sample_case()).unwrap();
    let spin = CaseSpin::start(&table, 3, SpinMode::Full, false, 0, &mut rng).unwrap();
    let upgrade = UpgradeRound::attempt(50, item(9, 100), &mut rng).unwrap();

    let rounds = [
        Round::Bones(tiles),
        Round::Doors(run),
        Round::Blackjack(hand),
        Round::Cases(spin),
        Round::Upgrade(upgrade),
    ];
    for round in &rounds {
        assert!(round.phase().is_terminal(), "{:?}", round.family());
        assert!(!Phase::initial(round.family()).is_terminal());
    }
    assert_eq!(rounds[0].payout(), Some(11));
    assert_eq!(rounds[1].phase(), Phase::Tile(TilePhase::CashedOut));
    assert!(rounds[2].payout().is_some());
    assert_eq!(rounds[3].phase(), Phase::Loot(LootPhase::Settled));
    assert_eq!(rounds[4].payout(), None);
}

/// Test hidden tiles stay out of the projection until the round ends.
#[test]
fn test_projection_hides_answer_key() {
    let mut rng = GameRng::new(2, 1, 0);
    let mut round = BonesRound::start(10, BonesSetup::new(10).unwrap(), &mut rng);
    let index = first_unrevealed_safe(round.answer_key(), round.visible());
    round.process_move(bones::Move::Reveal(index)).unwrap();

    let revealed = round.visible().iter().filter(|tile| tile.is_some()).count();
    assert_eq!(revealed, 1);

    round.process_move(bones::Move::Cashout).unwrap();
    let disclosed: Vec<TileKind> = round.visible().iter().map(|t| t.unwrap()).collect();
    assert_eq!(disclosed, round.answer_key());
}

/// Test bones returns converge on the table: cash out after one reveal.
#[test]
fn test_bones_single_reveal_return() {
    let traps = 3u8;
    let wager = 1_000u64;
    let mut returned = 0u64;
    for trial in 0..TRIALS {
        let mut rng = GameRng::new(3, trial, 0);
        let mut round = BonesRound::start(wager, BonesSetup::new(traps).unwrap(), &mut rng);
        // Always reveal the first tile; the layout is what is random
        match round.process_move(bones::Move::Reveal(0)).unwrap() {
            GameResult::Continue => {
                if let GameResult::Win(amount) = round.process_move(bones::Move::Cashout).unwrap() {
                    returned += amount;
                }
            }
            GameResult::Loss => {}
            GameResult::Win(amount) => returned += amount,
        }
    }

    let measured = returned as f64 / (wager * TRIALS) as f64;
    let expected = 22.0 / 25.0 * bones_multiplier(traps, 1).unwrap();
    assert!(
        (measured - expected).abs() < 0.02,
        "measured {measured}, expected {expected}"
    );
}

/// Test door returns converge on `(safe / doors) * multiplier`.
#[test]
fn test_doors_single_pick_return() {
    let wager = 1_000u64;
    let mut returned = 0u64;
    for trial in 0..TRIALS {
        let mut rng = GameRng::new(4, trial, 0);
        let mut round = DoorsRound::start(wager, RiskTier::Medium, DoorsRules::default(), &mut rng);
        if round.process_move(doors::Move::Open(0), &mut rng).unwrap() == GameResult::Continue {
            if let GameResult::Win(amount) =
                round.process_move(doors::Move::Cashout, &mut rng).unwrap()
            {
                returned += amount;
            }
        }
    }

    let measured = returned as f64 / (wager * TRIALS) as f64;
    let expected = 0.7 * door_multiplier(RiskTier::Medium, 10, 1);
    assert!((expected - 0.99).abs() < 1e-3);
    assert!(
        (measured - expected).abs() < 0.02,
        "measured {measured}, expected {expected}"
    );
}

/// Test blackjack rounds never pay outside the possible outcomes.
#[test]
fn test_blackjack_payouts_are_bounded() {
    for trial in 0..2_000 {
        let mut rng = GameRng::new(5, trial, 0);
        let mut round = BlackjackRound::start(10, 4, &mut rng);
        while round.phase() == CardPhase::PlayerTurn {
            let mv = if round.can_split() {
                blackjack::Move::Split
            } else if round.can_double() && round.hands()[round.active_hand_index()].value() == 11 {
                blackjack::Move::Double
            } else if round.hands()[round.active_hand_index()].value() < 17 {
                blackjack::Move::Hit
            } else {
                blackjack::Move::Stand
            };
            round.process_move(mv).unwrap();
        }
        let result = round.play_dealer().unwrap();
        let payout = result.payout().unwrap();
        assert!(round.hands().len() <= 4);
        // At most 2.5x every stake on the table
        assert!(payout <= round.total_wagered() * 5 / 2);
        assert_eq!(round.phase(), CardPhase::Finished);
    }
}

/// Test case draws converge on the configured odds.
#[test]
fn test_case_odds_converge() {
    let table = LootTable::new(sample_case()).unwrap();
    let mut rng = GameRng::new(6, 0, 0);
    let mut counts = [0u64; 3];
    for round in 0..TRIALS / 10 {
        let spin =
            CaseSpin::start(&table, 10, SpinMode::Quick, false, round * 10, &mut rng).unwrap();
        for pick in spin.picks() {
            counts[(pick.item.id - 1) as usize] += 1;
        }
    }
    for (index, odds) in [(0, 0.75), (1, 0.20), (2, 0.05)] {
        let observed = counts[index] as f64 / TRIALS as f64;
        assert!((observed - odds).abs() < 0.015, "item {index}: {observed}");
    }
}

fn item(id: u32, price: u64) -> Item {
    Item {
        id,
        name: format!("item-{id}"),
        price,
    }
}

fn sample_case() -> Case {
    Case {
        id: 1,
        name: "sample".to_string(),
        price: 50,
        items: vec![
            CaseItem {
                item: item(1, 10),
                odds: 75.0,
            },
            CaseItem {
                item: item(2, 100),
                odds: 20.0,
            },
            CaseItem {
                item: item(3, 500),
                odds: 5.0,
            },
        ],
    }
}
