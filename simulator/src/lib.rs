//! Return-to-player simulation.
//!
//! Every trial is a full [Session] against the in-memory ledger, so the
//! numbers measured here include the session's ordering and settlement
//! rules, not only the payout math.

use arcade_execution::{
    casino::{GameRng, Round},
    Inventory, Liveness, Memory, Session, SessionError, ValidatedConfig,
};
use arcade_types::casino::{
    CardPhase, GameFamily, Item, Phase, RiskTier, SpinMode, TilePhase, BLACKJACK_VALUE,
    DEALER_STAND_VALUE,
};
use futures::executor::block_on;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Starting balance of every simulated ledger.
const BANKROLL: u64 = u64::MAX / 4;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("no case configured")]
    NoCases,
    #[error("unknown case {0}")]
    UnknownCase(u32),
    #[error("{family:?} round ended without settling")]
    Unsettled { family: GameFamily },
}

/// Fixed strategy knobs shared by every family.
#[derive(Clone, Debug)]
pub struct Plan {
    pub trials: u64,
    pub seed: u64,
    pub wager: u64,
    /// Safe reveals before cashing out a tile round (at least one).
    pub depth: u8,
    /// Traps on the bones grid. Table default when unset.
    pub traps: Option<u8>,
    pub risk: RiskTier,
    /// Case to open. Lowest configured id when unset.
    pub case_id: Option<u32>,
    /// Cases opened per spin.
    pub spins: u8,
    /// Offered value over target price for upgrades, in percent.
    pub upgrade_ratio: u8,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            trials: 10_000,
            seed: 0,
            wager: 100,
            depth: 2,
            traps: None,
            risk: RiskTier::Medium,
            case_id: None,
            spins: 1,
            upgrade_ratio: 50,
        }
    }
}

/// Totals for one family.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Stats {
    pub rounds: u64,
    /// Chips (or item value) put in.
    pub wagered: u64,
    /// Chips (or item value) paid back.
    pub returned: u64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
    pub biggest_return: u64,
}

impl Stats {
    fn record(&mut self, wagered: u64, returned: u64) {
        self.rounds += 1;
        self.wagered += wagered;
        self.returned += returned;
        self.biggest_return = self.biggest_return.max(returned);
        match returned.cmp(&wagered) {
            std::cmp::Ordering::Greater => self.wins += 1,
            std::cmp::Ordering::Less => self.losses += 1,
            std::cmp::Ordering::Equal => self.pushes += 1,
        }
    }

    pub fn merge(&mut self, other: &Stats) {
        self.rounds += other.rounds;
        self.wagered += other.wagered;
        self.returned += other.returned;
        self.wins += other.wins;
        self.losses += other.losses;
        self.pushes += other.pushes;
        self.biggest_return = self.biggest_return.max(other.biggest_return);
    }

    /// Measured return-to-player.
    pub fn rtp(&self) -> f64 {
        if self.wagered == 0 {
            return 0.0;
        }
        self.returned as f64 / self.wagered as f64
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub family: GameFamily,
    pub rtp: f64,
    #[serde(flatten)]
    pub stats: Stats,
}

impl Report {
    fn new(family: GameFamily, stats: Stats) -> Self {
        Self {
            family,
            rtp: stats.rtp(),
            stats,
        }
    }
}

/// Play `plan.trials` rounds of `family`.
pub fn simulate(
    config: &ValidatedConfig,
    family: GameFamily,
    plan: &Plan,
) -> Result<Report, SimulationError> {
    let stats = run_range(config, family, plan, 0..plan.trials)?;
    info!(?family, rounds = stats.rounds, rtp = stats.rtp(), "simulation finished");
    Ok(Report::new(family, stats))
}

/// Same as [simulate], with trials split across the rayon pool.
///
/// Each trial seeds its own generator, so the result matches [simulate].
#[cfg(feature = "parallel")]
pub fn simulate_parallel(
    config: &ValidatedConfig,
    family: GameFamily,
    plan: &Plan,
) -> Result<Report, SimulationError> {
    use rayon::prelude::*;

    const CHUNK: u64 = 1_024;
    let chunks = plan.trials.div_ceil(CHUNK);
    let parts = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * CHUNK;
            let end = (start + CHUNK).min(plan.trials);
            run_range(config, family, plan, start..end)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut stats = Stats::default();
    for part in &parts {
        stats.merge(part);
    }
    info!(?family, rounds = stats.rounds, rtp = stats.rtp(), "simulation finished");
    Ok(Report::new(family, stats))
}

fn run_range(
    config: &ValidatedConfig,
    family: GameFamily,
    plan: &Plan,
    trials: std::ops::Range<u64>,
) -> Result<Stats, SimulationError> {
    let case_id = match family {
        GameFamily::Cases => Some(pick_case(config, plan.case_id)?),
        _ => None,
    };
    let ledger = Memory::new(BANKROLL);
    let mut stats = Stats::default();
    for trial in trials {
        let rng = GameRng::new(plan.seed, trial, 0);
        let mut session = Session::new(family, &ledger, config, rng, Liveness::detached());
        let (wagered, returned) = block_on(async {
            match family {
                GameFamily::Bones => play_bones(&mut session, plan).await,
                GameFamily::Doors => play_doors(&mut session, plan).await,
                GameFamily::Blackjack => play_blackjack(&mut session, plan).await,
                GameFamily::Cases => {
                    play_cases(&mut session, &ledger, plan, case_id.unwrap_or_default()).await
                }
                GameFamily::Upgrade => play_upgrade(&mut session, &ledger, plan).await,
            }
        })?;
        if !session.is_settled() {
            return Err(SimulationError::Unsettled { family });
        }
        debug!(trial, wagered, returned, "trial finished");
        stats.record(wagered, returned);
    }
    Ok(stats)
}

fn pick_case(config: &ValidatedConfig, requested: Option<u32>) -> Result<u32, SimulationError> {
    match requested {
        Some(id) if config.case(id).is_some() => Ok(id),
        Some(id) => Err(SimulationError::UnknownCase(id)),
        None => config
            .cases
            .keys()
            .next()
            .copied()
            .ok_or(SimulationError::NoCases),
    }
}

type Trial<'a> = Session<'a, Memory>;

/// Reveal tiles left to right until `depth` safe tiles are up, then cash out.
async fn play_bones(session: &mut Trial<'_>, plan: &Plan) -> Result<(u64, u64), SessionError> {
    session.bet_bones(plan.wager, plan.traps).await?;
    let mut index = 0u8;
    while session.phase() == Phase::Tile(TilePhase::Active) {
        let depth = match session.round() {
            Some(Round::Bones(round)) => round.depth(),
            _ => break,
        };
        if depth >= plan.depth.max(1) {
            session.cashout().await?;
        } else {
            session.reveal(index).await?;
            index += 1;
        }
    }
    Ok((session.wagered(), session.accumulated_payout()))
}

/// Open the first door of every level until `depth` levels are cleared.
async fn play_doors(session: &mut Trial<'_>, plan: &Plan) -> Result<(u64, u64), SessionError> {
    session.bet_doors(plan.wager, plan.risk).await?;
    while session.phase() == Phase::Tile(TilePhase::Active) {
        let depth = match session.round() {
            Some(Round::Doors(round)) => round.depth(),
            _ => break,
        };
        if depth >= plan.depth.max(1) {
            session.cashout().await?;
        } else {
            session.reveal(0).await?;
        }
    }
    Ok((session.wagered(), session.accumulated_payout()))
}

/// Split aces and eights, double on 11, hit below 17.
async fn play_blackjack(
    session: &mut Trial<'_>,
    plan: &Plan,
) -> Result<(u64, u64), SessionError> {
    session.bet_blackjack(plan.wager).await?;
    while session.phase() == Phase::Card(CardPhase::PlayerTurn) {
        let Some(Round::Blackjack(round)) = session.round() else {
            break;
        };
        let hand = &round.hands()[round.active_hand_index()];
        let value = hand.value();
        let aces_or_eights = hand
            .cards
            .first()
            .is_some_and(|card| card.is_ace() || card.value() == 8);

        if aces_or_eights && round.can_split() {
            session.split().await?;
        } else if value == BLACKJACK_VALUE - 10 && round.can_double() {
            session.double().await?;
        } else if value < DEALER_STAND_VALUE {
            session.hit().await?;
        } else {
            session.stand().await?;
        }
    }
    Ok((session.wagered(), session.accumulated_payout()))
}

/// Open `spins` cases in quick mode; the return is the value of the items.
async fn play_cases(
    session: &mut Trial<'_>,
    ledger: &Memory,
    plan: &Plan,
    case_id: u32,
) -> Result<(u64, u64), SessionError> {
    session.open_case(case_id, plan.spins, SpinMode::Quick).await?;
    let returned = match session.round() {
        Some(Round::Cases(spin)) => spin.value(),
        _ => 0,
    };
    // Keep the inventory from growing across trials
    let owned: Vec<_> = ledger.items().iter().map(|owned| owned.instance_id).collect();
    if !owned.is_empty() {
        ledger.remove(&owned)?;
    }
    Ok((session.wagered(), returned))
}

/// Offer a single item worth `upgrade_ratio` percent of a fixed target.
async fn play_upgrade(
    session: &mut Trial<'_>,
    ledger: &Memory,
    plan: &Plan,
) -> Result<(u64, u64), SessionError> {
    let target = Item {
        id: 2,
        name: "target".to_string(),
        price: plan.wager.max(1),
    };
    let offered = Item {
        id: 1,
        name: "offered".to_string(),
        price: (target.price * plan.upgrade_ratio as u64 / 100).max(1),
    };
    let granted = ledger.add(vec![offered])?;
    let ids: Vec<_> = granted.iter().map(|owned| owned.instance_id).collect();
    session.upgrade(&ids, target.clone()).await?;

    let success = ledger.items().iter().any(|owned| owned.item.id == target.id);
    let owned: Vec<_> = ledger.items().iter().map(|owned| owned.instance_id).collect();
    if !owned.is_empty() {
        ledger.remove(&owned)?;
    }
    Ok((session.wagered(), if success { target.price } else { 0 }))
}
