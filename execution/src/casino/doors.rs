//! Doors: a progressive tile-reveal run.
//!
//! Each level shows a row of doors, some of which hide a trap according to
//! the risk tier. Opening a safe door carries the run to a new level with
//! one door fewer; the multiplier compounds across levels. The run cashes
//! out on its own when it reaches the configured depth, the payout cap or a
//! level that would have no safe door.

use super::payout::{door_multiplier, payout, to_credit, trap_count_for_tier};
use super::selector::shuffle;
use super::{GameError, GameResult, RandomSource};
use arcade_types::casino::{RiskTier, RoundOutcome, TileKind, TilePhase, DOORS_INITIAL};

/// Doors move types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    /// Open the door at an index on the current level.
    Open(u8),
    /// Take the current payout.
    Cashout,
}

/// Table-wide rules for door runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoorsRules {
    initial_doors: u8,
    max_depth: u8,
    payout_cap: Option<u64>,
}

impl DoorsRules {
    pub fn new(initial_doors: u8, max_depth: u8, payout_cap: Option<u64>) -> Result<Self, GameError> {
        if initial_doors < 2 || max_depth == 0 || payout_cap == Some(0) {
            return Err(GameError::InvalidParameters);
        }
        Ok(Self {
            initial_doors,
            max_depth,
            payout_cap,
        })
    }

    pub fn initial_doors(&self) -> u8 {
        self.initial_doors
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    pub fn payout_cap(&self) -> Option<u64> {
        self.payout_cap
    }
}

impl Default for DoorsRules {
    fn default() -> Self {
        Self {
            initial_doors: DOORS_INITIAL,
            max_depth: DOORS_INITIAL - 1,
            payout_cap: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DoorsRound {
    wager: u64,
    risk: RiskTier,
    rules: DoorsRules,
    hidden: Vec<TileKind>,
    visible: Vec<Option<TileKind>>,
    /// Fully disclosed levels the run has already cleared.
    cleared: Vec<Vec<TileKind>>,
    depth: u8,
    current_payout: f64,
    phase: TilePhase,
}

/// Deal one shuffled level.
fn deal_level<R: RandomSource + ?Sized>(risk: RiskTier, doors: u8, rng: &mut R) -> Vec<TileKind> {
    let traps = trap_count_for_tier(risk, doors) as usize;
    let mut level = vec![TileKind::Trap; traps];
    level.resize(doors as usize, TileKind::Safe);
    shuffle(&mut level, rng);
    level
}

impl DoorsRound {
    /// Deal the first level and open the run.
    pub fn start<R: RandomSource + ?Sized>(
        wager: u64,
        risk: RiskTier,
        rules: DoorsRules,
        rng: &mut R,
    ) -> Self {
        let hidden = deal_level(risk, rules.initial_doors, rng);
        Self {
            wager,
            risk,
            rules,
            visible: vec![None; hidden.len()],
            hidden,
            cleared: Vec::new(),
            depth: 0,
            current_payout: payout(wager, 1.0),
            phase: TilePhase::Active,
        }
    }

    pub fn process_move<R: RandomSource + ?Sized>(
        &mut self,
        mv: Move,
        rng: &mut R,
    ) -> Result<GameResult, GameError> {
        match self.phase {
            TilePhase::Active => {}
            TilePhase::Busted | TilePhase::CashedOut => return Err(GameError::GameAlreadyComplete),
            TilePhase::Config => return Err(GameError::InvalidState),
        }

        match mv {
            Move::Open(index) => self.open(index, rng),
            Move::Cashout => {
                if self.depth == 0 {
                    return Err(GameError::InvalidMove);
                }
                Ok(self.cash_out())
            }
        }
    }

    fn open<R: RandomSource + ?Sized>(
        &mut self,
        index: u8,
        rng: &mut R,
    ) -> Result<GameResult, GameError> {
        let slot = index as usize;
        let kind = *self.hidden.get(slot).ok_or(GameError::InvalidMove)?;
        self.visible[slot] = Some(kind);

        if kind == TileKind::Trap {
            self.phase = TilePhase::Busted;
            self.current_payout = 0.0;
            self.visible = self.hidden.iter().copied().map(Some).collect();
            return Ok(GameResult::Loss);
        }

        self.depth += 1;
        let multiplier = door_multiplier(self.risk, self.rules.initial_doors, self.depth);
        self.current_payout = payout(self.wager, multiplier);

        if let Some(cap) = self.rules.payout_cap {
            if self.current_payout >= cap as f64 {
                self.current_payout = cap as f64;
                return Ok(self.cash_out());
            }
        }
        if self.depth >= self.rules.max_depth {
            return Ok(self.cash_out());
        }

        // Next level has one door fewer; stop if it could not be survived
        let doors = self.rules.initial_doors.saturating_sub(self.depth);
        if doors <= trap_count_for_tier(self.risk, doors) {
            return Ok(self.cash_out());
        }

        self.cleared.push(std::mem::take(&mut self.hidden));
        self.hidden = deal_level(self.risk, doors, rng);
        self.visible = vec![None; self.hidden.len()];
        Ok(GameResult::Continue)
    }

    fn cash_out(&mut self) -> GameResult {
        self.phase = TilePhase::CashedOut;
        self.visible = self.hidden.iter().copied().map(Some).collect();
        match to_credit(self.current_payout) {
            0 => GameResult::Loss,
            amount => GameResult::Win(amount),
        }
    }

    pub fn wager(&self) -> u64 {
        self.wager
    }

    pub fn risk(&self) -> RiskTier {
        self.risk
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn phase(&self) -> TilePhase {
        self.phase
    }

    pub fn current_payout(&self) -> f64 {
        self.current_payout
    }

    /// Doors on the current level.
    pub fn doors(&self) -> u8 {
        self.hidden.len() as u8
    }

    /// Traps on the current level.
    pub fn trap_count(&self) -> u8 {
        trap_count_for_tier(self.risk, self.doors())
    }

    pub fn visible(&self) -> &[Option<TileKind>] {
        &self.visible
    }

    /// Levels already cleared, oldest first.
    pub fn cleared_levels(&self) -> &[Vec<TileKind>] {
        &self.cleared
    }

    /// Current level layout, for tests that need to steer picks.
    #[cfg(any(test, feature = "mocks"))]
    pub fn answer_key(&self) -> &[TileKind] {
        &self.hidden
    }

    pub fn payout(&self) -> Option<u64> {
        match self.phase {
            TilePhase::CashedOut => Some(to_credit(self.current_payout)),
            TilePhase::Busted => Some(0),
            TilePhase::Config | TilePhase::Active => None,
        }
    }

    pub fn outcome(&self) -> RoundOutcome {
        // Passed levels stay hidden until the run is over
        let cleared = match self.phase {
            TilePhase::Busted | TilePhase::CashedOut => self.cleared.clone(),
            TilePhase::Config | TilePhase::Active => Vec::new(),
        };
        RoundOutcome::DoorLevel {
            risk: self.risk,
            doors: self.visible.clone(),
            cleared,
            trap_count: self.trap_count(),
            depth: self.depth,
            current_payout: self.current_payout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::casino::GameRng;

    fn safe_index(round: &DoorsRound) -> u8 {
        round
            .answer_key()
            .iter()
            .position(|&k| k == TileKind::Safe)
            .unwrap() as u8
    }

    fn trap_index(round: &DoorsRound) -> u8 {
        round
            .answer_key()
            .iter()
            .position(|&k| k == TileKind::Trap)
            .unwrap() as u8
    }

    fn rules() -> DoorsRules {
        DoorsRules::new(10, 9, None).unwrap()
    }

    #[test]
    fn test_rules_validation() {
        assert!(DoorsRules::new(1, 5, None).is_err());
        assert!(DoorsRules::new(10, 0, None).is_err());
        assert!(DoorsRules::new(10, 5, Some(0)).is_err());
    }

    #[test]
    fn test_first_level_layout() {
        let mut rng = GameRng::from_seed(4);
        let round = DoorsRound::start(10, RiskTier::Medium, rules(), &mut rng);
        assert_eq!(round.doors(), 10);
        assert_eq!(round.trap_count(), 3);
        let traps = round
            .answer_key()
            .iter()
            .filter(|&&k| k == TileKind::Trap)
            .count();
        assert_eq!(traps, 3);
    }

    #[test]
    fn test_safe_pick_advances_level() {
        let mut rng = GameRng::from_seed(4);
        let mut round = DoorsRound::start(100, RiskTier::Medium, rules(), &mut rng);

        let index = safe_index(&round);
        let result = round.process_move(Move::Open(index), &mut rng).unwrap();
        assert_eq!(result, GameResult::Continue);
        assert_eq!(round.depth(), 1);
        assert_eq!(round.doors(), 9);
        assert_eq!(round.cleared_levels().len(), 1);
        assert!(round.visible().iter().all(Option::is_none));
        assert!((round.current_payout() - 100.0 * 10.0 / 7.0 * 0.99).abs() < 1e-9);

        let index = safe_index(&round);
        round.process_move(Move::Open(index), &mut rng).unwrap();
        assert_eq!(round.depth(), 2);
        assert_eq!(round.doors(), 8);

        assert_eq!(
            round.process_move(Move::Cashout, &mut rng).unwrap(),
            GameResult::Win(crate::casino::payout::to_credit(
                100.0 * door_multiplier(RiskTier::Medium, 10, 2)
            ))
        );
        assert_eq!(round.phase(), TilePhase::CashedOut);
    }

    #[test]
    fn test_trap_busts() {
        let mut rng = GameRng::from_seed(8);
        let mut round = DoorsRound::start(100, RiskTier::High, rules(), &mut rng);
        let index = trap_index(&round);
        assert_eq!(
            round.process_move(Move::Open(index), &mut rng).unwrap(),
            GameResult::Loss
        );
        assert_eq!(round.phase(), TilePhase::Busted);
        assert_eq!(round.payout(), Some(0));
        assert_eq!(
            round.process_move(Move::Cashout, &mut rng),
            Err(GameError::GameAlreadyComplete)
        );
    }

    #[test]
    fn test_max_depth_auto_settles() {
        let mut rng = GameRng::from_seed(2);
        let rules = DoorsRules::new(10, 2, None).unwrap();
        let mut round = DoorsRound::start(100, RiskTier::Low, rules, &mut rng);
        let index = safe_index(&round);
        round.process_move(Move::Open(index), &mut rng).unwrap();
        let index = safe_index(&round);
        let result = round.process_move(Move::Open(index), &mut rng).unwrap();
        assert!(matches!(result, GameResult::Win(_)));
        assert_eq!(round.phase(), TilePhase::CashedOut);
    }

    #[test]
    fn test_payout_cap_auto_settles_at_cap() {
        let mut rng = GameRng::from_seed(2);
        let rules = DoorsRules::new(10, 9, Some(150)).unwrap();
        let mut round = DoorsRound::start(100, RiskTier::High, rules, &mut rng);
        // 100 * 2.0 * 0.99 = 198 > 150
        let index = safe_index(&round);
        let result = round.process_move(Move::Open(index), &mut rng).unwrap();
        assert_eq!(result, GameResult::Win(150));
        assert_eq!(round.current_payout(), 150.0);
        assert_eq!(round.payout(), Some(150));
    }

    #[test]
    fn test_run_ends_before_unsurvivable_level() {
        let mut rng = GameRng::from_seed(6);
        let mut round = DoorsRound::start(10, RiskTier::Medium, rules(), &mut rng);
        while round.phase() == TilePhase::Active {
            let index = safe_index(&round);
            round.process_move(Move::Open(index), &mut rng).unwrap();
        }
        assert_eq!(round.phase(), TilePhase::CashedOut);
        assert!(round.depth() <= 9);
        assert!(round.current_payout() > 0.0);
    }

    #[test]
    fn test_outcome_discloses_cleared_levels_at_end() {
        let mut rng = GameRng::from_seed(4);
        let mut round = DoorsRound::start(100, RiskTier::Medium, rules(), &mut rng);
        let first = round.answer_key().to_vec();
        let index = safe_index(&round);
        round.process_move(Move::Open(index), &mut rng).unwrap();

        let RoundOutcome::DoorLevel { cleared, .. } = round.outcome() else {
            panic!("not a door outcome");
        };
        assert!(cleared.is_empty());

        let index = trap_index(&round);
        round.process_move(Move::Open(index), &mut rng).unwrap();
        let RoundOutcome::DoorLevel { cleared, doors, .. } = round.outcome() else {
            panic!("not a door outcome");
        };
        assert_eq!(cleared, vec![first]);
        assert!(doors.iter().all(Option::is_some));
    }

    #[test]
    fn test_out_of_range_pick() {
        let mut rng = GameRng::from_seed(6);
        let mut round = DoorsRound::start(10, RiskTier::Medium, rules(), &mut rng);
        assert_eq!(
            round.process_move(Move::Open(10), &mut rng),
            Err(GameError::InvalidMove)
        );
        assert_eq!(round.depth(), 0);
    }
}
