use crate::casino::{
    bones::{self, BonesRound, BonesSetup},
    doors::{self, DoorsRound},
    RandomSource, Round,
};
use crate::ledger::Ledger;
use crate::session::{Session, SessionError};
use arcade_types::casino::{Event, GameFamily, RiskTier, TileKind, TilePhase};
use tracing::debug;

impl<'a, L: Ledger, R: RandomSource> Session<'a, L, R> {
    // === Tile Handler Methods ===

    /// Start a bones round. Uses the table's default trap count when none
    /// is given.
    pub async fn bet_bones(
        &mut self,
        wager: u64,
        trap_count: Option<u8>,
    ) -> Result<Vec<Event>, SessionError> {
        self.ensure_alive("bet_bones")?;
        if !self.is_idle(GameFamily::Bones) {
            return Ok(Vec::new());
        }
        let setup = match trap_count {
            Some(traps) => BonesSetup::new(traps)?,
            None => self.config.bones,
        };

        self.debit(wager).await?;

        // The whole grid exists before the first reveal
        let round = BonesRound::start(wager, setup, &mut self.rng);
        Ok(self.begin(Round::Bones(round), wager))
    }

    /// Start a door run at a risk tier.
    pub async fn bet_doors(&mut self, wager: u64, risk: RiskTier) -> Result<Vec<Event>, SessionError> {
        self.ensure_alive("bet_doors")?;
        if !self.is_idle(GameFamily::Doors) {
            return Ok(Vec::new());
        }

        self.debit(wager).await?;

        let round = DoorsRound::start(wager, risk, self.config.doors, &mut self.rng);
        Ok(self.begin(Round::Doors(round), wager))
    }

    /// Reveal a tile (bones) or open a door (doors).
    pub async fn reveal(&mut self, index: u8) -> Result<Vec<Event>, SessionError> {
        self.ensure_alive("reveal")?;
        let before = self.phase();
        let round_index = self.round_index;
        let mut events = Vec::new();

        match &mut self.round {
            Some(Round::Bones(round)) => {
                if let Err(err) = round.process_move(bones::Move::Reveal(index)) {
                    return Ok(self.ignored("reveal", err));
                }
                let kind = round.visible()[index as usize].unwrap_or(TileKind::Safe);
                events.push(Event::TileRevealed {
                    round: round_index,
                    index,
                    kind,
                    depth: round.depth(),
                    current_payout: round.current_payout(),
                });
            }
            Some(Round::Doors(round)) => {
                let depth = round.depth();
                if let Err(err) = round.process_move(doors::Move::Open(index), &mut self.rng) {
                    return Ok(self.ignored("reveal", err));
                }
                // A safe door always moves the run one level deeper
                let kind = if round.depth() > depth {
                    TileKind::Safe
                } else {
                    TileKind::Trap
                };
                events.push(Event::TileRevealed {
                    round: round_index,
                    index,
                    kind,
                    depth: round.depth(),
                    current_payout: round.current_payout(),
                });
                if kind == TileKind::Safe && round.phase() == TilePhase::Active {
                    events.push(Event::LevelAdvanced {
                        round: round_index,
                        depth: round.depth(),
                        doors: round.doors(),
                        trap_count: round.trap_count(),
                    });
                }
            }
            _ => {
                debug!(index, "reveal ignored: no tile round");
                return Ok(Vec::new());
            }
        }

        self.phase_change(before, &mut events);
        self.settle_if_terminal(&mut events).await?;
        Ok(events)
    }

    /// Take the current payout of a tile round.
    pub async fn cashout(&mut self) -> Result<Vec<Event>, SessionError> {
        self.ensure_alive("cashout")?;
        let before = self.phase();

        let result = match &mut self.round {
            Some(Round::Bones(round)) => round.process_move(bones::Move::Cashout),
            Some(Round::Doors(round)) => round.process_move(doors::Move::Cashout, &mut self.rng),
            _ => {
                debug!("cashout ignored: no tile round");
                return Ok(Vec::new());
            }
        };
        if let Err(err) = result {
            return Ok(self.ignored("cashout", err));
        }

        let mut events = Vec::new();
        self.phase_change(before, &mut events);
        self.settle_if_terminal(&mut events).await?;
        Ok(events)
    }
}
