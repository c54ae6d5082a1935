use crate::casino::{
    blackjack::{BlackjackRound, Move},
    GameError, RandomSource, Round,
};
use crate::ledger::Ledger;
use crate::session::{Session, SessionError};
use arcade_types::casino::{CardPhase, Event, GameFamily, Phase, WagerReason};
use tracing::debug;

impl<'a, L: Ledger, R: RandomSource> Session<'a, L, R> {
    // === Blackjack Handler Methods ===

    /// Debit the bet, shuffle and deal. A player natural plays straight
    /// through to settlement.
    pub async fn bet_blackjack(&mut self, wager: u64) -> Result<Vec<Event>, SessionError> {
        self.ensure_alive("bet_blackjack")?;
        if !self.is_idle(GameFamily::Blackjack) {
            return Ok(Vec::new());
        }

        self.debit(wager).await?;

        let round = BlackjackRound::start(wager, self.config.max_hands, &mut self.rng);
        let mut events = self.begin(Round::Blackjack(round), wager);
        self.finish_dealer(&mut events).await?;
        Ok(events)
    }

    pub async fn hit(&mut self) -> Result<Vec<Event>, SessionError> {
        self.play(Move::Hit).await
    }

    pub async fn stand(&mut self) -> Result<Vec<Event>, SessionError> {
        self.play(Move::Stand).await
    }

    /// Double the active hand. The extra bet is debited first; a rejected
    /// debit leaves the hand untouched.
    pub async fn double(&mut self) -> Result<Vec<Event>, SessionError> {
        self.raise(Move::Double, WagerReason::Double).await
    }

    /// Split the active hand. The extra bet is debited first; a rejected
    /// debit leaves the hand untouched.
    pub async fn split(&mut self) -> Result<Vec<Event>, SessionError> {
        self.raise(Move::Split, WagerReason::Split).await
    }

    async fn play(&mut self, mv: Move) -> Result<Vec<Event>, SessionError> {
        self.ensure_alive("blackjack")?;
        let before = self.phase();
        let Some(Round::Blackjack(round)) = &mut self.round else {
            debug!(?mv, "move ignored: no blackjack round");
            return Ok(Vec::new());
        };
        if let Err(err) = round.process_move(mv) {
            return Ok(self.ignored("blackjack", err));
        }

        let mut events = Vec::new();
        self.phase_change(before, &mut events);
        self.finish_dealer(&mut events).await?;
        Ok(events)
    }

    async fn raise(&mut self, mv: Move, reason: WagerReason) -> Result<Vec<Event>, SessionError> {
        self.ensure_alive("blackjack")?;
        let (allowed, amount) = match &self.round {
            Some(Round::Blackjack(round)) => {
                let allowed = match mv {
                    Move::Double => round.can_double(),
                    Move::Split => round.can_split(),
                    Move::Hit | Move::Stand => false,
                };
                (allowed, round.wager())
            }
            _ => (false, 0),
        };
        if !allowed {
            return Ok(self.ignored("blackjack", GameError::InvalidMove));
        }

        self.debit(amount).await?;
        self.wagered = self.wagered.saturating_add(amount);
        let mut events = vec![Event::AdditionalWager {
            round: self.round_index,
            amount,
            reason,
        }];

        let before = self.phase();
        let Some(Round::Blackjack(round)) = &mut self.round else {
            return Err(GameError::InvalidState.into());
        };
        round.process_move(mv)?;

        self.phase_change(before, &mut events);
        self.finish_dealer(&mut events).await?;
        Ok(events)
    }

    /// Once every hand is resolved, run the dealer and settle.
    ///
    /// The dealer is driven to completion here; any presentation pacing of
    /// dealer cards happens after the fact.
    async fn finish_dealer(&mut self, events: &mut Vec<Event>) -> Result<(), SessionError> {
        if let Some(Round::Blackjack(round)) = &mut self.round {
            if round.phase() == CardPhase::DealerTurn {
                while round.dealer_step() {}
                round.settle()?;
                self.phase_change(Phase::Card(CardPhase::DealerTurn), events);
            }
        }
        self.settle_if_terminal(events).await
    }
}
