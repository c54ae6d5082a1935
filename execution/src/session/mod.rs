//! Session orchestration.
//!
//! A [Session] wires one game family's state machine to the ledger. It owns
//! the ordering rules around asynchronous balance calls:
//! - the wager is debited before any outcome is generated
//! - the payout is credited once, after the round reaches a terminal phase
//! - nothing is mutated after an await once the owning context is gone
//!
//! Handlers return the [Event]s describing what happened. An action that is
//! not legal in the current phase returns no events and changes nothing.

use crate::casino::{GameError, GameRng, RandomSource, Round};
use crate::config::ValidatedConfig;
use crate::ledger::{InventoryError, Ledger, LedgerError};
use crate::scope::Liveness;
use arcade_types::casino::{Event, GameFamily, Phase, RoundOutcome};
use thiserror::Error;
use tracing::{debug, info, warn};

mod handlers;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("insufficient funds: have {balance}, need {requested}")]
    InsufficientFunds { balance: u64, requested: u64 },
    #[error("ledger error: {0}")]
    Ledger(LedgerError),
    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),
    #[error("unknown case {0}")]
    UnknownCase(u32),
    #[error("invalid round parameters: {0}")]
    InvalidParameters(#[from] GameError),
    #[error("owning context was torn down")]
    Abandoned,
}

impl From<LedgerError> for SessionError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds { balance, requested } => {
                SessionError::InsufficientFunds { balance, requested }
            }
            other => SessionError::Ledger(other),
        }
    }
}

pub struct Session<'a, L, R = GameRng> {
    ledger: &'a L,
    config: &'a ValidatedConfig,
    rng: R,
    liveness: Liveness,
    family: GameFamily,

    round: Option<Round>,
    round_index: u64,
    /// Chips debited for the current round (base bet, doubles and splits).
    wagered: u64,
    settled: bool,
    accumulated_payout: u64,
    next_outcome_id: u64,
}

impl<'a, L: Ledger, R: RandomSource> Session<'a, L, R> {
    pub fn new(
        family: GameFamily,
        ledger: &'a L,
        config: &'a ValidatedConfig,
        rng: R,
        liveness: Liveness,
    ) -> Self {
        Self {
            ledger,
            config,
            rng,
            liveness,
            family,
            round: None,
            round_index: 0,
            wagered: 0,
            settled: false,
            accumulated_payout: 0,
            next_outcome_id: 0,
        }
    }

    pub fn family(&self) -> GameFamily {
        self.family
    }

    pub fn phase(&self) -> Phase {
        match &self.round {
            Some(round) => round.phase(),
            None => Phase::initial(self.family),
        }
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Player-visible projection of the current round.
    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.round.as_ref().map(Round::outcome)
    }

    /// Number of rounds started by this session.
    pub fn round_index(&self) -> u64 {
        self.round_index
    }

    pub fn wagered(&self) -> u64 {
        self.wagered
    }

    /// Chips credited across every settled round.
    pub fn accumulated_payout(&self) -> u64 {
        self.accumulated_payout
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Refuse any action once the owning context is gone.
    fn ensure_alive(&self, action: &'static str) -> Result<(), SessionError> {
        if self.liveness.is_alive() {
            return Ok(());
        }
        warn!(action, round = self.round_index, "action on abandoned session");
        Err(SessionError::Abandoned)
    }

    /// Whether a new round may be placed.
    fn is_idle(&self, family: GameFamily) -> bool {
        if family != self.family {
            debug!(expected = ?self.family, got = ?family, "bet for another family ignored");
            return false;
        }
        if self.round.is_some() {
            debug!(phase = ?self.phase(), "bet ignored: round in progress");
            return false;
        }
        true
    }

    /// Debit a wager, checking the owner is still around afterwards.
    async fn debit(&mut self, amount: u64) -> Result<(), SessionError> {
        if let Err(err) = self.ledger.debit(amount).await {
            warn!(amount, ?err, "debit rejected");
            return Err(err.into());
        }
        if !self.liveness.is_alive() {
            warn!(amount, "session abandoned after debit");
            return Err(SessionError::Abandoned);
        }
        Ok(())
    }

    /// Install a freshly started round and describe the bet.
    fn begin(&mut self, round: Round, wager: u64) -> Vec<Event> {
        let from = self.phase();
        let to = round.phase();
        self.round = Some(round);
        self.round_index += 1;
        self.wagered = wager;
        self.settled = false;
        info!(round = self.round_index, family = ?self.family, wager, "bet placed");

        vec![
            Event::BetPlaced {
                round: self.round_index,
                family: self.family,
                wager,
            },
            Event::PhaseChanged {
                round: self.round_index,
                from,
                to,
            },
        ]
    }

    /// Emit a phase change if `before` differs from the current phase.
    fn phase_change(&self, before: Phase, events: &mut Vec<Event>) {
        let after = self.phase();
        if after != before {
            events.push(Event::PhaseChanged {
                round: self.round_index,
                from: before,
                to: after,
            });
        }
    }

    /// Log a move the state machine refused.
    fn ignored(&self, action: &'static str, err: GameError) -> Vec<Event> {
        debug!(action, phase = ?self.phase(), ?err, "action ignored");
        Vec::new()
    }

    /// Credit the round's payout, exactly once.
    ///
    /// Does nothing before the round is terminal or once it has settled.
    /// A failed credit leaves the round unsettled so it can be retried.
    pub async fn settle(&mut self) -> Result<Vec<Event>, SessionError> {
        self.ensure_alive("settle")?;
        if self.settled {
            debug!(round = self.round_index, "already settled");
            return Ok(Vec::new());
        }
        let Some(round) = &self.round else {
            return Ok(Vec::new());
        };
        if !round.phase().is_terminal() {
            debug!(phase = ?round.phase(), "settle ignored: round not finished");
            return Ok(Vec::new());
        }
        let payout = round.payout().unwrap_or(0);
        let demo = matches!(round, Round::Cases(spin) if spin.is_demo());

        self.settled = true;
        if !demo {
            let result = self.ledger.credit(payout).await;
            if !self.liveness.is_alive() {
                warn!(round = self.round_index, payout, "session abandoned during credit");
                return Err(SessionError::Abandoned);
            }
            if let Err(err) = result {
                warn!(round = self.round_index, payout, ?err, "credit failed");
                self.settled = false;
                return Err(err.into());
            }
        }

        self.accumulated_payout = self.accumulated_payout.saturating_add(payout);
        info!(round = self.round_index, payout, demo, "settled");
        Ok(vec![Event::Settled {
            round: self.round_index,
            payout,
        }])
    }

    /// Settle if the round just became terminal, appending the events.
    async fn settle_if_terminal(&mut self, events: &mut Vec<Event>) -> Result<(), SessionError> {
        if self.phase().is_terminal() {
            events.extend(self.settle().await?);
        }
        Ok(())
    }

    /// Return to the initial phase for another round ("play again").
    ///
    /// Only a settled round of a live session can be cleared.
    pub fn reset(&mut self) -> Vec<Event> {
        if self.round.is_none() || self.ensure_alive("reset").is_err() {
            return Vec::new();
        }
        if !self.settled {
            debug!(phase = ?self.phase(), "reset ignored: round not settled");
            return Vec::new();
        }
        let from = self.phase();
        self.round = None;
        self.wagered = 0;
        self.settled = false;
        vec![Event::PhaseChanged {
            round: self.round_index,
            from,
            to: self.phase(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Entry, Memory};
    use crate::mocks::{FlakyLedger, Teardown, TeardownLedger};
    use crate::config::Config;
    use crate::ledger::Inventory;
    use crate::scope::Scope;
    use arcade_types::casino::{CardPhase, Item, LootPhase, SpinMode, TileKind, TilePhase};

    fn bones_session<'a, L: Ledger>(
        ledger: &'a L,
        config: &'a ValidatedConfig,
        liveness: Liveness,
    ) -> Session<'a, L> {
        Session::new(
            GameFamily::Bones,
            ledger,
            config,
            GameRng::from_seed(17),
            liveness,
        )
    }

    fn answer_key<L: Ledger, R: RandomSource>(session: &Session<'_, L, R>) -> Vec<TileKind> {
        match session.round() {
            Some(Round::Bones(round)) => round.answer_key().to_vec(),
            _ => panic!("no bones round"),
        }
    }

    fn safe_tiles<L: Ledger, R: RandomSource>(session: &Session<'_, L, R>) -> Vec<u8> {
        answer_key(session)
            .iter()
            .enumerate()
            .filter(|(_, &kind)| kind == TileKind::Safe)
            .map(|(i, _)| i as u8)
            .collect()
    }

    fn trap_tile<L: Ledger, R: RandomSource>(session: &Session<'_, L, R>) -> u8 {
        answer_key(session)
            .iter()
            .position(|&kind| kind == TileKind::Trap)
            .unwrap() as u8
    }

    #[tokio::test]
    async fn test_bones_three_safe_then_trap() {
        let ledger = Memory::new(100);
        let config = ValidatedConfig::default();
        let mut session = bones_session(&ledger, &config, Liveness::detached());

        session.bet_bones(10, Some(5)).await.unwrap();
        assert_eq!(ledger.debits(), vec![10]);
        assert_eq!(session.phase(), Phase::Tile(TilePhase::Active));

        for index in safe_tiles(&session).into_iter().take(3) {
            session.reveal(index).await.unwrap();
        }
        assert_eq!(session.phase(), Phase::Tile(TilePhase::Active));
        match session.round() {
            Some(Round::Bones(round)) => {
                assert!((round.current_payout() - 10.0 * 1.95).abs() < 1e-9);
            }
            _ => panic!("no bones round"),
        }

        let trap = trap_tile(&session);
        let events = session.reveal(trap).await.unwrap();
        assert_eq!(session.phase(), Phase::Tile(TilePhase::Busted));
        assert!(events.contains(&Event::Settled {
            round: 1,
            payout: 0
        }));
        assert_eq!(ledger.credits(), vec![0]);

        // Cashout after a bust is a no-op
        assert!(session.cashout().await.unwrap().is_empty());
        assert_eq!(ledger.journal().len(), 2);
        assert_eq!(ledger.balance(), 90);
    }

    #[tokio::test]
    async fn test_cashout_credits_floored_payout() {
        let ledger = Memory::new(100);
        let config = ValidatedConfig::default();
        let mut session = bones_session(&ledger, &config, Liveness::detached());

        session.bet_bones(10, Some(5)).await.unwrap();
        for index in safe_tiles(&session).into_iter().take(3) {
            session.reveal(index).await.unwrap();
        }
        let events = session.cashout().await.unwrap();
        assert!(events.contains(&Event::Settled {
            round: 1,
            payout: 19
        }));
        assert_eq!(session.phase(), Phase::Tile(TilePhase::CashedOut));
        assert_eq!(ledger.balance(), 109);
        assert_eq!(session.accumulated_payout(), 19);
    }

    #[tokio::test]
    async fn test_settle_twice_credits_once() {
        let ledger = Memory::new(100);
        let config = ValidatedConfig::default();
        let mut session = bones_session(&ledger, &config, Liveness::detached());

        session.bet_bones(10, None).await.unwrap();
        let index = safe_tiles(&session)[0];
        session.reveal(index).await.unwrap();
        session.cashout().await.unwrap();

        assert!(session.settle().await.unwrap().is_empty());
        assert!(session.settle().await.unwrap().is_empty());
        assert_eq!(ledger.credits().len(), 1);
    }

    #[tokio::test]
    async fn test_settle_before_terminal_is_noop() {
        let ledger = Memory::new(100);
        let config = ValidatedConfig::default();
        let mut session = bones_session(&ledger, &config, Liveness::detached());

        assert!(session.settle().await.unwrap().is_empty());
        session.bet_bones(10, None).await.unwrap();
        assert!(session.settle().await.unwrap().is_empty());
        assert!(ledger.credits().is_empty());
        assert!(!session.is_settled());
    }

    #[tokio::test]
    async fn test_rejected_debit_leaves_session_untouched() {
        let ledger = Memory::new(5);
        let config = ValidatedConfig::default();
        let mut session = bones_session(&ledger, &config, Liveness::detached());

        let err = session.bet_bones(10, None).await.unwrap_err();
        assert_eq!(
            err,
            SessionError::InsufficientFunds {
                balance: 5,
                requested: 10
            }
        );
        assert_eq!(session.phase(), Phase::Tile(TilePhase::Config));
        assert!(session.round().is_none());
        assert_eq!(session.round_index(), 0);
        assert_eq!(ledger.balance(), 5);
    }

    #[tokio::test]
    async fn test_invalid_parameters_skip_debit() {
        let ledger = Memory::new(100);
        let config = ValidatedConfig::default();
        let mut session = bones_session(&ledger, &config, Liveness::detached());

        assert!(matches!(
            session.bet_bones(10, Some(25)).await,
            Err(SessionError::InvalidParameters(GameError::InvalidParameters))
        ));
        assert!(matches!(
            session.bet_bones(0, None).await,
            Err(SessionError::Ledger(LedgerError::InvalidAmount))
        ));
        assert!(ledger.journal().is_empty());
    }

    #[tokio::test]
    async fn test_teardown_after_debit() {
        let ledger = TeardownLedger::new(100, Teardown::OnDebit);
        let config = ValidatedConfig::default();
        let mut session = bones_session(&ledger, &config, ledger.scope().liveness());

        let err = session.bet_bones(10, None).await.unwrap_err();
        assert_eq!(err, SessionError::Abandoned);
        // Funds were committed, but no round was started
        assert_eq!(ledger.inner.debits(), vec![10]);
        assert!(session.round().is_none());
        assert_eq!(session.round_index(), 0);
    }

    #[tokio::test]
    async fn test_teardown_during_credit() {
        let ledger = TeardownLedger::new(100, Teardown::OnCredit);
        let config = ValidatedConfig::default();
        let mut session = bones_session(&ledger, &config, ledger.scope().liveness());

        session.bet_bones(10, None).await.unwrap();
        let index = safe_tiles(&session)[0];
        session.reveal(index).await.unwrap();
        let err = session.cashout().await.unwrap_err();
        assert_eq!(err, SessionError::Abandoned);

        // The credit landed once and is never repeated
        assert_eq!(ledger.inner.credits().len(), 1);
        assert_eq!(session.accumulated_payout(), 0);
        assert_eq!(session.settle().await.unwrap_err(), SessionError::Abandoned);
        assert_eq!(ledger.inner.credits().len(), 1);
    }

    #[tokio::test]
    async fn test_bet_after_teardown_skips_ledger() {
        let ledger = Memory::new(100);
        let config = ValidatedConfig::default();
        let scope = Scope::new();
        let mut session = bones_session(&ledger, &config, scope.liveness());
        drop(scope);

        let err = session.bet_bones(10, None).await.unwrap_err();
        assert_eq!(err, SessionError::Abandoned);
        assert!(ledger.journal().is_empty());
        assert_eq!(ledger.balance(), 100);
        assert!(session.round().is_none());
        assert_eq!(session.round_index(), 0);
    }

    #[tokio::test]
    async fn test_moves_after_teardown_change_nothing() {
        let ledger = Memory::new(100);
        let config = ValidatedConfig::default();
        let scope = Scope::new();
        let mut session = bones_session(&ledger, &config, scope.liveness());

        session.bet_bones(10, None).await.unwrap();
        let safe = safe_tiles(&session);
        session.reveal(safe[0]).await.unwrap();
        scope.close();
        let before = session.outcome();

        assert_eq!(session.reveal(safe[1]).await.unwrap_err(), SessionError::Abandoned);
        assert_eq!(session.cashout().await.unwrap_err(), SessionError::Abandoned);
        assert_eq!(session.settle().await.unwrap_err(), SessionError::Abandoned);
        assert!(session.reset().is_empty());

        assert_eq!(session.phase(), Phase::Tile(TilePhase::Active));
        assert_eq!(session.outcome(), before);
        assert_eq!(ledger.journal(), vec![Entry::Debit(10)]);
        assert!(!session.is_settled());
    }

    #[tokio::test]
    async fn test_blackjack_after_teardown_changes_nothing() {
        let config = ValidatedConfig::default();
        for seed in 0..50 {
            let ledger = Memory::new(1_000);
            let scope = Scope::new();
            let mut session = Session::new(
                GameFamily::Blackjack,
                &ledger,
                &config,
                GameRng::from_seed(seed),
                scope.liveness(),
            );
            session.bet_blackjack(10).await.unwrap();
            if session.phase() != Phase::Card(CardPhase::PlayerTurn) {
                continue;
            }
            drop(scope);
            let before = session.outcome();

            assert_eq!(session.double().await.unwrap_err(), SessionError::Abandoned);
            assert_eq!(session.split().await.unwrap_err(), SessionError::Abandoned);
            assert_eq!(session.hit().await.unwrap_err(), SessionError::Abandoned);
            assert_eq!(session.stand().await.unwrap_err(), SessionError::Abandoned);
            assert_eq!(session.outcome(), before);
            assert_eq!(session.wagered(), 10);
            assert_eq!(ledger.journal(), vec![Entry::Debit(10)]);
            return;
        }
        panic!("no seed left the player to act");
    }

    const CASES: &str = r#"
cases:
  - id: 1
    name: starter
    price: 100
    items:
      - { id: 10, name: sticker, price: 20, odds: 80 }
      - { id: 11, name: knife, price: 300, odds: 20 }
"#;

    #[tokio::test]
    async fn test_loot_after_teardown_changes_nothing() {
        let config = Config::from_yaml(CASES).unwrap().validate().unwrap();
        let ledger = Memory::new(1_000);

        // A single full spin waits on the animation signal
        let scope = Scope::new();
        let mut session = Session::new(
            GameFamily::Cases,
            &ledger,
            &config,
            GameRng::from_seed(5),
            scope.liveness(),
        );
        session.open_case(1, 1, SpinMode::Full).await.unwrap();
        assert_eq!(session.phase(), Phase::Loot(LootPhase::Spinning));
        scope.close();
        assert_eq!(
            session.animation_complete(0).await.unwrap_err(),
            SessionError::Abandoned
        );
        assert_eq!(session.phase(), Phase::Loot(LootPhase::Spinning));
        assert!(ledger.items().is_empty());
        assert_eq!(ledger.journal(), vec![Entry::Debit(100)]);

        // Offered items stay put
        let owned = ledger
            .add(vec![Item {
                id: 10,
                name: "sticker".to_string(),
                price: 20,
            }])
            .unwrap();
        let scope = Scope::new();
        let mut session = Session::new(
            GameFamily::Upgrade,
            &ledger,
            &config,
            GameRng::from_seed(5),
            scope.liveness(),
        );
        drop(scope);
        let target = Item {
            id: 11,
            name: "knife".to_string(),
            price: 300,
        };
        assert_eq!(
            session.upgrade(&[owned[0].instance_id], target).await.unwrap_err(),
            SessionError::Abandoned
        );
        assert_eq!(ledger.items(), owned);
        assert!(session.round().is_none());
    }

    #[tokio::test]
    async fn test_failed_credit_can_be_retried() {
        let ledger = FlakyLedger::new(100, 1);
        let config = ValidatedConfig::default();
        let mut session = bones_session(&ledger, &config, Liveness::detached());

        session.bet_bones(10, None).await.unwrap();
        let index = safe_tiles(&session)[0];
        session.reveal(index).await.unwrap();
        assert!(matches!(
            session.cashout().await,
            Err(SessionError::Ledger(LedgerError::Unavailable(_)))
        ));
        assert!(!session.is_settled());
        assert!(session.reset().is_empty());

        let events = session.settle().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(ledger.inner.credits().len(), 1);
        assert!(session.is_settled());
    }

    #[tokio::test]
    async fn test_reset_returns_to_config() {
        let ledger = Memory::new(100);
        let config = ValidatedConfig::default();
        let scope = Scope::new();
        let mut session = bones_session(&ledger, &config, scope.liveness());

        // Nothing to reset yet
        assert!(session.reset().is_empty());

        session.bet_bones(10, None).await.unwrap();
        // A live round cannot be reset or re-bet
        assert!(session.reset().is_empty());
        assert!(session.bet_bones(10, None).await.unwrap().is_empty());
        assert_eq!(ledger.debits(), vec![10]);

        let trap = trap_tile(&session);
        session.reveal(trap).await.unwrap();
        let events = session.reset();
        assert_eq!(
            events,
            vec![Event::PhaseChanged {
                round: 1,
                from: Phase::Tile(TilePhase::Busted),
                to: Phase::Tile(TilePhase::Config),
            }]
        );

        session.bet_bones(10, None).await.unwrap();
        assert_eq!(session.round_index(), 2);
        assert_eq!(
            ledger.journal(),
            vec![Entry::Debit(10), Entry::Credit(0), Entry::Debit(10)]
        );
    }

    #[tokio::test]
    async fn test_phase_events_are_monotonic() {
        let ledger = Memory::new(1_000);
        let config = ValidatedConfig::default();
        let mut session = bones_session(&ledger, &config, Liveness::detached());

        let mut events = session.bet_bones(10, None).await.unwrap();
        for index in safe_tiles(&session).into_iter().take(2) {
            events.extend(session.reveal(index).await.unwrap());
        }
        events.extend(session.cashout().await.unwrap());

        let changes: Vec<(Phase, Phase)> = events
            .iter()
            .filter_map(|event| match event {
                Event::PhaseChanged { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|(from, to)| from.can_advance_to(*to)));
    }

    #[tokio::test]
    async fn test_wrong_family_bet_is_ignored() {
        let ledger = Memory::new(100);
        let config = ValidatedConfig::default();
        let mut session = bones_session(&ledger, &config, Liveness::detached());
        assert!(session.bet_blackjack(10).await.unwrap().is_empty());
        assert!(ledger.journal().is_empty());
    }
}
