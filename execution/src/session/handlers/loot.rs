use crate::casino::{cases::CaseSpin, upgrade::UpgradeRound, GameError, RandomSource, Round};
use crate::ledger::{Inventory, InventoryError, Ledger};
use crate::session::{Session, SessionError};
use arcade_types::casino::{
    Event, GameFamily, InstanceId, Item, LootPhase, SpinMode, MAX_BATCH_SPIN,
};
use tracing::debug;

impl<'a, L: Ledger + Inventory, R: RandomSource> Session<'a, L, R> {
    // === Loot Handler Methods ===

    /// Pay for and open `count` cases.
    pub async fn open_case(
        &mut self,
        case_id: u32,
        count: u8,
        mode: SpinMode,
    ) -> Result<Vec<Event>, SessionError> {
        self.spin(case_id, count, mode, false).await
    }

    /// Open cases for free. Same draws, no ledger or inventory calls.
    pub async fn demo_spin(
        &mut self,
        case_id: u32,
        count: u8,
        mode: SpinMode,
    ) -> Result<Vec<Event>, SessionError> {
        self.spin(case_id, count, mode, true).await
    }

    async fn spin(
        &mut self,
        case_id: u32,
        count: u8,
        mode: SpinMode,
        demo: bool,
    ) -> Result<Vec<Event>, SessionError> {
        self.ensure_alive("spin")?;
        if !self.is_idle(GameFamily::Cases) {
            return Ok(Vec::new());
        }
        let config = self.config;
        let table = config
            .case(case_id)
            .ok_or(SessionError::UnknownCase(case_id))?;
        if count == 0 || count > MAX_BATCH_SPIN {
            return Err(GameError::InvalidParameters.into());
        }

        let cost = table.spin_cost(count);
        if !demo {
            self.debit(cost).await?;
        }

        // Outcomes are fixed here; any animation only shows them
        let first_outcome_id = self.next_outcome_id;
        let spin = CaseSpin::start(table, count, mode, demo, first_outcome_id, &mut self.rng)?;
        self.next_outcome_id += count as u64;

        let picks = spin.picks().to_vec();
        let deferred = spin.phase() == LootPhase::Spinning;
        let mut events = self.begin(Round::Cases(spin), if demo { 0 } else { cost });
        events.push(Event::SpinStarted {
            round: self.round_index,
            picks,
            demo,
            deferred,
        });

        self.finish_spin(&mut events).await?;
        Ok(events)
    }

    /// Presentation signal: the animation for `outcome_id` has finished.
    pub async fn animation_complete(&mut self, outcome_id: u64) -> Result<Vec<Event>, SessionError> {
        self.ensure_alive("animation_complete")?;
        let before = self.phase();
        let Some(Round::Cases(spin)) = &mut self.round else {
            debug!(outcome_id, "animation signal ignored: no spin");
            return Ok(Vec::new());
        };
        match spin.animation_complete(outcome_id) {
            Ok(true) => {}
            Ok(false) => return Ok(Vec::new()),
            Err(err) => return Ok(self.ignored("animation_complete", err)),
        }

        let mut events = Vec::new();
        self.phase_change(before, &mut events);
        self.finish_spin(&mut events).await?;
        Ok(events)
    }

    /// Grant a settled spin's items, then settle.
    async fn finish_spin(&mut self, events: &mut Vec<Event>) -> Result<(), SessionError> {
        let Some(Round::Cases(spin)) = &self.round else {
            return Ok(());
        };
        if spin.phase() != LootPhase::Settled || self.settled {
            return Ok(());
        }
        if !spin.is_demo() {
            let items = self.ledger.add(spin.items())?;
            events.push(Event::ItemsGranted {
                round: self.round_index,
                items,
            });
        }
        self.settle_if_terminal(events).await
    }

    /// Trade owned items for a chance at `target`.
    ///
    /// The offered items are removed before the roll and are gone whatever
    /// the result.
    pub async fn upgrade(
        &mut self,
        instance_ids: &[InstanceId],
        target: Item,
    ) -> Result<Vec<Event>, SessionError> {
        self.ensure_alive("upgrade")?;
        if !self.is_idle(GameFamily::Upgrade) {
            return Ok(Vec::new());
        }
        if instance_ids.is_empty() {
            return Err(InventoryError::Empty.into());
        }
        if target.price == 0 {
            return Err(GameError::InvalidParameters.into());
        }
        let mut input_value = 0u64;
        for &id in instance_ids {
            let owned = self.ledger.get(id).ok_or(InventoryError::UnknownItem(id))?;
            input_value = input_value.saturating_add(owned.item.price);
        }
        if input_value == 0 {
            return Err(GameError::InvalidParameters.into());
        }

        let forfeited = self.ledger.remove(instance_ids)?;
        let round = UpgradeRound::attempt(input_value, target.clone(), &mut self.rng)?;
        let (success, success_chance, landing) =
            (round.success(), round.success_chance(), round.landing());

        let mut events = self.begin(Round::Upgrade(round), input_value);
        events.push(Event::ItemsForfeited {
            round: self.round_index,
            instance_ids: forfeited.iter().map(|owned| owned.instance_id).collect(),
        });
        events.push(Event::UpgradeResolved {
            round: self.round_index,
            success_chance,
            success,
            landing,
        });
        if success {
            let items = self.ledger.add(vec![target])?;
            events.push(Event::ItemsGranted {
                round: self.round_index,
                items,
            });
        }

        self.settle_if_terminal(&mut events).await?;
        Ok(events)
    }
}
