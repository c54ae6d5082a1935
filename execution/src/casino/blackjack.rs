//! Blackjack game implementation.
//!
//! One player hand against the dealer, with double down and splits up to
//! [MAX_HANDS] hands. Split hands are played left to right. The dealer draws
//! while below 17 (standing on every 17) and a natural pays 3:2.
//!
//! Cards are drawn from the end of the deck.

use super::selector::shuffle;
use super::{GameError, GameResult, RandomSource};
use arcade_types::casino::{
    standard_deck, Card, CardPhase, HandStatus, HandView, RoundOutcome, BLACKJACK_VALUE,
    DEALER_STAND_VALUE, MAX_HANDS, MAX_HAND_SIZE,
};

/// Blackjack move types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Hit,
    Stand,
    Double,
    Split,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandState {
    pub cards: Vec<Card>,
    /// 1 for the base bet, 2 once doubled.
    pub bet_mult: u8,
    pub status: HandStatus,
}

impl HandState {
    fn new(cards: Vec<Card>) -> Self {
        let status = if is_blackjack(&cards) {
            HandStatus::Blackjack
        } else {
            HandStatus::Playing
        };
        Self {
            cards,
            bet_mult: 1,
            status,
        }
    }

    pub fn value(&self) -> u8 {
        hand_value(&self.cards).0
    }
}

/// Calculate the value of a blackjack hand.
///
/// Aces count 11 until the total passes 21, then drop to 1 one at a time.
/// Returns the total and whether an ace still counts as 11.
pub fn hand_value(cards: &[Card]) -> (u8, bool) {
    let mut value: u16 = 0;
    let mut aces: u8 = 0;

    for card in cards {
        if card.is_ace() {
            aces += 1;
        }
        value += card.value() as u16;
    }

    while value > BLACKJACK_VALUE as u16 && aces > 0 {
        value -= 10;
        aces -= 1;
    }

    let is_soft = aces > 0;
    (value.min(u8::MAX as u16) as u8, is_soft)
}

/// Check if hand is a blackjack (21 with 2 cards).
pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_value(cards).0 == BLACKJACK_VALUE
}

/// Return owed on one hand once the dealer has finished.
pub fn settle_hand(hand: &HandState, dealer_cards: &[Card], wager: u64) -> u64 {
    let bet = wager.saturating_mul(hand.bet_mult as u64);
    match hand.status {
        HandStatus::Bust | HandStatus::Playing => 0,
        HandStatus::Blackjack => {
            if is_blackjack(dealer_cards) {
                bet
            } else {
                bet.saturating_mul(5) / 2
            }
        }
        HandStatus::Stood => {
            let player = hand.value();
            let dealer = hand_value(dealer_cards).0;
            if dealer > BLACKJACK_VALUE || player > dealer {
                bet.saturating_mul(2)
            } else if player == dealer {
                bet
            } else {
                0
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct BlackjackRound {
    wager: u64,
    max_hands: usize,
    deck: Vec<Card>,
    active_hand_idx: usize,
    hands: Vec<HandState>,
    dealer_cards: Vec<Card>,
    stage: CardPhase,
    payout: Option<u64>,
}

impl BlackjackRound {
    /// Shuffle a fresh deck and deal the opening cards.
    pub fn start<R: RandomSource + ?Sized>(wager: u64, max_hands: usize, rng: &mut R) -> Self {
        let mut deck = standard_deck();
        shuffle(&mut deck, rng);
        Self::deal(wager, max_hands, deck)
    }

    /// Deal from a prepared deck. Cards are drawn from the end.
    pub fn with_deck(wager: u64, max_hands: usize, deck: Vec<Card>) -> Result<Self, GameError> {
        if deck.len() < 4 {
            return Err(GameError::DeckExhausted);
        }
        Ok(Self::deal(wager, max_hands, deck))
    }

    fn deal(wager: u64, max_hands: usize, mut deck: Vec<Card>) -> Self {
        let player_cards: Vec<Card> = [deck.pop(), deck.pop()].into_iter().flatten().collect();
        let dealer_cards: Vec<Card> = [deck.pop(), deck.pop()].into_iter().flatten().collect();

        let mut round = Self {
            wager,
            max_hands: max_hands.clamp(1, MAX_HANDS),
            deck,
            active_hand_idx: 0,
            hands: vec![HandState::new(player_cards)],
            dealer_cards,
            stage: CardPhase::PlayerTurn,
            payout: None,
        };
        // A natural needs no decisions
        round.advance_turn();
        round
    }

    /// Whether the active hand may double down (wager availability is the
    /// ledger's call).
    pub fn can_double(&self) -> bool {
        self.active_hand()
            .is_some_and(|hand| hand.status == HandStatus::Playing && hand.cards.len() == 2)
    }

    /// Whether the active hand may be split (wager availability is the
    /// ledger's call).
    pub fn can_split(&self) -> bool {
        self.hands.len() < self.max_hands
            && self.active_hand().is_some_and(|hand| {
                hand.status == HandStatus::Playing
                    && hand.cards.len() == 2
                    && hand.cards[0].value() == hand.cards[1].value()
            })
    }

    pub fn process_move(&mut self, mv: Move) -> Result<GameResult, GameError> {
        match self.stage {
            CardPhase::PlayerTurn => {}
            CardPhase::Finished => return Err(GameError::GameAlreadyComplete),
            CardPhase::Betting | CardPhase::DealerTurn => return Err(GameError::InvalidMove),
        }
        if self.active_hand_idx >= self.hands.len() {
            return Err(GameError::InvalidState);
        }

        match mv {
            Move::Hit => {
                let Some(card) = self.deck.pop() else {
                    // Nothing left to draw: the hand stands as it is
                    self.hands[self.active_hand_idx].status = HandStatus::Stood;
                    self.advance_turn();
                    return Ok(GameResult::Continue);
                };
                let hand = &mut self.hands[self.active_hand_idx];
                hand.cards.push(card);

                let value = hand.value();
                if value > BLACKJACK_VALUE {
                    hand.status = HandStatus::Bust;
                } else if value == BLACKJACK_VALUE || hand.cards.len() >= MAX_HAND_SIZE {
                    hand.status = HandStatus::Stood;
                }
            }
            Move::Stand => {
                self.hands[self.active_hand_idx].status = HandStatus::Stood;
            }
            Move::Double => {
                if !self.can_double() {
                    return Err(GameError::InvalidMove);
                }
                let card = self.deck.pop();
                let hand = &mut self.hands[self.active_hand_idx];
                hand.bet_mult = 2;
                hand.cards.extend(card);
                hand.status = if hand.value() > BLACKJACK_VALUE {
                    HandStatus::Bust
                } else {
                    HandStatus::Stood
                };
            }
            Move::Split => {
                if !self.can_split() {
                    return Err(GameError::InvalidMove);
                }
                let idx = self.active_hand_idx;
                let split_card = self.hands[idx].cards.pop().ok_or(GameError::InvalidState)?;
                let kept_card = self.hands[idx].cards[0];

                let mut first = vec![kept_card];
                first.extend(self.deck.pop());
                let mut second = vec![split_card];
                second.extend(self.deck.pop());

                self.hands[idx] = Self::split_hand(first);
                self.hands.insert(idx + 1, Self::split_hand(second));
            }
        }

        self.advance_turn();
        Ok(GameResult::Continue)
    }

    /// A split hand that could not be dealt its second card stands.
    fn split_hand(cards: Vec<Card>) -> HandState {
        let mut hand = HandState::new(cards);
        if hand.cards.len() < 2 {
            hand.status = HandStatus::Stood;
        }
        hand
    }

    /// Move the active pointer to the next unresolved hand, handing over to
    /// the dealer once every hand is resolved.
    fn advance_turn(&mut self) {
        while self.active_hand_idx < self.hands.len() {
            if self.hands[self.active_hand_idx].status == HandStatus::Playing {
                return;
            }
            self.active_hand_idx += 1;
        }
        self.stage = CardPhase::DealerTurn;
    }

    /// Draw one dealer card if the dealer must still draw.
    ///
    /// Returns whether a card was drawn. The dealer only draws while a stood
    /// hand is waiting on the comparison.
    pub fn dealer_step(&mut self) -> bool {
        if self.stage != CardPhase::DealerTurn {
            return false;
        }
        let any_live = self.hands.iter().any(|h| h.status == HandStatus::Stood);
        if !any_live || hand_value(&self.dealer_cards).0 >= DEALER_STAND_VALUE {
            return false;
        }
        match self.deck.pop() {
            Some(card) => {
                self.dealer_cards.push(card);
                true
            }
            None => false,
        }
    }

    /// Settle every hand against the dealer and finish the round.
    pub fn settle(&mut self) -> Result<GameResult, GameError> {
        match self.stage {
            CardPhase::DealerTurn => {}
            CardPhase::Finished => return Err(GameError::GameAlreadyComplete),
            CardPhase::Betting | CardPhase::PlayerTurn => return Err(GameError::InvalidMove),
        }

        let total: u64 = self
            .hands
            .iter()
            .map(|hand| settle_hand(hand, &self.dealer_cards, self.wager))
            .fold(0u64, u64::saturating_add);

        self.stage = CardPhase::Finished;
        self.payout = Some(total);
        Ok(if total > 0 {
            GameResult::Win(total)
        } else {
            GameResult::Loss
        })
    }

    /// Run the dealer to completion and settle.
    pub fn play_dealer(&mut self) -> Result<GameResult, GameError> {
        while self.dealer_step() {}
        self.settle()
    }

    fn active_hand(&self) -> Option<&HandState> {
        match self.stage {
            CardPhase::PlayerTurn => self.hands.get(self.active_hand_idx),
            _ => None,
        }
    }

    pub fn wager(&self) -> u64 {
        self.wager
    }

    /// Sum of every stake placed on the round (base, doubles and splits).
    pub fn total_wagered(&self) -> u64 {
        self.hands
            .iter()
            .map(|hand| self.wager.saturating_mul(hand.bet_mult as u64))
            .fold(0u64, u64::saturating_add)
    }

    pub fn phase(&self) -> CardPhase {
        self.stage
    }

    pub fn hands(&self) -> &[HandState] {
        &self.hands
    }

    pub fn active_hand_index(&self) -> usize {
        self.active_hand_idx
    }

    pub fn dealer_cards(&self) -> &[Card] {
        &self.dealer_cards
    }

    pub fn payout(&self) -> Option<u64> {
        self.payout
    }

    pub fn outcome(&self) -> RoundOutcome {
        let hole_hidden = self.stage == CardPhase::PlayerTurn;
        RoundOutcome::CardHand {
            hands: self
                .hands
                .iter()
                .map(|hand| HandView {
                    cards: hand.cards.clone(),
                    value: hand.value(),
                    status: hand.status,
                    bet_mult: hand.bet_mult,
                })
                .collect(),
            active_hand: self.active_hand_idx,
            dealer: self
                .dealer_cards
                .iter()
                .enumerate()
                .map(|(i, &card)| (!(hole_hidden && i == 1)).then_some(card))
                .collect(),
        }
    }
}
