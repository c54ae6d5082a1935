use serde::{Deserialize, Serialize};
use std::fmt;

/// Cards in a standard deck.
pub const DECK_SIZE: u8 = 52;

/// Card suits, in deck order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Spades = 0,
    Hearts = 1,
    Diamonds = 2,
    Clubs = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    fn symbol(self) -> char {
        match self {
            Suit::Spades => 'S',
            Suit::Hearts => 'H',
            Suit::Diamonds => 'D',
            Suit::Clubs => 'C',
        }
    }
}

/// A card from a standard 52-card deck.
///
/// Encoded as a single byte: `suit = id / 13`, `rank = id % 13 + 1`
/// (1 = Ace, 11 = Jack, 12 = Queen, 13 = King).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card(u8);

impl Card {
    /// Build a card from a rank (1-13) and suit.
    pub fn new(rank: u8, suit: Suit) -> Option<Self> {
        if !(1..=13).contains(&rank) {
            return None;
        }
        Some(Self(suit as u8 * 13 + (rank - 1)))
    }

    /// Build a card from its byte encoding (0-51).
    pub fn from_id(id: u8) -> Option<Self> {
        (id < DECK_SIZE).then_some(Self(id))
    }

    pub fn id(self) -> u8 {
        self.0
    }

    /// Rank from 1 (Ace) to 13 (King).
    pub fn rank(self) -> u8 {
        (self.0 % 13) + 1
    }

    pub fn suit(self) -> Suit {
        Suit::ALL[(self.0 / 13) as usize]
    }

    pub fn is_ace(self) -> bool {
        self.rank() == 1
    }

    /// Blackjack value before soft-ace adjustment: faces count 10, aces 11.
    pub fn value(self) -> u8 {
        match self.rank() {
            1 => 11,
            r if r >= 10 => 10,
            r => r,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = match self.rank() {
            1 => "A".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            r => r.to_string(),
        };
        write!(f, "{}{}", rank, self.suit().symbol())
    }
}

/// An unshuffled 52-card deck in id order.
pub fn standard_deck() -> Vec<Card> {
    (0..DECK_SIZE).map(Card).collect()
}
