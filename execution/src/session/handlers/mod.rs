mod blackjack;
mod loot;
mod tiles;
