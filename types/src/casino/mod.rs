mod card;
mod constants;
mod event;
mod game;
mod item;
mod outcome;

pub use card::*;
pub use constants::*;
pub use event::*;
pub use game::*;
pub use item::*;
pub use outcome::*;
