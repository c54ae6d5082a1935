//! Data shared by the arcade engine and its consumers.
//!
//! Nothing in this crate draws randomness or touches a ledger; it only
//! describes cards, tiles, items, phases and the events a session emits.

pub mod casino;
