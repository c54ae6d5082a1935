pub mod casino;
pub mod config;
pub mod ledger;
pub mod scope;
pub mod session;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use config::{Config, ConfigError, ValidatedConfig};
pub use ledger::{Entry, Inventory, InventoryError, Ledger, LedgerError, Memory};
pub use scope::{Liveness, Scope};
pub use session::{Session, SessionError};
