//! Lifetime of the context that owns a session.
//!
//! The owner holds a [Scope]; sessions hold a [Liveness] handle and check it
//! after every suspension point. Dropping the scope tears the context down.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

#[derive(Debug)]
pub struct Scope {
    alive: Arc<AtomicBool>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle for a session owned by this scope.
    pub fn liveness(&self) -> Liveness {
        Liveness {
            alive: self.alive.clone(),
        }
    }

    /// Tear down the owning context without dropping the scope.
    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.close();
    }
}

/// Observer of a [Scope].
#[derive(Clone, Debug)]
pub struct Liveness {
    alive: Arc<AtomicBool>,
}

impl Liveness {
    /// A handle with no owning scope; it stays alive forever.
    pub fn detached() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}
