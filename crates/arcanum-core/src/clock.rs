//! Time source for the engine.
//!
//! Handlers never call `Utc::now()` directly: timestamps such as lobby
//! join order and a round's `resolving_since` come through this trait, so
//! tests can pin the clock and exercise grace-period edges exactly.

use chrono::{DateTime, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock, used outside tests.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
