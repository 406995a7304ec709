//! Shared test doubles for the Arcanum Arena workspace.
//!
//! Deterministic clock and RNG implementations. The in-memory
//! repositories live in each context crate's `testing` module so that a
//! crate's own unit tests and its downstream consumers see the same
//! types.

mod clock;
mod rng;

pub use clock::FixedClock;
pub use rng::{MockRng, SequenceRng};
