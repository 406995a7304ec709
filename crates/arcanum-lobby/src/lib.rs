//! Arcanum Arena — Lobby & Matchmaking bounded context.
//!
//! Owns the matchmaking queue: first-come-first-served pairing within a
//! duel type, atomic pairing under optimistic concurrency, and idempotent
//! duel materialization.

pub mod application;
pub mod domain;
pub mod testing;
