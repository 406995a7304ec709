//! Arcanum Arena — Duel & Round bounded context.
//!
//! Owns the duel and round state machines, the bounding of narrator
//! output, and winner determination.

pub mod application;
pub mod domain;
pub mod testing;
