//! Domain model for the Duel & Round context.

pub mod bounds;
pub mod duel;
pub mod outcome;
pub mod repository;
pub mod wizard;
