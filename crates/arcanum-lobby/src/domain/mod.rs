//! Domain model for the Lobby & Matchmaking context.

pub mod entry;
pub mod repository;
