//! Application layer for the Lobby & Matchmaking context.

pub mod command_handlers;
pub mod query_handlers;
