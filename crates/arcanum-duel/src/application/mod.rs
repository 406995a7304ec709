//! Application layer for the Duel & Round context.

pub mod command_handlers;
pub mod query_handlers;
