//! Arcanum Arena — HTTP API.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
