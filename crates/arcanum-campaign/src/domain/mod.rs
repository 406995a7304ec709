//! Domain model for the Campaign context.

pub mod opponents;
pub mod progress;
pub mod repository;
