//! Arcanum Arena — Campaign progression bounded context.
//!
//! A fixed ladder of scripted opponents fought strictly in order, each
//! defeated exactly once, with a luck relic awarded for completing the
//! ladder.

pub mod application;
pub mod domain;
pub mod testing;
