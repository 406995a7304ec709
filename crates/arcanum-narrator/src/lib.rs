//! Arcanum Arena — narration collaborator boundary.
//!
//! The narrator is an untrusted external collaborator: it proposes
//! narrative text and numeric deltas, and everything it returns is
//! re-bounded by the duel context. A deterministic fallback keeps duels
//! moving when the collaborator fails.

pub mod client;
pub mod dispatch;
pub mod fallback;
pub mod http;
