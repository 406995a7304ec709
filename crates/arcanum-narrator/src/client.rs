//! Narrator client contract and wire types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Context for one side of the round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantContext {
    /// Display name.
    pub name: String,
    /// Free-text appearance, empty when unknown.
    pub appearance: String,
    /// Health going into the round.
    pub health: u32,
    /// Cumulative score going into the round.
    pub score: u32,
    /// The action submitted (or drawn from the script) this round.
    pub action: String,
    /// Luck drawn for this round, relic bonus already applied.
    pub luck: u32,
}

/// The full request sent to the narration collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationRequest {
    /// Which round is being narrated.
    pub round_index: u32,
    /// One-sentence summaries of the rounds already resolved, in order.
    pub history: Vec<String>,
    /// Both sides, in participant order.
    pub participants: [ParticipantContext; 2],
}

/// Proposed per-side numbers. Advisory only; the duel context re-clamps
/// every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedSide {
    /// Proposed score delta.
    pub score_delta: i32,
    /// Proposed health delta.
    pub health_delta: i32,
}

/// What the collaborator returns for a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationResponse {
    /// Narrative text.
    pub narrative: String,
    /// One-sentence result summary.
    pub summary: String,
    /// Optional prompt for the illustration collaborator.
    pub illustration_prompt: Option<String>,
    /// Proposed numbers, in participant order.
    pub sides: [ProposedSide; 2],
}

/// Failures at the narrator boundary.
#[derive(Debug, Error)]
pub enum NarratorError {
    /// Transport failure reaching the collaborator.
    #[error("narrator request failed: {0}")]
    Http(String),

    /// The collaborator answered with something unusable.
    #[error("narrator response malformed: {0}")]
    Malformed(String),
}

/// Stand-in used when no collaborator endpoint is configured; every
/// request fails so the deterministic fallback narrates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNarrator;

#[async_trait]
impl NarratorClient for DisabledNarrator {
    async fn narrate(
        &self,
        _request: &NarrationRequest,
    ) -> Result<NarrationResponse, NarratorError> {
        Err(NarratorError::Http("no collaborator configured".to_owned()))
    }
}

/// Async narration collaborator.
#[async_trait]
pub trait NarratorClient: Send + Sync {
    /// Produces narration for one round.
    ///
    /// # Errors
    ///
    /// Returns `NarratorError` on transport or parse failure; callers
    /// fall back to deterministic narration.
    async fn narrate(&self, request: &NarrationRequest) -> Result<NarrationResponse, NarratorError>;
}
