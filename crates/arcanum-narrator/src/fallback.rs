//! Deterministic fallback narration.
//!
//! Used whenever the collaborator fails, so a duel never stalls on a
//! third-party outage. Text is templated from the two actions; deltas are
//! balanced draws from the injected RNG.

use arcanum_core::rng::DeterministicRng;

use crate::client::{NarrationRequest, NarrationResponse, ProposedSide};

/// Score delta range for fallback rounds.
const FALLBACK_SCORE: (i32, i32) = (2, 7);

/// Health delta range for fallback rounds.
const FALLBACK_HEALTH: (i32, i32) = (-10, 10);

/// Produces a serviceable narration without the collaborator.
#[must_use]
pub fn fallback_narration(
    request: &NarrationRequest,
    rng: &mut dyn DeterministicRng,
) -> NarrationResponse {
    let [a, b] = &request.participants;

    let narrative = format!(
        "{} {} while {} {}. The exchange crackles across the arena and \
         both wizards stagger back, reassessing.",
        a.name, a.action, b.name, b.action
    );
    let summary = format!("{} and {} trade blows evenly.", a.name, b.name);

    let mut side = || ProposedSide {
        score_delta: rng.next_i32_range(FALLBACK_SCORE.0, FALLBACK_SCORE.1),
        health_delta: rng.next_i32_range(FALLBACK_HEALTH.0, FALLBACK_HEALTH.1),
    };
    let sides = [side(), side()];

    NarrationResponse {
        narrative,
        summary,
        illustration_prompt: None,
        sides,
    }
}
