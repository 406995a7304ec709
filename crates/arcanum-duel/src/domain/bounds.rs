//! Bounded arithmetic for health and score.
//!
//! The narrator is untrusted for numeric bounds; every proposed delta
//! passes through these functions before touching duel state.

/// Health ceiling for every participant.
pub const MAX_HEALTH: u32 = 100;

/// Maximum score a single round may award one side.
pub const MAX_SCORE_DELTA: u32 = 10;

/// Clamps a proposed per-round score delta into `[0, MAX_SCORE_DELTA]`.
#[must_use]
pub fn clamp_score_delta(proposed: i32) -> u32 {
    #[allow(clippy::cast_sign_loss)]
    let clamped = proposed.clamp(0, MAX_SCORE_DELTA as i32) as u32;
    clamped
}

/// Clamps a proposed health delta into `[-100, 100]`.
#[must_use]
pub fn clamp_health_delta(proposed: i32) -> i32 {
    #[allow(clippy::cast_possible_wrap)]
    let max = MAX_HEALTH as i32;
    proposed.clamp(-max, max)
}

/// Applies a proposed health delta to a current health value, restricting
/// the delta so the result lands in `[0, MAX_HEALTH]`.
///
/// Returns `(resulting_health, effective_delta)` where the effective delta
/// is the portion actually applied: a proposed −30 against 10 remaining
/// health becomes exactly −10, landing at 0, never negative.
#[must_use]
pub fn apply_health_delta(health: u32, proposed: i32) -> (u32, i32) {
    let clamped = i64::from(clamp_health_delta(proposed));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let result = (i64::from(health) + clamped).clamp(0, i64::from(MAX_HEALTH)) as u32;
    #[allow(clippy::cast_possible_wrap)]
    let effective = result as i32 - health as i32;
    (result, effective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_clamp_score_delta_bounds() {
        assert_eq!(clamp_score_delta(-5), 0);
        assert_eq!(clamp_score_delta(0), 0);
        assert_eq!(clamp_score_delta(7), 7);
        assert_eq!(clamp_score_delta(10), 10);
        assert_eq!(clamp_score_delta(250), 10);
    }

    #[test]
    fn test_clamp_health_delta_bounds() {
        assert_eq!(clamp_health_delta(-1000), -100);
        assert_eq!(clamp_health_delta(-30), -30);
        assert_eq!(clamp_health_delta(45), 45);
        assert_eq!(clamp_health_delta(999), 100);
    }

    #[test]
    fn test_apply_health_delta_restricts_to_remaining_health() {
        let (health, effective) = apply_health_delta(10, -30);
        assert_eq!(health, 0);
        assert_eq!(effective, -10);
    }

    #[test]
    fn test_apply_health_delta_caps_healing_at_max() {
        let (health, effective) = apply_health_delta(95, 20);
        assert_eq!(health, 100);
        assert_eq!(effective, 5);
    }

    #[test]
    fn test_apply_health_delta_randomized_inputs_stay_in_range() {
        // Property: for any starting health and any proposed delta, the
        // resulting health is always in [0, 100] and the effective delta
        // reproduces it exactly.
        let mut rng = StdRng::seed_from_u64(0x2545_f491_4f6c_dd1d);
        for _ in 0..10_000 {
            let health = rng.random_range(0..=MAX_HEALTH);
            let proposed = rng.random_range(-500..=500);

            let (result, effective) = apply_health_delta(health, proposed);

            assert!(result <= MAX_HEALTH);
            #[allow(clippy::cast_possible_wrap)]
            let reproduced = health as i32 + effective;
            assert_eq!(reproduced, i32::try_from(result).unwrap());
        }
    }
}
