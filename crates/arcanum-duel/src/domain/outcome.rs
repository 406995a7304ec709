//! Outcome resolution: bounding narrator deltas and deciding winners.

use serde::{Deserialize, Serialize};

use super::bounds::{apply_health_delta, clamp_score_delta};
use super::duel::RoundLimit;

/// Raw per-participant deltas proposed by the narrator. Untrusted: the
/// advisory ranges (score `[0, 10]`, health `[-100, 100]`) are not assumed
/// to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedDeltas {
    /// Proposed score delta for participant 0.
    pub score_a: i32,
    /// Proposed health delta for participant 0.
    pub health_a: i32,
    /// Proposed score delta for participant 1.
    pub score_b: i32,
    /// Proposed health delta for participant 1.
    pub health_b: i32,
}

/// Bounded result for one side of a round, ready to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideOutcome {
    /// Score awarded this round, clamped to `[0, 10]`.
    pub score_delta: u32,
    /// Health change actually applied (already restricted to land in
    /// `[0, 100]`).
    pub health_delta: i32,
    /// Health after the round.
    pub health: u32,
    /// Cumulative score after the round.
    pub score: u32,
}

/// The stored outcome of a resolved round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Narrative text for the round.
    pub narrative: String,
    /// One-sentence result summary.
    pub summary: String,
    /// Prompt text for the illustration collaborator, if any.
    pub illustration_prompt: Option<String>,
    /// Bounded per-participant results, indexed like the duel's
    /// participants.
    pub sides: [SideOutcome; 2],
}

/// Clamps the narrator's proposed deltas against both participants'
/// current health and score, producing bounded per-side results.
#[must_use]
pub fn resolve_deltas(
    current: [(u32, u32); 2],
    proposed: ProposedDeltas,
) -> [SideOutcome; 2] {
    let bound = |(health, score): (u32, u32), score_delta: i32, health_delta: i32| {
        let score_delta = clamp_score_delta(score_delta);
        let (health, health_delta) = apply_health_delta(health, health_delta);
        SideOutcome {
            score_delta,
            health_delta,
            health,
            score: score + score_delta,
        }
    };
    [
        bound(current[0], proposed.score_a, proposed.health_a),
        bound(current[1], proposed.score_b, proposed.health_b),
    ]
}

/// Verdict of the terminal check after a round's deltas are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Winning participant indices: one entry for a win, both for a draw.
    pub winners: Vec<usize>,
}

/// Runs the terminal check for a just-resolved round.
///
/// A health-zero event ends the duel immediately and pre-empts the
/// round-count check. Otherwise, once the round index reaches the limit,
/// higher score wins; equal scores fall back to higher remaining health;
/// equal on both is a draw. Fight-to-the-death duels never apply the
/// round-limit branch.
#[must_use]
pub fn check_terminal(
    round_limit: RoundLimit,
    round_index: u32,
    sides: &[SideOutcome; 2],
) -> Option<Verdict> {
    match (sides[0].health, sides[1].health) {
        (0, 0) => return Some(Verdict { winners: vec![0, 1] }),
        (0, _) => return Some(Verdict { winners: vec![1] }),
        (_, 0) => return Some(Verdict { winners: vec![0] }),
        _ => {}
    }

    let limit = match round_limit {
        RoundLimit::Best { rounds } => rounds,
        RoundLimit::ToTheDeath => return None,
    };
    if round_index < limit {
        return None;
    }

    let winners = match sides[0].score.cmp(&sides[1].score) {
        std::cmp::Ordering::Greater => vec![0],
        std::cmp::Ordering::Less => vec![1],
        std::cmp::Ordering::Equal => match sides[0].health.cmp(&sides[1].health) {
            std::cmp::Ordering::Greater => vec![0],
            std::cmp::Ordering::Less => vec![1],
            std::cmp::Ordering::Equal => vec![0, 1],
        },
    };
    Some(Verdict { winners })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(health: u32, score: u32) -> SideOutcome {
        SideOutcome {
            score_delta: 0,
            health_delta: 0,
            health,
            score,
        }
    }

    #[test]
    fn test_resolve_deltas_clamps_out_of_range_proposals() {
        let sides = resolve_deltas(
            [(10, 5), (80, 3)],
            ProposedDeltas {
                score_a: 99,
                health_a: -30,
                score_b: -4,
                health_b: 150,
            },
        );

        assert_eq!(sides[0].score_delta, 10);
        assert_eq!(sides[0].health_delta, -10);
        assert_eq!(sides[0].health, 0);
        assert_eq!(sides[0].score, 15);

        assert_eq!(sides[1].score_delta, 0);
        assert_eq!(sides[1].health_delta, 20);
        assert_eq!(sides[1].health, 100);
        assert_eq!(sides[1].score, 3);
    }

    #[test]
    fn test_health_zero_preempts_round_limit() {
        let sides = [side(0, 50), side(40, 2)];

        let verdict = check_terminal(RoundLimit::best(5), 2, &sides).unwrap();

        assert_eq!(verdict.winners, vec![1]);
    }

    #[test]
    fn test_double_knockout_is_a_draw() {
        let sides = [side(0, 10), side(0, 3)];

        let verdict = check_terminal(RoundLimit::best(5), 1, &sides).unwrap();

        assert_eq!(verdict.winners, vec![0, 1]);
    }

    #[test]
    fn test_round_limit_score_breaks_tie_before_health() {
        let sides = [side(60, 30), side(60, 28)];

        let verdict = check_terminal(RoundLimit::best(5), 5, &sides).unwrap();

        assert_eq!(verdict.winners, vec![0]);
    }

    #[test]
    fn test_round_limit_equal_score_falls_back_to_health() {
        let sides = [side(40, 20), side(70, 20)];

        let verdict = check_terminal(RoundLimit::best(3), 3, &sides).unwrap();

        assert_eq!(verdict.winners, vec![1]);
    }

    #[test]
    fn test_round_limit_equal_score_and_health_is_a_draw() {
        let sides = [side(55, 20), side(55, 20)];

        let verdict = check_terminal(RoundLimit::best(3), 3, &sides).unwrap();

        assert_eq!(verdict.winners, vec![0, 1]);
    }

    #[test]
    fn test_below_round_limit_continues() {
        let sides = [side(55, 20), side(42, 12)];

        assert!(check_terminal(RoundLimit::best(3), 2, &sides).is_none());
    }

    #[test]
    fn test_to_the_death_never_ends_on_round_count() {
        let sides = [side(1, 400), side(1, 2)];

        assert!(check_terminal(RoundLimit::ToTheDeath, 50, &sides).is_none());
    }
}
