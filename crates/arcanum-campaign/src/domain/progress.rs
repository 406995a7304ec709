//! Campaign progress: one document per (actor, wizard) pair.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::opponents::FINAL_OPPONENT;

/// A wizard's position on the campaign ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignProgress {
    /// Document identifier.
    pub id: Uuid,
    /// Owning account.
    pub actor: Uuid,
    /// The wizard climbing the ladder.
    pub wizard_id: Uuid,
    /// The opponent to fight next; `FINAL_OPPONENT + 1` once complete.
    pub current_opponent: u32,
    /// Opponents defeated so far, in order. Grows monotonically.
    pub defeated: Vec<u32>,
    /// Set when the final opponent falls. Never revoked.
    pub has_relic: bool,
}

impl CampaignProgress {
    /// Fresh progress at the bottom of the ladder.
    #[must_use]
    pub fn new(id: Uuid, actor: Uuid, wizard_id: Uuid) -> Self {
        Self {
            id,
            actor,
            wizard_id,
            current_opponent: 1,
            defeated: Vec::new(),
            has_relic: false,
        }
    }

    /// Whether the whole ladder has been cleared.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current_opponent > FINAL_OPPONENT
    }

    /// Records the result of a campaign battle. Returns whether progress
    /// changed.
    ///
    /// Defensive against duplicate or reprocessed notifications: a number
    /// that is not the current opponent, or one already defeated, leaves
    /// progress untouched. Losses never mutate. A genuine win appends the
    /// opponent, advances by exactly one, and sets the relic when the
    /// final opponent falls.
    pub fn record_battle(&mut self, opponent_number: u32, won: bool) -> bool {
        if !won {
            return false;
        }
        if opponent_number != self.current_opponent {
            return false;
        }
        if self.defeated.contains(&opponent_number) {
            return false;
        }

        self.defeated.push(opponent_number);
        self.current_opponent += 1;
        if opponent_number == FINAL_OPPONENT {
            self.has_relic = true;
        }
        true
    }

    /// Luck after the relic bonus: a flat +1 while the relic is held.
    /// Read-time derivation; stored luck values are never rewritten.
    #[must_use]
    pub fn effective_luck(&self, base: u32) -> u32 {
        if self.has_relic { base + 1 } else { base }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress() -> CampaignProgress {
        CampaignProgress::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn test_win_advances_by_exactly_one() {
        let mut p = progress();

        assert!(p.record_battle(1, true));

        assert_eq!(p.current_opponent, 2);
        assert_eq!(p.defeated, vec![1]);
        assert!(!p.has_relic);
    }

    #[test]
    fn test_loss_never_mutates() {
        let mut p = progress();

        assert!(!p.record_battle(1, false));

        assert_eq!(p.current_opponent, 1);
        assert!(p.defeated.is_empty());
    }

    #[test]
    fn test_duplicate_win_notification_is_idempotent() {
        let mut p = progress();
        assert!(p.record_battle(1, true));

        assert!(!p.record_battle(1, true));

        assert_eq!(p.current_opponent, 2);
        assert_eq!(p.defeated, vec![1]);
    }

    #[test]
    fn test_out_of_order_win_is_ignored() {
        let mut p = progress();

        assert!(!p.record_battle(3, true));

        assert_eq!(p.current_opponent, 1);
        assert!(p.defeated.is_empty());
    }

    #[test]
    fn test_final_win_awards_relic_and_completes() {
        let mut p = progress();
        for number in 1..=FINAL_OPPONENT {
            assert!(p.record_battle(number, true));
        }

        assert!(p.has_relic);
        assert!(p.is_complete());
        assert_eq!(p.defeated.len() as u32, FINAL_OPPONENT);
    }

    #[test]
    fn test_effective_luck_adds_one_with_relic() {
        let mut p = progress();
        assert_eq!(p.effective_luck(6), 6);

        p.has_relic = true;

        assert_eq!(p.effective_luck(6), 7);
    }
}
