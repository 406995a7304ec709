//! Lobby entries: one live queue slot per actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arcanum_duel::domain::duel::RoundLimit;

/// The kind of duel an entry queues for. Entries only match within the
/// same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelType {
    /// Short three-round duel.
    Quick,
    /// Full five-round duel.
    Ranked,
    /// No round limit; a knockout ends it.
    ToTheDeath,
}

impl DuelType {
    /// The round limit a materialized duel of this type gets.
    #[must_use]
    pub fn round_limit(self) -> RoundLimit {
        match self {
            Self::Quick => RoundLimit::best(3),
            Self::Ranked => RoundLimit::best(5),
            Self::ToTheDeath => RoundLimit::ToTheDeath,
        }
    }
}

/// Lifecycle of a lobby entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// In the queue, unmatched.
    Waiting,
    /// Paired with a counterpart; awaiting materialization.
    Matched,
}

/// A queue slot. At most one live entry per actor and per wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyEntry {
    /// Document identifier.
    pub id: Uuid,
    /// The queued account.
    pub actor: Uuid,
    /// The wizard committed to this entry.
    pub wizard_id: Uuid,
    /// What kind of duel the entry queues for.
    pub duel_type: DuelType,
    /// Current state.
    pub status: EntryStatus,
    /// Queue arrival time; pairing is first-come-first-served on this.
    pub joined_at: DateTime<Utc>,
    /// Back-reference to the counterpart entry once `Matched`.
    pub matched_with: Option<Uuid>,
}

impl LobbyEntry {
    /// Creates a fresh `Waiting` entry.
    #[must_use]
    pub fn waiting(
        id: Uuid,
        actor: Uuid,
        wizard_id: Uuid,
        duel_type: DuelType,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            actor,
            wizard_id,
            duel_type,
            status: EntryStatus::Waiting,
            joined_at,
            matched_with: None,
        }
    }

    /// Marks the entry matched with `counterpart`.
    pub fn mark_matched(&mut self, counterpart: Uuid) {
        self.status = EntryStatus::Matched;
        self.matched_with = Some(counterpart);
    }

    /// Resets a matched entry back to `Waiting`, clearing the
    /// back-reference.
    pub fn reset_to_waiting(&mut self) {
        self.status = EntryStatus::Waiting;
        self.matched_with = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duel_type_round_limits() {
        assert_eq!(DuelType::Quick.round_limit(), RoundLimit::best(3));
        assert_eq!(DuelType::Ranked.round_limit(), RoundLimit::best(5));
        assert_eq!(DuelType::ToTheDeath.round_limit(), RoundLimit::ToTheDeath);
    }

    #[test]
    fn test_match_and_reset_round_trip() {
        let mut entry = LobbyEntry::waiting(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            DuelType::Quick,
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
        );
        let counterpart = Uuid::new_v4();

        entry.mark_matched(counterpart);
        assert_eq!(entry.status, EntryStatus::Matched);
        assert_eq!(entry.matched_with, Some(counterpart));

        entry.reset_to_waiting();
        assert_eq!(entry.status, EntryStatus::Waiting);
        assert_eq!(entry.matched_with, None);
    }
}
