//! Participant controller: who is behind a duel participant.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The actor controlling a duel participant — either a human player
/// (identified by the opaque id from the identity provider, or a
/// locally-generated session token for anonymous play) or a scripted
/// campaign opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Controller {
    /// A human player.
    Human {
        /// Opaque actor id.
        actor: Uuid,
    },
    /// A scripted campaign opponent.
    Scripted {
        /// The opponent's number in the campaign roster.
        opponent: u32,
    },
}

impl Controller {
    /// Returns the actor id when human, `None` for scripted opponents.
    #[must_use]
    pub fn actor(&self) -> Option<Uuid> {
        match self {
            Self::Human { actor } => Some(*actor),
            Self::Scripted { .. } => None,
        }
    }

    /// Returns `true` when this participant is scripted.
    #[must_use]
    pub fn is_scripted(&self) -> bool {
        matches!(self, Self::Scripted { .. })
    }
}
