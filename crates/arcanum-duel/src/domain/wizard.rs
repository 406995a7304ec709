//! Wizard profiles: the player-owned identities that fight duels.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A wizard profile owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wizard {
    /// Document identifier.
    pub id: Uuid,
    /// Owning account.
    pub owner: Uuid,
    /// Display name.
    pub name: String,
    /// Free-text appearance description, fed to the narrator for flavor.
    pub appearance: String,
}

impl Wizard {
    /// Creates a new wizard for `owner`.
    #[must_use]
    pub fn new(id: Uuid, owner: Uuid, name: String, appearance: String) -> Self {
        Self {
            id,
            owner,
            name,
            appearance,
        }
    }
}
