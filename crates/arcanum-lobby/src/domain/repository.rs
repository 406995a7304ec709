//! Repository trait for lobby entries.

use async_trait::async_trait;
use uuid::Uuid;

use arcanum_core::error::DomainError;
use arcanum_core::store::{DocumentRepository, Versioned};

use super::entry::{DuelType, LobbyEntry};

/// Persistence for lobby entries.
#[async_trait]
pub trait LobbyRepository: DocumentRepository<LobbyEntry> {
    /// The actor's live entry, if any. At most one exists.
    async fn find_by_actor(&self, actor: Uuid)
    -> Result<Option<Versioned<LobbyEntry>>, DomainError>;

    /// Any live entry committed to this wizard.
    async fn find_by_wizard(
        &self,
        wizard_id: Uuid,
    ) -> Result<Option<Versioned<LobbyEntry>>, DomainError>;

    /// All `Waiting` entries of one duel type, oldest first.
    async fn find_waiting(
        &self,
        duel_type: DuelType,
    ) -> Result<Vec<Versioned<LobbyEntry>>, DomainError>;
}
