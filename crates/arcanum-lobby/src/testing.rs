//! In-memory lobby repository for tests.

use async_trait::async_trait;
use uuid::Uuid;

use arcanum_core::error::DomainError;
use arcanum_core::store::{DocumentRepository, MemoryStore, Versioned};

use crate::domain::entry::{DuelType, EntryStatus, LobbyEntry};
use crate::domain::repository::LobbyRepository;

/// In-memory lobby repository.
#[derive(Debug, Default)]
pub struct InMemoryLobbyRepository {
    store: MemoryStore<LobbyEntry>,
}

#[async_trait]
impl DocumentRepository<LobbyEntry> for InMemoryLobbyRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Versioned<LobbyEntry>>, DomainError> {
        Ok(self.store.get(id))
    }

    async fn insert(&self, id: Uuid, document: &LobbyEntry) -> Result<(), DomainError> {
        self.store.insert(id, document)
    }

    async fn update(
        &self,
        id: Uuid,
        expected_version: i64,
        document: &LobbyEntry,
    ) -> Result<(), DomainError> {
        self.store.update(id, expected_version, document)
    }

    async fn remove(&self, id: Uuid, expected_version: i64) -> Result<(), DomainError> {
        self.store.remove(id, expected_version)
    }
}

#[async_trait]
impl LobbyRepository for InMemoryLobbyRepository {
    async fn find_by_actor(
        &self,
        actor: Uuid,
    ) -> Result<Option<Versioned<LobbyEntry>>, DomainError> {
        Ok(self
            .store
            .all()
            .into_iter()
            .find(|v| v.document.actor == actor))
    }

    async fn find_by_wizard(
        &self,
        wizard_id: Uuid,
    ) -> Result<Option<Versioned<LobbyEntry>>, DomainError> {
        Ok(self
            .store
            .all()
            .into_iter()
            .find(|v| v.document.wizard_id == wizard_id))
    }

    async fn find_waiting(
        &self,
        duel_type: DuelType,
    ) -> Result<Vec<Versioned<LobbyEntry>>, DomainError> {
        let mut waiting: Vec<Versioned<LobbyEntry>> = self
            .store
            .all()
            .into_iter()
            .filter(|v| {
                v.document.duel_type == duel_type && v.document.status == EntryStatus::Waiting
            })
            .collect();
        waiting.sort_by_key(|v| v.document.joined_at);
        Ok(waiting)
    }
}
