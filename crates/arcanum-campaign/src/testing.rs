//! In-memory campaign progress repository for tests.

use async_trait::async_trait;
use uuid::Uuid;

use arcanum_core::error::DomainError;
use arcanum_core::store::{DocumentRepository, MemoryStore, Versioned};

use crate::domain::progress::CampaignProgress;
use crate::domain::repository::CampaignRepository;

/// In-memory campaign progress repository.
#[derive(Debug, Default)]
pub struct InMemoryCampaignRepository {
    store: MemoryStore<CampaignProgress>,
}

#[async_trait]
impl DocumentRepository<CampaignProgress> for InMemoryCampaignRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Versioned<CampaignProgress>>, DomainError> {
        Ok(self.store.get(id))
    }

    async fn insert(&self, id: Uuid, document: &CampaignProgress) -> Result<(), DomainError> {
        self.store.insert(id, document)
    }

    async fn update(
        &self,
        id: Uuid,
        expected_version: i64,
        document: &CampaignProgress,
    ) -> Result<(), DomainError> {
        self.store.update(id, expected_version, document)
    }

    async fn remove(&self, id: Uuid, expected_version: i64) -> Result<(), DomainError> {
        self.store.remove(id, expected_version)
    }
}

#[async_trait]
impl CampaignRepository for InMemoryCampaignRepository {
    async fn find_by_wizard(
        &self,
        actor: Uuid,
        wizard_id: Uuid,
    ) -> Result<Option<Versioned<CampaignProgress>>, DomainError> {
        Ok(self
            .store
            .all()
            .into_iter()
            .find(|v| v.document.actor == actor && v.document.wizard_id == wizard_id))
    }
}
