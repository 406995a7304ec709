//! In-memory repositories for exercising the duel context without a
//! database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use arcanum_core::error::DomainError;
use arcanum_core::store::{DocumentRepository, MemoryStore, Versioned};

use crate::domain::duel::{Duel, DuelStatus, RoundStatus};
use crate::domain::repository::{DuelRepository, WizardRepository};
use crate::domain::wizard::Wizard;

/// In-memory duel repository.
#[derive(Debug, Default)]
pub struct InMemoryDuelRepository {
    store: MemoryStore<Duel>,
}

impl InMemoryDuelRepository {
    /// Every stored duel, for test assertions.
    #[must_use]
    pub fn all(&self) -> Vec<Duel> {
        self.store.all().into_iter().map(|v| v.document).collect()
    }
}

#[async_trait]
impl DocumentRepository<Duel> for InMemoryDuelRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Versioned<Duel>>, DomainError> {
        Ok(self.store.get(id))
    }

    async fn insert(&self, id: Uuid, document: &Duel) -> Result<(), DomainError> {
        self.store.insert(id, document)
    }

    async fn update(
        &self,
        id: Uuid,
        expected_version: i64,
        document: &Duel,
    ) -> Result<(), DomainError> {
        self.store.update(id, expected_version, document)
    }

    async fn remove(&self, id: Uuid, expected_version: i64) -> Result<(), DomainError> {
        self.store.remove(id, expected_version)
    }
}

#[async_trait]
impl DuelRepository for InMemoryDuelRepository {
    async fn find_by_join_code(&self, code: &str) -> Result<Option<Versioned<Duel>>, DomainError> {
        Ok(self
            .store
            .all()
            .into_iter()
            .find(|v| v.document.join_code == code))
    }

    async fn find_stuck(&self, cutoff: DateTime<Utc>) -> Result<Vec<Versioned<Duel>>, DomainError> {
        Ok(self
            .store
            .all()
            .into_iter()
            .filter(|v| {
                v.document.status == DuelStatus::Active
                    && v.document.current_round_state().is_some_and(|round| {
                        round.status == RoundStatus::Resolving
                            && round.resolving_since.is_some_and(|since| since <= cutoff)
                    })
            })
            .collect())
    }
}

/// In-memory wizard repository.
#[derive(Debug, Default)]
pub struct InMemoryWizardRepository {
    store: MemoryStore<Wizard>,
}

#[async_trait]
impl DocumentRepository<Wizard> for InMemoryWizardRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Versioned<Wizard>>, DomainError> {
        Ok(self.store.get(id))
    }

    async fn insert(&self, id: Uuid, document: &Wizard) -> Result<(), DomainError> {
        self.store.insert(id, document)
    }

    async fn update(
        &self,
        id: Uuid,
        expected_version: i64,
        document: &Wizard,
    ) -> Result<(), DomainError> {
        self.store.update(id, expected_version, document)
    }

    async fn remove(&self, id: Uuid, expected_version: i64) -> Result<(), DomainError> {
        self.store.remove(id, expected_version)
    }
}

#[async_trait]
impl WizardRepository for InMemoryWizardRepository {
    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Versioned<Wizard>>, DomainError> {
        Ok(self
            .store
            .all()
            .into_iter()
            .filter(|v| v.document.owner == owner)
            .collect())
    }
}
