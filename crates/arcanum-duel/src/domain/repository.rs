//! Repository traits for the duel context.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use arcanum_core::error::DomainError;
use arcanum_core::store::{DocumentRepository, Versioned};

use super::duel::Duel;
use super::wizard::Wizard;

/// Persistence for duel documents.
#[async_trait]
pub trait DuelRepository: DocumentRepository<Duel> {
    /// Look up a duel by its human-shareable join code.
    async fn find_by_join_code(&self, code: &str) -> Result<Option<Versioned<Duel>>, DomainError>;

    /// Active duels whose current round entered `Resolving` at or before
    /// `cutoff`. Drives stuck-round recovery sweeps.
    async fn find_stuck(&self, cutoff: DateTime<Utc>) -> Result<Vec<Versioned<Duel>>, DomainError>;
}

/// Persistence for wizard profiles.
#[async_trait]
pub trait WizardRepository: DocumentRepository<Wizard> {
    /// All wizards belonging to an account.
    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Versioned<Wizard>>, DomainError>;
}
