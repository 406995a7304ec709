//! Repository trait for campaign progress.

use async_trait::async_trait;
use uuid::Uuid;

use arcanum_core::error::DomainError;
use arcanum_core::store::{DocumentRepository, Versioned};

use super::progress::CampaignProgress;

/// Persistence for campaign progress documents.
#[async_trait]
pub trait CampaignRepository: DocumentRepository<CampaignProgress> {
    /// The progress for one (actor, wizard) pair, if it exists. Progress
    /// is created lazily on the first battle attempt and never deleted.
    async fn find_by_wizard(
        &self,
        actor: Uuid,
        wizard_id: Uuid,
    ) -> Result<Option<Versioned<CampaignProgress>>, DomainError>;
}
