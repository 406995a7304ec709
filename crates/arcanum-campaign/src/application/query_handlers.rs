//! Query handlers for the Campaign context.

use uuid::Uuid;

use arcanum_core::error::DomainError;

use crate::domain::opponents::{OPPONENTS, Opponent};
use crate::domain::progress::CampaignProgress;
use crate::domain::repository::CampaignRepository;

/// The wizard's campaign progress, if any battle was ever attempted.
///
/// # Errors
///
/// Returns a repository error on storage failure.
pub async fn get_progress(
    campaign: &dyn CampaignRepository,
    actor: Uuid,
    wizard_id: Uuid,
) -> Result<Option<CampaignProgress>, DomainError> {
    Ok(campaign
        .find_by_wizard(actor, wizard_id)
        .await?
        .map(|v| v.document))
}

/// The full opponent roster, in ladder order.
#[must_use]
pub fn opponent_roster() -> &'static [Opponent] {
    &OPPONENTS
}
