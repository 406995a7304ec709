//! Query handlers for the Duel & Round context.

use uuid::Uuid;

use arcanum_core::error::DomainError;

use crate::domain::duel::Duel;
use crate::domain::repository::{DuelRepository, WizardRepository};
use crate::domain::wizard::Wizard;

/// Loads a duel by id.
///
/// # Errors
///
/// Returns `DocumentNotFound` if the duel does not exist.
pub async fn get_duel(duels: &dyn DuelRepository, duel_id: Uuid) -> Result<Duel, DomainError> {
    Ok(duels.require(duel_id).await?.document)
}

/// Loads a duel by join code.
///
/// # Errors
///
/// Returns `DocumentNotFound` if no duel carries the code.
pub async fn find_duel_by_code(
    duels: &dyn DuelRepository,
    code: &str,
) -> Result<Duel, DomainError> {
    duels
        .find_by_join_code(code)
        .await?
        .map(|v| v.document)
        .ok_or(DomainError::DocumentNotFound(Uuid::nil()))
}

/// Loads a wizard by id.
///
/// # Errors
///
/// Returns `DocumentNotFound` if the wizard does not exist.
pub async fn get_wizard(
    wizards: &dyn WizardRepository,
    wizard_id: Uuid,
) -> Result<Wizard, DomainError> {
    Ok(wizards.require(wizard_id).await?.document)
}

/// Lists all wizards owned by an account.
///
/// # Errors
///
/// Returns a repository error on storage failure.
pub async fn list_wizards(
    wizards: &dyn WizardRepository,
    owner: Uuid,
) -> Result<Vec<Wizard>, DomainError> {
    Ok(wizards
        .find_by_owner(owner)
        .await?
        .into_iter()
        .map(|v| v.document)
        .collect())
}
