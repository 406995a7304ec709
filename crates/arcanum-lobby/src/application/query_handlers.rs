//! Query handlers for the Lobby & Matchmaking context.

use uuid::Uuid;

use arcanum_core::error::DomainError;

use crate::domain::entry::LobbyEntry;
use crate::domain::repository::LobbyRepository;

/// The caller's live lobby entry, if any.
///
/// # Errors
///
/// Returns a repository error on storage failure.
pub async fn get_entry(
    lobby: &dyn LobbyRepository,
    actor: Uuid,
) -> Result<Option<LobbyEntry>, DomainError> {
    Ok(lobby.find_by_actor(actor).await?.map(|v| v.document))
}
