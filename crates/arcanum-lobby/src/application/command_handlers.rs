//! Command handlers for the Lobby & Matchmaking context.
//!
//! Pairing is two optimistic updates ordered counterpart-first: a racing
//! matcher loses the counterpart's compare-and-swap and simply stays
//! `Waiting`, to be picked up by a later join. When two matchers claim
//! each other in the same instant, both self-swaps conflict and the
//! entry with the lower id materializes the duel.

use tracing::{info, warn};
use uuid::Uuid;

use arcanum_core::clock::Clock;
use arcanum_core::error::{DomainError, ValidationError};
use arcanum_core::rng::{DeterministicRng, alphanumeric_token};
use arcanum_core::store::Versioned;

use arcanum_duel::domain::duel::Duel;
use arcanum_duel::domain::repository::{DuelRepository, WizardRepository};

use crate::domain::entry::{DuelType, EntryStatus, LobbyEntry};
use crate::domain::repository::LobbyRepository;

/// Command: enter the matchmaking queue.
#[derive(Debug, Clone)]
pub struct JoinLobby {
    /// Acting account.
    pub actor: Uuid,
    /// The wizard to commit to the queue.
    pub wizard_id: Uuid,
    /// The kind of duel to queue for.
    pub duel_type: DuelType,
}

/// Command: leave the matchmaking queue.
#[derive(Debug, Clone)]
pub struct LeaveLobby {
    /// Acting account.
    pub actor: Uuid,
}

/// Result of a join: the caller's entry, plus the materialized duel when
/// this join completed a pairing.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// The caller's entry as last written.
    pub entry: LobbyEntry,
    /// The duel created by this join, if pairing succeeded.
    pub duel: Option<Duel>,
}

/// Handles `JoinLobby`: validates, inserts a `Waiting` entry, attempts a
/// first-come-first-served pairing, and materializes the duel when the
/// pairing completes.
///
/// # Errors
///
/// Returns `AlreadyQueued` if the actor has a live entry,
/// `WizardNotOwned` on an ownership mismatch, `WizardAlreadyQueued` if
/// the wizard is committed elsewhere, or a repository error.
pub async fn handle_join(
    command: &JoinLobby,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
    lobby: &dyn LobbyRepository,
    duels: &dyn DuelRepository,
    wizards: &dyn WizardRepository,
) -> Result<JoinOutcome, DomainError> {
    if lobby.find_by_actor(command.actor).await?.is_some() {
        return Err(ValidationError::AlreadyQueued.into());
    }
    let wizard = wizards.require(command.wizard_id).await?.document;
    if wizard.owner != command.actor {
        return Err(ValidationError::WizardNotOwned {
            wizard_id: command.wizard_id,
        }
        .into());
    }
    if lobby.find_by_wizard(command.wizard_id).await?.is_some() {
        return Err(ValidationError::WizardAlreadyQueued {
            wizard_id: command.wizard_id,
        }
        .into());
    }

    let entry = LobbyEntry::waiting(
        Uuid::new_v4(),
        command.actor,
        command.wizard_id,
        command.duel_type,
        clock.now(),
    );
    lobby.insert(entry.id, &entry).await?;
    info!(entry_id = %entry.id, duel_type = ?command.duel_type, "joined lobby");

    let Some(counterpart) = try_match(&entry, lobby).await? else {
        return Ok(JoinOutcome { entry, duel: None });
    };

    let duel = materialize(&entry, &counterpart, clock, rng, lobby, duels, wizards).await?;
    let mut matched = entry;
    matched.mark_matched(counterpart.id);
    Ok(JoinOutcome {
        entry: matched,
        duel: Some(duel),
    })
}

/// Attempts to pair `entry` with the earliest `Waiting` entry of the same
/// duel type. Returns the counterpart on success, `None` when no
/// counterpart exists or a racing matcher won the swap.
async fn try_match(
    entry: &LobbyEntry,
    lobby: &dyn LobbyRepository,
) -> Result<Option<LobbyEntry>, DomainError> {
    let Some(own) = lobby.get(entry.id).await? else {
        return Ok(None);
    };
    if own.document.status != EntryStatus::Waiting {
        return Ok(None);
    }

    let waiting = lobby.find_waiting(entry.duel_type).await?;
    let Some(candidate) = waiting
        .into_iter()
        .find(|v| v.document.id != entry.id && v.document.actor != entry.actor)
    else {
        return Ok(None);
    };

    // Counterpart first: losing this swap means someone else claimed the
    // candidate, and we stay Waiting.
    let mut counterpart = candidate.document;
    counterpart.mark_matched(entry.id);
    match lobby
        .update(counterpart.id, candidate.version, &counterpart)
        .await
    {
        Ok(()) => {}
        Err(DomainError::ConcurrencyConflict { .. }) => {
            info!(entry_id = %entry.id, "pairing lost the swap, staying in queue");
            return Ok(None);
        }
        Err(other) => return Err(other),
    }

    // Swap our own entry against the version held since before the scan.
    // A moved version means another matcher wrote to us while we were
    // claiming them.
    let mut claimed = own.document;
    claimed.mark_matched(counterpart.id);
    match lobby.update(claimed.id, own.version, &claimed).await {
        Ok(()) => Ok(Some(counterpart)),
        Err(DomainError::ConcurrencyConflict { .. }) => {
            resolve_mutual_claim(entry, counterpart, lobby).await
        }
        Err(other) => Err(other),
    }
}

/// Untangles the symmetric race where two matchers claim each other in
/// the same instant: both counterpart swaps land, both self swaps
/// conflict. Exactly one side may materialize, so the entry with the
/// lower id proceeds and the other stands down. A self-swap conflict
/// that is not a mutual claim (a concurrent leave, usually) hands the
/// claimed counterpart back to the queue.
async fn resolve_mutual_claim(
    entry: &LobbyEntry,
    counterpart: LobbyEntry,
    lobby: &dyn LobbyRepository,
) -> Result<Option<LobbyEntry>, DomainError> {
    let own = lobby.get(entry.id).await?;
    let mutual = own.as_ref().is_some_and(|v| {
        v.document.status == EntryStatus::Matched
            && v.document.matched_with == Some(counterpart.id)
    });
    if mutual {
        if entry.id < counterpart.id {
            return Ok(Some(counterpart));
        }
        info!(entry_id = %entry.id, "mutual claim, deferring to counterpart");
        return Ok(None);
    }

    warn!(entry_id = %entry.id, "own entry changed during pairing");
    if let Some(v) = lobby.get(counterpart.id).await? {
        let mut released = v.document;
        released.reset_to_waiting();
        if lobby
            .update(counterpart.id, v.version, &released)
            .await
            .is_err()
        {
            warn!(counterpart_id = %counterpart.id, "could not release claimed counterpart");
        }
    }
    Ok(None)
}

/// Materializes the duel for a completed pairing and deletes both
/// entries. Idempotent: entries already removed mean a prior
/// materialization won, and their deletion is a no-op.
async fn materialize(
    entry: &LobbyEntry,
    counterpart: &LobbyEntry,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
    lobby: &dyn LobbyRepository,
    duels: &dyn DuelRepository,
    wizards: &dyn WizardRepository,
) -> Result<Duel, DomainError> {
    let first = wizards.require(counterpart.wizard_id).await?.document;
    let second = wizards.require(entry.wizard_id).await?.document;

    let join_code = alphanumeric_token(rng, 6);
    let duel = Duel::matched(
        Uuid::new_v4(),
        (first.id, counterpart.actor, first.name),
        (second.id, entry.actor, second.name),
        entry.duel_type.round_limit(),
        join_code,
        clock,
    );
    duels.insert(duel.id, &duel).await?;
    info!(duel_id = %duel.id, "duel materialized from lobby pairing");

    for id in [counterpart.id, entry.id] {
        if let Some(v) = lobby.get(id).await? {
            lobby.remove(id, v.version).await?;
        }
    }
    Ok(duel)
}

/// Handles `LeaveLobby`: removes the caller's entry. A `Matched` entry
/// first resets its counterpart to `Waiting`; no duel is created from the
/// abandoned pairing.
///
/// # Errors
///
/// Returns `NotQueued` if the actor has no live entry, or a repository
/// error.
pub async fn handle_leave(
    command: &LeaveLobby,
    lobby: &dyn LobbyRepository,
) -> Result<(), DomainError> {
    let versioned = lobby
        .find_by_actor(command.actor)
        .await?
        .ok_or(ValidationError::NotQueued)?;
    let entry = versioned.document;

    if entry.status == EntryStatus::Matched {
        if let Some(counterpart_id) = entry.matched_with {
            if let Some(Versioned { document, version }) = lobby.get(counterpart_id).await? {
                let mut counterpart = document;
                counterpart.reset_to_waiting();
                lobby.update(counterpart_id, version, &counterpart).await?;
            }
        }
    }

    lobby.remove(entry.id, versioned.version).await?;
    info!(entry_id = %entry.id, "left lobby");
    Ok(())
}
