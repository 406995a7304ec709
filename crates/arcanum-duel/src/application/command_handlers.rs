//! Command handlers for the Duel & Round context.
//!
//! Each handler follows the same shape: load the versioned document,
//! execute domain logic, and persist with an optimistic version check. A
//! losing version check surfaces as `ConcurrencyConflict` and the caller
//! re-reads before retrying.

use chrono::Duration;
use tracing::info;
use uuid::Uuid;

use arcanum_core::clock::Clock;
use arcanum_core::error::{DomainError, ValidationError};
use arcanum_core::rng::{DeterministicRng, alphanumeric_token};

use crate::domain::duel::{Duel, ProposedNarration, RoundLimit, RoundStatus};
use crate::domain::repository::{DuelRepository, WizardRepository};
use crate::domain::wizard::Wizard;

/// Length of generated join codes.
pub const JOIN_CODE_LENGTH: usize = 6;

/// How many collision retries join-code generation gets before giving up.
const JOIN_CODE_ATTEMPTS: usize = 8;

/// How long a round may sit in `Resolving` before reprocessing is allowed.
pub const STUCK_ROUND_GRACE_SECONDS: i64 = 120;

/// Command: create a wizard profile for the acting account.
#[derive(Debug, Clone)]
pub struct CreateWizard {
    /// Acting account.
    pub actor: Uuid,
    /// Display name.
    pub name: String,
    /// Free-text appearance description.
    pub appearance: String,
}

/// Command: create an invite duel hosted by one wizard.
#[derive(Debug, Clone)]
pub struct CreateDuel {
    /// Acting account.
    pub actor: Uuid,
    /// The host's wizard.
    pub wizard_id: Uuid,
    /// Termination rule for the duel.
    pub round_limit: RoundLimit,
}

/// Command: join an invite duel by its code.
#[derive(Debug, Clone)]
pub struct JoinByCode {
    /// Acting account.
    pub actor: Uuid,
    /// The joiner's wizard.
    pub wizard_id: Uuid,
    /// The join code shared by the host.
    pub join_code: String,
}

/// Command: submit a free-text action for the current round.
#[derive(Debug, Clone)]
pub struct SubmitAction {
    /// Acting account.
    pub actor: Uuid,
    /// Target duel.
    pub duel_id: Uuid,
    /// The action text.
    pub action: String,
}

/// Command: withdraw a submitted action.
#[derive(Debug, Clone)]
pub struct UndoAction {
    /// Acting account.
    pub actor: Uuid,
    /// Target duel.
    pub duel_id: Uuid,
}

/// Command: apply a narration result to a resolving round.
#[derive(Debug, Clone)]
pub struct ApplyNarration {
    /// Target duel.
    pub duel_id: Uuid,
    /// The round the narration was produced for.
    pub round_index: u32,
    /// Narrative content and proposed deltas.
    pub narration: ProposedNarration,
}

/// Command: administratively abort a duel.
#[derive(Debug, Clone)]
pub struct ForceAbort {
    /// Target duel.
    pub duel_id: Uuid,
    /// Audit reason.
    pub reason: String,
}

/// Command: re-dispatch narration for a round stuck in `Resolving`.
#[derive(Debug, Clone)]
pub struct ReprocessRound {
    /// Target duel.
    pub duel_id: Uuid,
    /// The round expected to be stuck.
    pub round_index: u32,
}

/// A narration dispatch owed after a round flipped to `Resolving`.
///
/// The duel context does not talk to the narrator directly; handlers
/// return this marker and the caller enqueues the work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrationDue {
    /// The duel whose round needs narration.
    pub duel_id: Uuid,
    /// The round index to narrate.
    pub round_index: u32,
}

async fn owned_wizard(
    wizards: &dyn WizardRepository,
    actor: Uuid,
    wizard_id: Uuid,
) -> Result<Wizard, DomainError> {
    let wizard = wizards.require(wizard_id).await?.document;
    if wizard.owner != actor {
        return Err(ValidationError::WizardNotOwned { wizard_id }.into());
    }
    Ok(wizard)
}

/// Generates a join code that no live duel currently uses.
async fn fresh_join_code(
    duels: &dyn DuelRepository,
    rng: &mut dyn DeterministicRng,
) -> Result<String, DomainError> {
    for _ in 0..JOIN_CODE_ATTEMPTS {
        let code = alphanumeric_token(rng, JOIN_CODE_LENGTH);
        if duels.find_by_join_code(&code).await?.is_none() {
            return Ok(code);
        }
    }
    Err(DomainError::Infrastructure(
        "exhausted join code generation attempts".to_owned(),
    ))
}

/// Handles `CreateWizard`: inserts a new wizard profile.
///
/// # Errors
///
/// Returns a repository error on storage failure.
pub async fn handle_create_wizard(
    command: &CreateWizard,
    wizards: &dyn WizardRepository,
) -> Result<Wizard, DomainError> {
    let wizard = Wizard::new(
        Uuid::new_v4(),
        command.actor,
        command.name.clone(),
        command.appearance.clone(),
    );
    wizards.insert(wizard.id, &wizard).await?;
    info!(wizard_id = %wizard.id, "wizard created");
    Ok(wizard)
}

/// Handles `CreateDuel`: verifies wizard ownership, generates a join code,
/// and inserts a duel awaiting its second participant.
///
/// # Errors
///
/// Returns `WizardNotOwned` if the wizard belongs to someone else, or a
/// repository error.
pub async fn handle_create_duel(
    command: &CreateDuel,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
    duels: &dyn DuelRepository,
    wizards: &dyn WizardRepository,
) -> Result<Duel, DomainError> {
    let wizard = owned_wizard(wizards, command.actor, command.wizard_id).await?;
    let join_code = fresh_join_code(duels, rng).await?;

    let duel = Duel::open(
        Uuid::new_v4(),
        wizard.id,
        command.actor,
        wizard.name,
        command.round_limit,
        join_code,
        clock,
    );
    duels.insert(duel.id, &duel).await?;

    info!(duel_id = %duel.id, join_code = %duel.join_code, "duel created");
    Ok(duel)
}

/// Handles `JoinByCode`: attaches the second participant and activates the
/// duel.
///
/// # Errors
///
/// Returns `DocumentNotFound` for an unknown code, `AlreadyFull` or
/// `DuelNotJoinable` from the aggregate, `WizardNotOwned` on an ownership
/// mismatch.
pub async fn handle_join_by_code(
    command: &JoinByCode,
    duels: &dyn DuelRepository,
    wizards: &dyn WizardRepository,
) -> Result<Duel, DomainError> {
    let wizard = owned_wizard(wizards, command.actor, command.wizard_id).await?;

    let versioned = duels
        .find_by_join_code(&command.join_code)
        .await?
        .ok_or(DomainError::DocumentNotFound(Uuid::nil()))?;
    let mut duel = versioned.document;

    duel.join(wizard.id, command.actor, wizard.name)?;
    duels.update(duel.id, versioned.version, &duel).await?;

    info!(duel_id = %duel.id, "second participant joined");
    Ok(duel)
}

/// Handles `SubmitAction`. Returns `Some(NarrationDue)` when this
/// submission emptied the pending set and the round flipped to
/// `Resolving`.
///
/// # Errors
///
/// Returns the aggregate's validation errors (`NotYourTurn`,
/// `RoundAlreadyResolving`, `DuelNotActive`) or a repository error.
pub async fn handle_submit_action(
    command: &SubmitAction,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
    duels: &dyn DuelRepository,
) -> Result<Option<NarrationDue>, DomainError> {
    let versioned = duels.require(command.duel_id).await?;
    let mut duel = versioned.document;

    let dispatched = duel.submit_action(command.actor, command.action.clone(), clock, rng)?;
    duels.update(duel.id, versioned.version, &duel).await?;

    if dispatched {
        info!(duel_id = %duel.id, round = duel.current_round, "round resolving, narration due");
        return Ok(Some(NarrationDue {
            duel_id: duel.id,
            round_index: duel.current_round,
        }));
    }
    Ok(None)
}

/// Handles `UndoAction`: withdraws the actor's action while the round is
/// still `AwaitingActions`.
///
/// # Errors
///
/// Returns `ActionNotSubmitted` or `RoundAlreadyResolving` from the
/// aggregate, or a repository error.
pub async fn handle_undo_action(
    command: &UndoAction,
    duels: &dyn DuelRepository,
) -> Result<Duel, DomainError> {
    let versioned = duels.require(command.duel_id).await?;
    let mut duel = versioned.document;

    duel.undo_action(command.actor)?;
    duels.update(duel.id, versioned.version, &duel).await?;
    Ok(duel)
}

/// Handles `ApplyNarration`: bounds the deltas, resolves the round, and
/// advances or finishes the duel. Duplicate or late narrations are benign
/// no-ops; the returned flag is `true` only for the winning application.
///
/// # Errors
///
/// Returns a repository error, or `ConcurrencyConflict` if another writer
/// won the version race (the caller may re-read and retry).
pub async fn handle_apply_narration(
    command: &ApplyNarration,
    duels: &dyn DuelRepository,
) -> Result<bool, DomainError> {
    let versioned = duels.require(command.duel_id).await?;
    let mut duel = versioned.document;

    let applied = duel.apply_narration(command.round_index, command.narration.clone())?;
    if !applied {
        return Ok(false);
    }
    duels.update(duel.id, versioned.version, &duel).await?;

    info!(
        duel_id = %duel.id,
        round = command.round_index,
        status = ?duel.status,
        "narration applied"
    );
    Ok(true)
}

/// Handles `ForceAbort`: the administrative escape hatch.
///
/// # Errors
///
/// Returns `DuelNotActive` if the duel already resolved, or a repository
/// error.
pub async fn handle_force_abort(
    command: &ForceAbort,
    duels: &dyn DuelRepository,
) -> Result<Duel, DomainError> {
    let versioned = duels.require(command.duel_id).await?;
    let mut duel = versioned.document;

    duel.force_abort(command.reason.clone())?;
    duels.update(duel.id, versioned.version, &duel).await?;

    info!(duel_id = %duel.id, reason = %command.reason, "duel aborted");
    Ok(duel)
}

/// Handles `ReprocessRound`: validates that the round has been stuck in
/// `Resolving` past the grace period and hands back a fresh
/// `NarrationDue` for re-dispatch. Idempotent at resolution time because
/// `apply_narration` discards everything after the first result.
///
/// # Errors
///
/// Returns `RoundNotResolving` if the round is not resolving,
/// `RoundNotStuck` inside the grace period, or a repository error.
pub async fn handle_reprocess_round(
    command: &ReprocessRound,
    clock: &dyn Clock,
    duels: &dyn DuelRepository,
) -> Result<NarrationDue, DomainError> {
    let duel = duels.require(command.duel_id).await?.document;

    let round = duel
        .rounds
        .iter()
        .find(|r| r.index == command.round_index)
        .ok_or(ValidationError::RoundNotResolving)?;
    if round.status != RoundStatus::Resolving {
        return Err(ValidationError::RoundNotResolving.into());
    }
    let since = round
        .resolving_since
        .ok_or(ValidationError::RoundNotResolving)?;
    if clock.now() - since < Duration::seconds(STUCK_ROUND_GRACE_SECONDS) {
        return Err(ValidationError::RoundNotStuck.into());
    }

    info!(duel_id = %duel.id, round = command.round_index, "reprocessing stuck round");
    Ok(NarrationDue {
        duel_id: duel.id,
        round_index: command.round_index,
    })
}

/// Scans for active duels whose current round has sat in `Resolving`
/// past the grace period and returns a re-dispatch for each. The
/// background sweep calls this periodically so a crashed narration run
/// recovers without a player-issued reprocess.
///
/// # Errors
///
/// Returns a repository error on storage failure.
pub async fn handle_sweep_stuck_rounds(
    clock: &dyn Clock,
    duels: &dyn DuelRepository,
) -> Result<Vec<NarrationDue>, DomainError> {
    let cutoff = clock.now() - Duration::seconds(STUCK_ROUND_GRACE_SECONDS);
    let stuck = duels.find_stuck(cutoff).await?;

    let due: Vec<NarrationDue> = stuck
        .into_iter()
        .map(|v| NarrationDue {
            duel_id: v.document.id,
            round_index: v.document.current_round,
        })
        .collect();
    if !due.is_empty() {
        info!(count = due.len(), "stuck rounds found by sweep");
    }
    Ok(due)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryDuelRepository, InMemoryWizardRepository};
    use arcanum_core::store::DocumentRepository;
    use arcanum_test_support::{FixedClock, MockRng};
    use chrono::{TimeZone, Utc};

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap())
    }

    async fn seed_wizard(wizards: &InMemoryWizardRepository, owner: Uuid, name: &str) -> Wizard {
        let wizard = Wizard::new(Uuid::new_v4(), owner, name.to_owned(), "robed".to_owned());
        wizards.insert(wizard.id, &wizard).await.unwrap();
        wizard
    }

    #[tokio::test]
    async fn test_create_duel_generates_code_and_awaits_participant() {
        let duels = InMemoryDuelRepository::default();
        let wizards = InMemoryWizardRepository::default();
        let actor = Uuid::new_v4();
        let wizard = seed_wizard(&wizards, actor, "Morwen").await;

        let duel = handle_create_duel(
            &CreateDuel {
                actor,
                wizard_id: wizard.id,
                round_limit: RoundLimit::best(3),
            },
            &fixed_clock(),
            &mut MockRng,
            &duels,
            &wizards,
        )
        .await
        .unwrap();

        assert_eq!(duel.join_code.len(), JOIN_CODE_LENGTH);
        assert_eq!(duel.participants.len(), 1);
        let stored = duels.require(duel.id).await.unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.document, duel);
    }

    #[tokio::test]
    async fn test_create_duel_rejects_foreign_wizard() {
        let duels = InMemoryDuelRepository::default();
        let wizards = InMemoryWizardRepository::default();
        let owner = Uuid::new_v4();
        let wizard = seed_wizard(&wizards, owner, "Morwen").await;

        let err = handle_create_duel(
            &CreateDuel {
                actor: Uuid::new_v4(),
                wizard_id: wizard.id,
                round_limit: RoundLimit::best(3),
            },
            &fixed_clock(),
            &mut MockRng,
            &duels,
            &wizards,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::WizardNotOwned { .. })
        ));
    }

    #[tokio::test]
    async fn test_join_by_code_activates_duel() {
        let duels = InMemoryDuelRepository::default();
        let wizards = InMemoryWizardRepository::default();
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let host_wizard = seed_wizard(&wizards, host, "Morwen").await;
        let guest_wizard = seed_wizard(&wizards, guest, "Thalor").await;

        let created = handle_create_duel(
            &CreateDuel {
                actor: host,
                wizard_id: host_wizard.id,
                round_limit: RoundLimit::best(3),
            },
            &fixed_clock(),
            &mut MockRng,
            &duels,
            &wizards,
        )
        .await
        .unwrap();

        let joined = handle_join_by_code(
            &JoinByCode {
                actor: guest,
                wizard_id: guest_wizard.id,
                join_code: created.join_code.clone(),
            },
            &duels,
            &wizards,
        )
        .await
        .unwrap();

        assert_eq!(joined.participants.len(), 2);
        assert_eq!(joined.current_round, 1);
    }

    #[tokio::test]
    async fn test_join_with_unknown_code_is_not_found() {
        let duels = InMemoryDuelRepository::default();
        let wizards = InMemoryWizardRepository::default();
        let guest = Uuid::new_v4();
        let wizard = seed_wizard(&wizards, guest, "Thalor").await;

        let err = handle_join_by_code(
            &JoinByCode {
                actor: guest,
                wizard_id: wizard.id,
                join_code: "NOPE42".to_owned(),
            },
            &duels,
            &wizards,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DomainError::DocumentNotFound(_)));
    }

    async fn active_duel(
        duels: &InMemoryDuelRepository,
        wizards: &InMemoryWizardRepository,
    ) -> (Duel, Uuid, Uuid) {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let host_wizard = seed_wizard(wizards, host, "Morwen").await;
        let guest_wizard = seed_wizard(wizards, guest, "Thalor").await;
        let created = handle_create_duel(
            &CreateDuel {
                actor: host,
                wizard_id: host_wizard.id,
                round_limit: RoundLimit::best(3),
            },
            &fixed_clock(),
            &mut MockRng,
            duels,
            wizards,
        )
        .await
        .unwrap();
        let duel = handle_join_by_code(
            &JoinByCode {
                actor: guest,
                wizard_id: guest_wizard.id,
                join_code: created.join_code,
            },
            duels,
            wizards,
        )
        .await
        .unwrap();
        (duel, host, guest)
    }

    #[tokio::test]
    async fn test_submit_actions_dispatches_on_second_submission() {
        let duels = InMemoryDuelRepository::default();
        let wizards = InMemoryWizardRepository::default();
        let (duel, host, guest) = active_duel(&duels, &wizards).await;

        let first = handle_submit_action(
            &SubmitAction {
                actor: host,
                duel_id: duel.id,
                action: "flame lash".to_owned(),
            },
            &fixed_clock(),
            &mut MockRng,
            &duels,
        )
        .await
        .unwrap();
        assert!(first.is_none());

        let second = handle_submit_action(
            &SubmitAction {
                actor: guest,
                duel_id: duel.id,
                action: "mirror ward".to_owned(),
            },
            &fixed_clock(),
            &mut MockRng,
            &duels,
        )
        .await
        .unwrap();

        assert_eq!(
            second,
            Some(NarrationDue {
                duel_id: duel.id,
                round_index: 1,
            })
        );
    }

    #[tokio::test]
    async fn test_apply_narration_duplicate_is_noop() {
        let duels = InMemoryDuelRepository::default();
        let wizards = InMemoryWizardRepository::default();
        let (duel, host, guest) = active_duel(&duels, &wizards).await;
        for (actor, action) in [(host, "bolt"), (guest, "shield")] {
            handle_submit_action(
                &SubmitAction {
                    actor,
                    duel_id: duel.id,
                    action: action.to_owned(),
                },
                &fixed_clock(),
                &mut MockRng,
                &duels,
            )
            .await
            .unwrap();
        }

        let narration = ProposedNarration {
            narrative: "The bolt splashes off the shield.".to_owned(),
            summary: "A deflected bolt.".to_owned(),
            illustration_prompt: None,
            proposed: crate::domain::outcome::ProposedDeltas {
                score_a: 3,
                health_a: 0,
                score_b: 5,
                health_b: -8,
            },
        };
        let command = ApplyNarration {
            duel_id: duel.id,
            round_index: 1,
            narration,
        };

        let first = handle_apply_narration(&command, &duels).await.unwrap();
        let second = handle_apply_narration(&command, &duels).await.unwrap();

        assert!(first);
        assert!(!second);
        let stored = duels.require(duel.id).await.unwrap().document;
        assert_eq!(stored.current_round, 2);
        assert_eq!(stored.participants[1].health, 92);
    }

    #[tokio::test]
    async fn test_reprocess_round_respects_grace_period() {
        let duels = InMemoryDuelRepository::default();
        let wizards = InMemoryWizardRepository::default();
        let (duel, host, guest) = active_duel(&duels, &wizards).await;
        for (actor, action) in [(host, "bolt"), (guest, "shield")] {
            handle_submit_action(
                &SubmitAction {
                    actor,
                    duel_id: duel.id,
                    action: action.to_owned(),
                },
                &fixed_clock(),
                &mut MockRng,
                &duels,
            )
            .await
            .unwrap();
        }
        let command = ReprocessRound {
            duel_id: duel.id,
            round_index: 1,
        };

        // Too early: still inside the grace period.
        let err = handle_reprocess_round(&command, &fixed_clock(), &duels)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::RoundNotStuck)
        ));

        // Past the grace period the dispatch is reissued.
        let later = FixedClock(
            fixed_clock().0 + Duration::seconds(STUCK_ROUND_GRACE_SECONDS + 1),
        );
        let due = handle_reprocess_round(&command, &later, &duels)
            .await
            .unwrap();
        assert_eq!(due.round_index, 1);
    }

    #[tokio::test]
    async fn test_sweep_finds_only_rounds_past_the_grace_period() {
        let duels = InMemoryDuelRepository::default();
        let wizards = InMemoryWizardRepository::default();
        let (stalled, host, guest) = active_duel(&duels, &wizards).await;
        for (actor, action) in [(host, "bolt"), (guest, "shield")] {
            handle_submit_action(
                &SubmitAction {
                    actor,
                    duel_id: stalled.id,
                    action: action.to_owned(),
                },
                &fixed_clock(),
                &mut MockRng,
                &duels,
            )
            .await
            .unwrap();
        }
        // A second duel still awaiting actions must not be swept.
        let waiting = Duel::matched(
            Uuid::new_v4(),
            (Uuid::new_v4(), Uuid::new_v4(), "Aldra".to_owned()),
            (Uuid::new_v4(), Uuid::new_v4(), "Belric".to_owned()),
            RoundLimit::best(3),
            "ZZYY99".to_owned(),
            &fixed_clock(),
        );
        duels.insert(waiting.id, &waiting).await.unwrap();

        // Inside the grace period the sweep stays quiet.
        let quiet = handle_sweep_stuck_rounds(&fixed_clock(), &duels)
            .await
            .unwrap();
        assert!(quiet.is_empty());

        let later = FixedClock(
            fixed_clock().0 + Duration::seconds(STUCK_ROUND_GRACE_SECONDS + 1),
        );
        let due = handle_sweep_stuck_rounds(&later, &duels).await.unwrap();

        assert_eq!(
            due,
            vec![NarrationDue {
                duel_id: stalled.id,
                round_index: 1,
            }]
        );
        assert!(due.iter().all(|d| d.duel_id != waiting.id));
    }

    #[tokio::test]
    async fn test_force_abort_records_reason() {
        let duels = InMemoryDuelRepository::default();
        let wizards = InMemoryWizardRepository::default();
        let (duel, _, _) = active_duel(&duels, &wizards).await;

        let aborted = handle_force_abort(
            &ForceAbort {
                duel_id: duel.id,
                reason: "stalled pairing".to_owned(),
            },
            &duels,
        )
        .await
        .unwrap();

        assert_eq!(aborted.abort_reason.as_deref(), Some("stalled pairing"));
    }
}
