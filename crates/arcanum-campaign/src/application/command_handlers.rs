//! Command handlers for the Campaign context.

use tracing::info;
use uuid::Uuid;

use arcanum_core::clock::Clock;
use arcanum_core::error::{DomainError, ValidationError};
use arcanum_core::rng::{DeterministicRng, alphanumeric_token};

use arcanum_duel::domain::duel::{Duel, RoundLimit};
use arcanum_duel::domain::repository::{DuelRepository, WizardRepository};

use crate::domain::opponents::opponent;
use crate::domain::progress::CampaignProgress;
use crate::domain::repository::CampaignRepository;

/// Round limit applied to every campaign battle.
pub const CAMPAIGN_ROUND_LIMIT: RoundLimit = RoundLimit::Best { rounds: 5 };

/// Command: start the next campaign battle.
#[derive(Debug, Clone)]
pub struct StartBattle {
    /// Acting account.
    pub actor: Uuid,
    /// The wizard climbing the ladder.
    pub wizard_id: Uuid,
    /// The opponent to fight; must equal the wizard's current opponent.
    pub opponent_number: u32,
}

/// Command: record the outcome of a finished campaign battle.
#[derive(Debug, Clone)]
pub struct BattleResolved {
    /// Acting account.
    pub actor: Uuid,
    /// The wizard that fought.
    pub wizard_id: Uuid,
    /// Which opponent was fought.
    pub opponent_number: u32,
    /// Whether the wizard won.
    pub won: bool,
}

async fn load_or_create_progress(
    campaign: &dyn CampaignRepository,
    actor: Uuid,
    wizard_id: Uuid,
) -> Result<CampaignProgress, DomainError> {
    if let Some(existing) = campaign.find_by_wizard(actor, wizard_id).await? {
        return Ok(existing.document);
    }
    let progress = CampaignProgress::new(Uuid::new_v4(), actor, wizard_id);
    campaign.insert(progress.id, &progress).await?;
    info!(wizard_id = %wizard_id, "campaign progress created");
    Ok(progress)
}

/// Handles `StartBattle`: verifies ownership and linear gating, then
/// creates a scripted duel with a resolved introductory round and round 1
/// awaiting the human action only.
///
/// # Errors
///
/// Returns `WizardNotOwned` on ownership mismatch, `UnknownOpponent` past
/// the ladder, `OpponentOutOfOrder` unless the number is exactly next, or
/// a repository error.
pub async fn handle_start_battle(
    command: &StartBattle,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
    campaign: &dyn CampaignRepository,
    duels: &dyn DuelRepository,
    wizards: &dyn WizardRepository,
) -> Result<Duel, DomainError> {
    let wizard = wizards.require(command.wizard_id).await?.document;
    if wizard.owner != command.actor {
        return Err(ValidationError::WizardNotOwned {
            wizard_id: command.wizard_id,
        }
        .into());
    }

    let foe = opponent(command.opponent_number)?;
    let progress = load_or_create_progress(campaign, command.actor, command.wizard_id).await?;
    if command.opponent_number != progress.current_opponent {
        return Err(ValidationError::OpponentOutOfOrder {
            attempted: command.opponent_number,
            current: progress.current_opponent,
        }
        .into());
    }

    let opponent_name = format!("{} {}", foe.name, foe.title);
    let intro = format!(
        "{opponent_name} awaits: {}. The wards hum as the bout is sealed.",
        foe.temperament
    );
    let duel = Duel::scripted_battle(
        Uuid::new_v4(),
        (wizard.id, command.actor, wizard.name),
        Uuid::new_v4(),
        foe.number,
        opponent_name,
        foe.script.iter().map(|s| (*s).to_owned()).collect(),
        intro,
        CAMPAIGN_ROUND_LIMIT,
        alphanumeric_token(rng, 6),
        clock,
    );
    duels.insert(duel.id, &duel).await?;

    info!(duel_id = %duel.id, opponent = foe.number, "campaign battle started");
    Ok(duel)
}

/// Handles `BattleResolved`: applies `record_battle` under optimistic
/// concurrency. Duplicate or stale notifications leave progress
/// unchanged; the returned flag reports whether anything moved.
///
/// # Errors
///
/// Returns a repository error, including `ConcurrencyConflict` when a
/// parallel writer won (safe to retry with a fresh read).
pub async fn handle_battle_resolved(
    command: &BattleResolved,
    campaign: &dyn CampaignRepository,
) -> Result<bool, DomainError> {
    let Some(versioned) = campaign
        .find_by_wizard(command.actor, command.wizard_id)
        .await?
    else {
        return Ok(false);
    };

    let mut progress = versioned.document;
    if !progress.record_battle(command.opponent_number, command.won) {
        return Ok(false);
    }
    campaign
        .update(progress.id, versioned.version, &progress)
        .await?;

    info!(
        wizard_id = %command.wizard_id,
        opponent = command.opponent_number,
        relic = progress.has_relic,
        "campaign progress advanced"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcanum_core::store::DocumentRepository;
    use arcanum_duel::domain::duel::{DuelStatus, RoundStatus};
    use arcanum_duel::domain::wizard::Wizard;
    use crate::testing::InMemoryCampaignRepository;
    use arcanum_duel::testing::{InMemoryDuelRepository, InMemoryWizardRepository};
    use arcanum_test_support::{FixedClock, MockRng};
    use chrono::{TimeZone, Utc};

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap())
    }

    struct Fixture {
        campaign: InMemoryCampaignRepository,
        duels: InMemoryDuelRepository,
        wizards: InMemoryWizardRepository,
        actor: Uuid,
        wizard: Wizard,
    }

    impl Fixture {
        async fn new() -> Self {
            let wizards = InMemoryWizardRepository::default();
            let actor = Uuid::new_v4();
            let wizard = Wizard::new(
                Uuid::new_v4(),
                actor,
                "Morwen".to_owned(),
                "storm-eyed".to_owned(),
            );
            wizards.insert(wizard.id, &wizard).await.unwrap();
            Self {
                campaign: InMemoryCampaignRepository::default(),
                duels: InMemoryDuelRepository::default(),
                wizards,
                actor,
                wizard,
            }
        }

        async fn start(&self, opponent_number: u32) -> Result<Duel, DomainError> {
            handle_start_battle(
                &StartBattle {
                    actor: self.actor,
                    wizard_id: self.wizard.id,
                    opponent_number,
                },
                &fixed_clock(),
                &mut MockRng,
                &self.campaign,
                &self.duels,
                &self.wizards,
            )
            .await
        }

        async fn resolved(&self, opponent_number: u32, won: bool) -> bool {
            handle_battle_resolved(
                &BattleResolved {
                    actor: self.actor,
                    wizard_id: self.wizard.id,
                    opponent_number,
                    won,
                },
                &self.campaign,
            )
            .await
            .unwrap()
        }

        async fn progress(&self) -> CampaignProgress {
            self.campaign
                .find_by_wizard(self.actor, self.wizard.id)
                .await
                .unwrap()
                .unwrap()
                .document
        }
    }

    #[tokio::test]
    async fn test_start_battle_creates_scripted_duel_with_intro_round() {
        let fixture = Fixture::new().await;

        let duel = fixture.start(1).await.unwrap();

        assert!(duel.scripted);
        assert_eq!(duel.status, DuelStatus::Active);
        assert_eq!(duel.rounds[0].status, RoundStatus::Resolved);
        assert_eq!(duel.current_round, 1);
        assert_eq!(duel.current_round_state().unwrap().pending.len(), 1);
        let foe = duel.scripted_participant().unwrap();
        assert!(foe.name.starts_with("Vexil"));
        assert!(!foe.script.is_empty());
    }

    #[tokio::test]
    async fn test_start_battle_gates_strictly_linearly() {
        let fixture = Fixture::new().await;

        let err = fixture.start(3).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::OpponentOutOfOrder {
                attempted: 3,
                current: 1,
            })
        ));
        // Gating rejects without mutating progress.
        assert_eq!(fixture.progress().await.current_opponent, 1);
        assert!(fixture.duels.all().is_empty());
    }

    #[tokio::test]
    async fn test_start_battle_unknown_opponent() {
        let fixture = Fixture::new().await;

        let err = fixture.start(99).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::UnknownOpponent(99))
        ));
    }

    #[tokio::test]
    async fn test_win_advances_and_duplicate_notification_is_ignored() {
        let fixture = Fixture::new().await;
        fixture.start(1).await.unwrap();

        assert!(fixture.resolved(1, true).await);
        assert!(!fixture.resolved(1, true).await);

        let progress = fixture.progress().await;
        assert_eq!(progress.current_opponent, 2);
        assert_eq!(progress.defeated, vec![1]);
    }

    #[tokio::test]
    async fn test_loss_allows_retry_of_same_opponent() {
        let fixture = Fixture::new().await;
        fixture.start(1).await.unwrap();

        assert!(!fixture.resolved(1, false).await);

        assert_eq!(fixture.progress().await.current_opponent, 1);
        fixture.start(1).await.unwrap();
    }

    #[tokio::test]
    async fn test_clearing_the_ladder_awards_relic() {
        let fixture = Fixture::new().await;

        for number in 1..=crate::domain::opponents::FINAL_OPPONENT {
            fixture.start(number).await.unwrap();
            assert!(fixture.resolved(number, true).await);
        }

        let progress = fixture.progress().await;
        assert!(progress.has_relic);
        assert!(progress.is_complete());
        assert_eq!(progress.effective_luck(5), 6);

        // No further battles once complete.
        let err = fixture.start(7).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::OpponentOutOfOrder { .. })
        ));
    }
}
