//! Narration dispatch: the queue of rounds awaiting narration and the
//! worker that drains it.
//!
//! Jobs run outside any store transaction. The worker reads the duel
//! fresh, calls the collaborator (falling back on any failure), and
//! applies the result through the duel context. Concurrency conflicts and
//! already-resolved rounds are logged and dropped: the first resolution
//! wins.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use arcanum_campaign::application::command_handlers::{BattleResolved, handle_battle_resolved};
use arcanum_campaign::domain::opponents::opponent;
use arcanum_campaign::domain::repository::CampaignRepository;
use arcanum_core::controller::Controller;
use arcanum_core::error::DomainError;
use arcanum_core::rng::DeterministicRng;
use arcanum_duel::application::command_handlers::{ApplyNarration, handle_apply_narration};
use arcanum_duel::domain::duel::{Duel, DuelStatus, ProposedNarration, RoundStatus};
use arcanum_duel::domain::outcome::ProposedDeltas;
use arcanum_duel::domain::repository::{DuelRepository, WizardRepository};

use crate::client::{NarrationRequest, NarratorClient, ParticipantContext};
use crate::fallback::fallback_narration;

/// A round owed narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrationJob {
    /// The duel whose round needs narration.
    pub duel_id: Uuid,
    /// The round index to narrate.
    pub round_index: u32,
}

/// Sender half of the narration queue. Cheap to clone; one per
/// application state.
#[derive(Debug, Clone)]
pub struct NarrationQueue {
    tx: mpsc::Sender<NarrationJob>,
}

impl NarrationQueue {
    /// Creates a bounded queue, returning the sender and the receiver the
    /// worker drains.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NarrationJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueues a job. A closed queue is logged, not propagated: the
    /// round stays `Resolving` and the reprocess path recovers it.
    pub async fn enqueue(&self, job: NarrationJob) {
        if self.tx.send(job).await.is_err() {
            warn!(duel_id = %job.duel_id, round = job.round_index, "narration queue closed, job dropped");
        }
    }
}

/// The worker that turns queued jobs into resolved rounds.
pub struct NarrationWorker {
    duels: Arc<dyn DuelRepository>,
    wizards: Arc<dyn WizardRepository>,
    campaign: Arc<dyn CampaignRepository>,
    client: Arc<dyn NarratorClient>,
    rng: Box<dyn DeterministicRng>,
}

impl NarrationWorker {
    /// Assembles a worker over the given collaborator and stores.
    #[must_use]
    pub fn new(
        duels: Arc<dyn DuelRepository>,
        wizards: Arc<dyn WizardRepository>,
        campaign: Arc<dyn CampaignRepository>,
        client: Arc<dyn NarratorClient>,
        rng: Box<dyn DeterministicRng>,
    ) -> Self {
        Self {
            duels,
            wizards,
            campaign,
            client,
            rng,
        }
    }

    /// Processes one job end to end.
    ///
    /// # Errors
    ///
    /// Returns repository errors other than concurrency conflicts, which
    /// are dropped because a parallel resolution already won.
    pub async fn process(&mut self, job: NarrationJob) -> Result<(), DomainError> {
        let duel = self.duels.require(job.duel_id).await?.document;

        let Some(round) = duel.rounds.iter().find(|r| r.index == job.round_index) else {
            debug!(duel_id = %job.duel_id, round = job.round_index, "round unknown, job dropped");
            return Ok(());
        };
        if round.status != RoundStatus::Resolving {
            debug!(duel_id = %job.duel_id, round = job.round_index, "round no longer resolving, job dropped");
            return Ok(());
        }

        let request = self.build_request(&duel, job.round_index).await?;
        let response = match self.client.narrate(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(duel_id = %job.duel_id, error = %err, "collaborator failed, using fallback narration");
                fallback_narration(&request, self.rng.as_mut())
            }
        };

        let narration = ProposedNarration {
            narrative: response.narrative,
            summary: response.summary,
            illustration_prompt: response.illustration_prompt,
            proposed: ProposedDeltas {
                score_a: response.sides[0].score_delta,
                health_a: response.sides[0].health_delta,
                score_b: response.sides[1].score_delta,
                health_b: response.sides[1].health_delta,
            },
        };
        let command = ApplyNarration {
            duel_id: job.duel_id,
            round_index: job.round_index,
            narration,
        };
        let applied = match handle_apply_narration(&command, self.duels.as_ref()).await {
            Ok(applied) => applied,
            Err(DomainError::ConcurrencyConflict { .. }) => {
                warn!(duel_id = %job.duel_id, round = job.round_index, "lost the resolution race, job dropped");
                return Ok(());
            }
            Err(other) => return Err(other),
        };
        if !applied {
            debug!(duel_id = %job.duel_id, round = job.round_index, "round already resolved elsewhere");
            return Ok(());
        }

        self.notify_campaign_if_terminal(job.duel_id).await
    }

    /// Builds the collaborator request from a fresh read of the duel.
    async fn build_request(
        &self,
        duel: &Duel,
        round_index: u32,
    ) -> Result<NarrationRequest, DomainError> {
        let round = duel
            .rounds
            .iter()
            .find(|r| r.index == round_index)
            .ok_or(DomainError::DocumentNotFound(duel.id))?;

        let history: Vec<String> = duel
            .rounds
            .iter()
            .filter(|r| r.index < round_index)
            .filter_map(|r| r.outcome.as_ref().map(|o| o.summary.clone()))
            .collect();

        let mut participants = Vec::with_capacity(2);
        for p in &duel.participants {
            let appearance = match p.controller {
                Controller::Human { .. } => self
                    .wizards
                    .get(p.wizard_id)
                    .await?
                    .map(|v| v.document.appearance)
                    .unwrap_or_default(),
                Controller::Scripted { .. } => String::new(),
            };

            let mut luck = round.luck.get(&p.wizard_id).copied().unwrap_or(1);
            match p.controller {
                Controller::Human { actor } => {
                    if duel.scripted {
                        if let Some(progress) =
                            self.campaign.find_by_wizard(actor, p.wizard_id).await?
                        {
                            luck = progress.document.effective_luck(luck);
                        }
                    }
                }
                Controller::Scripted { opponent: number } => {
                    if let Ok(foe) = opponent(number) {
                        luck = biased_luck(luck, foe.luck_bias);
                    }
                }
            }

            participants.push(ParticipantContext {
                name: p.name.clone(),
                appearance,
                health: p.health,
                score: p.score,
                action: round
                    .submitted
                    .get(&p.wizard_id)
                    .cloned()
                    .unwrap_or_default(),
                luck,
            });
        }
        let participants: [ParticipantContext; 2] = participants
            .try_into()
            .map_err(|_| DomainError::Infrastructure("duel without two participants".to_owned()))?;

        Ok(NarrationRequest {
            round_index,
            history,
            participants,
        })
    }

    /// After a terminal scripted battle, reports the human's win or loss
    /// to the campaign context. Duplicate reports are absorbed there.
    async fn notify_campaign_if_terminal(&self, duel_id: Uuid) -> Result<(), DomainError> {
        let duel = self.duels.require(duel_id).await?.document;
        if duel.status != DuelStatus::Resolved || !duel.scripted {
            return Ok(());
        }
        let (Some(human), Some(foe)) = (duel.human_participant(), duel.scripted_participant())
        else {
            return Ok(());
        };
        let Controller::Human { actor } = human.controller else {
            return Ok(());
        };
        let Controller::Scripted { opponent } = foe.controller else {
            return Ok(());
        };

        let won = duel.winners.contains(&human.wizard_id);
        let advanced = handle_battle_resolved(
            &BattleResolved {
                actor,
                wizard_id: human.wizard_id,
                opponent_number: opponent,
                won,
            },
            self.campaign.as_ref(),
        )
        .await?;
        info!(duel_id = %duel.id, opponent, won, advanced, "campaign notified of battle result");
        Ok(())
    }
}

/// Shifts a base luck roll by a scripted opponent's temperament bias,
/// kept inside the 1..=10 roll range.
fn biased_luck(base: u32, bias: i32) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let shifted = (i64::from(base) + i64::from(bias)).clamp(1, 10) as u32;
    shifted
}

/// Drains the queue until every sender is dropped. Job failures are
/// logged; the worker keeps going.
pub async fn run_worker(mut worker: NarrationWorker, mut rx: mpsc::Receiver<NarrationJob>) {
    while let Some(job) = rx.recv().await {
        if let Err(err) = worker.process(job).await {
            warn!(duel_id = %job.duel_id, round = job.round_index, error = %err, "narration job failed");
        }
    }
    info!("narration queue closed, worker stopping");
}
