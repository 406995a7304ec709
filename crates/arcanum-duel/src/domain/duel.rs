//! The Duel aggregate: per-duel lifecycle coordinating a sequence of
//! rounds.
//!
//! Rounds are embedded in the duel document so that every round mutation
//! is a single atomic document swap against the store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arcanum_core::clock::Clock;
use arcanum_core::controller::Controller;
use arcanum_core::error::{DomainError, ValidationError};
use arcanum_core::rng::DeterministicRng;

use super::outcome::{ProposedDeltas, RoundOutcome, check_terminal, resolve_deltas};

/// How a duel ends: after a fixed number of rounds, or only on a
/// health-zero event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundLimit {
    /// The duel ends after this many rounds (unless a knockout ends it
    /// earlier).
    Best {
        /// The round count; positive.
        rounds: u32,
    },
    /// The duel continues until a participant reaches zero health.
    ToTheDeath,
}

impl RoundLimit {
    /// Convenience constructor used throughout tests and handlers.
    #[must_use]
    pub const fn best(rounds: u32) -> Self {
        Self::Best { rounds }
    }


    /// Fixed round count, if any.
    #[must_use]
    pub fn rounds(&self) -> Option<u32> {
        match self {
            Self::Best { rounds } => Some(*rounds),
            Self::ToTheDeath => None,
        }
    }
}

/// Duel lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelStatus {
    /// Created by invite; waiting for the second participant.
    AwaitingParticipants,
    /// Both participants present; rounds in progress.
    Active,
    /// Terminal: winners recorded.
    Resolved,
    /// Terminal: administratively aborted.
    Aborted,
}

/// Round lifecycle states. No transition skips a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Accepting action submissions (and undos).
    AwaitingActions,
    /// Both actions in; narration dispatched; no further submissions.
    Resolving,
    /// Outcome stored; immutable.
    Resolved,
}

/// One of the two wizards engaged in the duel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// The wizard fighting.
    pub wizard_id: Uuid,
    /// Who controls the wizard.
    pub controller: Controller,
    /// Display name, carried for narration context.
    pub name: String,
    /// Current health, always in `[0, 100]`.
    pub health: u32,
    /// Cumulative score; unbounded above.
    pub score: u32,
    /// Action pool for scripted opponents; empty for humans.
    #[serde(default)]
    pub script: Vec<String>,
}

impl Participant {
    fn human(wizard_id: Uuid, actor: Uuid, name: String) -> Self {
        Self {
            wizard_id,
            controller: Controller::Human { actor },
            name,
            health: super::bounds::MAX_HEALTH,
            score: 0,
            script: Vec::new(),
        }
    }
}

/// One simultaneous-action exchange within a duel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Round index; 0 is the introductory framing round on scripted
    /// battles only.
    pub index: u32,
    /// Current state.
    pub status: RoundStatus,
    /// Submitted actions keyed by wizard id.
    pub submitted: BTreeMap<Uuid, String>,
    /// Wizard ids still owed an action this round.
    pub pending: Vec<Uuid>,
    /// Luck values drawn for the narrator, keyed by wizard id. Context
    /// only; never a state variable.
    pub luck: BTreeMap<Uuid, u32>,
    /// Present iff the round is `Resolved`.
    pub outcome: Option<RoundOutcome>,
    /// When the round entered `Resolving`; drives stuck-round recovery.
    pub resolving_since: Option<DateTime<Utc>>,
}

impl Round {
    fn awaiting(index: u32, pending: Vec<Uuid>) -> Self {
        Self {
            index,
            status: RoundStatus::AwaitingActions,
            submitted: BTreeMap::new(),
            pending,
            luck: BTreeMap::new(),
            outcome: None,
            resolving_since: None,
        }
    }
}

/// Narrative content and proposed deltas handed back by the narration
/// boundary for one round. Deltas are advisory and re-bounded here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedNarration {
    /// Narrative text.
    pub narrative: String,
    /// One-sentence summary.
    pub summary: String,
    /// Illustration prompt, if the collaborator produced one.
    pub illustration_prompt: Option<String>,
    /// Proposed numeric deltas, indexed like the participants.
    pub proposed: ProposedDeltas,
}

/// The aggregate root for a duel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duel {
    /// Document identifier.
    pub id: Uuid,
    /// Current lifecycle state.
    pub status: DuelStatus,
    /// Termination rule.
    pub round_limit: RoundLimit,
    /// One participant while `AwaitingParticipants`, exactly two once
    /// `Active`.
    pub participants: Vec<Participant>,
    /// Index of the round currently in play.
    pub current_round: u32,
    /// All rounds, in order. Retained as history; never truncated.
    pub rounds: Vec<Round>,
    /// Winning wizard ids; set only when `Resolved`. Two entries on a
    /// draw.
    pub winners: Vec<Uuid>,
    /// Short human-shareable join code.
    pub join_code: String,
    /// Whether this is a campaign battle against a scripted opponent.
    pub scripted: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Audit reason recorded by `force_abort`.
    pub abort_reason: Option<String>,
}

/// Luck values are drawn uniformly from this inclusive range.
pub const LUCK_RANGE: (u32, u32) = (1, 10);

impl Duel {
    /// Creates an invite duel awaiting its second participant.
    #[must_use]
    pub fn open(
        id: Uuid,
        wizard_id: Uuid,
        actor: Uuid,
        name: String,
        round_limit: RoundLimit,
        join_code: String,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            id,
            status: DuelStatus::AwaitingParticipants,
            round_limit,
            participants: vec![Participant::human(wizard_id, actor, name)],
            current_round: 0,
            rounds: Vec::new(),
            winners: Vec::new(),
            join_code,
            scripted: false,
            created_at: clock.now(),
            abort_reason: None,
        }
    }

    /// Creates a lobby-materialized duel: both participants present,
    /// immediately `Active`, round 1 awaiting both actions.
    #[must_use]
    pub fn matched(
        id: Uuid,
        first: (Uuid, Uuid, String),
        second: (Uuid, Uuid, String),
        round_limit: RoundLimit,
        join_code: String,
        clock: &dyn Clock,
    ) -> Self {
        let a = Participant::human(first.0, first.1, first.2);
        let b = Participant::human(second.0, second.1, second.2);
        let pending = vec![a.wizard_id, b.wizard_id];
        Self {
            id,
            status: DuelStatus::Active,
            round_limit,
            participants: vec![a, b],
            current_round: 1,
            rounds: vec![Round::awaiting(1, pending)],
            winners: Vec::new(),
            join_code,
            scripted: false,
            created_at: clock.now(),
            abort_reason: None,
        }
    }

    /// Creates a campaign battle against a scripted opponent.
    ///
    /// Round 0 is an already-resolved introductory framing round with zero
    /// deltas; round 1 awaits only the human's action — the scripted
    /// side's action is drawn from its script when resolution triggers.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn scripted_battle(
        id: Uuid,
        human: (Uuid, Uuid, String),
        opponent_wizard_id: Uuid,
        opponent_number: u32,
        opponent_name: String,
        script: Vec<String>,
        intro_narrative: String,
        round_limit: RoundLimit,
        join_code: String,
        clock: &dyn Clock,
    ) -> Self {
        let player = Participant::human(human.0, human.1, human.2);
        let opponent = Participant {
            wizard_id: opponent_wizard_id,
            controller: Controller::Scripted {
                opponent: opponent_number,
            },
            name: opponent_name,
            health: super::bounds::MAX_HEALTH,
            score: 0,
            script,
        };

        let zero = super::outcome::SideOutcome {
            score_delta: 0,
            health_delta: 0,
            health: super::bounds::MAX_HEALTH,
            score: 0,
        };
        let intro = Round {
            index: 0,
            status: RoundStatus::Resolved,
            submitted: BTreeMap::new(),
            pending: Vec::new(),
            luck: BTreeMap::new(),
            outcome: Some(RoundOutcome {
                summary: format!("{} steps into the arena.", opponent.name),
                narrative: intro_narrative,
                illustration_prompt: None,
                sides: [zero, zero],
            }),
            resolving_since: None,
        };
        let first = Round::awaiting(1, vec![player.wizard_id]);

        Self {
            id,
            status: DuelStatus::Active,
            round_limit,
            participants: vec![player, opponent],
            current_round: 1,
            rounds: vec![intro, first],
            winners: Vec::new(),
            join_code,
            scripted: true,
            created_at: clock.now(),
            abort_reason: None,
        }
    }

    /// Attaches the second participant to an invite duel and activates it.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyFull` if both slots are taken, `DuelNotJoinable`
    /// for any state other than `AwaitingParticipants`.
    pub fn join(&mut self, wizard_id: Uuid, actor: Uuid, name: String) -> Result<(), DomainError> {
        if self.participants.len() >= 2 {
            return Err(ValidationError::AlreadyFull.into());
        }
        if self.status != DuelStatus::AwaitingParticipants {
            return Err(ValidationError::DuelNotJoinable.into());
        }

        self.participants
            .push(Participant::human(wizard_id, actor, name));
        self.status = DuelStatus::Active;
        self.current_round = 1;
        let pending = self.wizard_ids();
        self.rounds.push(Round::awaiting(1, pending));
        Ok(())
    }

    /// Both participants' wizard ids, in participant order.
    #[must_use]
    pub fn wizard_ids(&self) -> Vec<Uuid> {
        self.participants.iter().map(|p| p.wizard_id).collect()
    }

    /// Index of the participant controlled by `actor`, if any.
    #[must_use]
    pub fn participant_for_actor(&self, actor: Uuid) -> Option<usize> {
        self.participants
            .iter()
            .position(|p| p.controller.actor() == Some(actor))
    }

    /// The human participant of a scripted battle, if this is one.
    #[must_use]
    pub fn human_participant(&self) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| !p.controller.is_scripted())
    }

    /// The scripted participant, if this is a campaign battle.
    #[must_use]
    pub fn scripted_participant(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.controller.is_scripted())
    }

    fn round_mut(&mut self, index: u32) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.index == index)
    }

    /// The round currently in play, if any.
    #[must_use]
    pub fn current_round_state(&self) -> Option<&Round> {
        let index = self.current_round;
        self.rounds.iter().find(|r| r.index == index)
    }

    /// Submits `actor`'s free-text action for the current round.
    ///
    /// Emptying the pending set is the unique resolution trigger: luck is
    /// drawn for both sides, any scripted participant's action is filled
    /// from its script, and the round flips to `Resolving`. Returns `true`
    /// when that happened and narration should be dispatched.
    ///
    /// # Errors
    ///
    /// `DuelNotActive` if the duel is not `Active`;
    /// `RoundAlreadyResolving` once the round has left `AwaitingActions`;
    /// `NotYourTurn` if the actor is not owed an action this round.
    pub fn submit_action(
        &mut self,
        actor: Uuid,
        text: String,
        clock: &dyn Clock,
        rng: &mut dyn DeterministicRng,
    ) -> Result<bool, DomainError> {
        if self.status != DuelStatus::Active {
            return Err(ValidationError::DuelNotActive.into());
        }
        let wizard_id = self
            .participant_for_actor(actor)
            .map(|i| self.participants[i].wizard_id)
            .ok_or(ValidationError::NotYourTurn)?;

        let index = self.current_round;
        let round = self
            .round_mut(index)
            .ok_or(ValidationError::RoundNotResolving)?;
        if round.status != RoundStatus::AwaitingActions {
            return Err(ValidationError::RoundAlreadyResolving.into());
        }
        let Some(slot) = round.pending.iter().position(|id| *id == wizard_id) else {
            return Err(ValidationError::NotYourTurn.into());
        };

        round.pending.remove(slot);
        round.submitted.insert(wizard_id, text);

        if !round.pending.is_empty() {
            return Ok(false);
        }

        // Second submitter (or sole human on a scripted battle) empties the
        // pending set: draw luck, fill the scripted action, flip to
        // Resolving.
        let scripted: Vec<(Uuid, Vec<String>)> = self
            .participants
            .iter()
            .filter(|p| p.controller.is_scripted())
            .map(|p| (p.wizard_id, p.script.clone()))
            .collect();
        let ids = self.wizard_ids();
        let round = self
            .round_mut(index)
            .ok_or(ValidationError::RoundNotResolving)?;
        for id in ids {
            round
                .luck
                .insert(id, rng.next_u32_range(LUCK_RANGE.0, LUCK_RANGE.1));
        }
        for (wizard_id, script) in scripted {
            if script.is_empty() {
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            let pick = rng.next_u32_range(0, (script.len() - 1) as u32) as usize;
            round.submitted.insert(wizard_id, script[pick].clone());
        }
        round.status = RoundStatus::Resolving;
        round.resolving_since = Some(clock.now());
        Ok(true)
    }

    /// Withdraws `actor`'s submitted action, restoring them to the pending
    /// set.
    ///
    /// # Errors
    ///
    /// `RoundAlreadyResolving` once the round has left `AwaitingActions`;
    /// `ActionNotSubmitted` if the actor has nothing to undo;
    /// `DuelNotActive` outside `Active`.
    pub fn undo_action(&mut self, actor: Uuid) -> Result<(), DomainError> {
        if self.status != DuelStatus::Active {
            return Err(ValidationError::DuelNotActive.into());
        }
        let wizard_id = self
            .participant_for_actor(actor)
            .map(|i| self.participants[i].wizard_id)
            .ok_or(ValidationError::NotYourTurn)?;

        let index = self.current_round;
        let round = self
            .round_mut(index)
            .ok_or(ValidationError::RoundNotResolving)?;
        if round.status != RoundStatus::AwaitingActions {
            return Err(ValidationError::RoundAlreadyResolving.into());
        }
        if round.submitted.remove(&wizard_id).is_none() {
            return Err(ValidationError::ActionNotSubmitted.into());
        }
        round.pending.push(wizard_id);
        Ok(())
    }

    /// Applies a narration result to the round at `round_index`.
    ///
    /// Bounds the proposed deltas, stores the outcome, applies health and
    /// score, runs the terminal check, and either records winners or
    /// appends the next round. Later arrivals for an already-resolved
    /// round are benign no-ops (`Ok(false)`): the first resolution wins.
    ///
    /// # Errors
    ///
    /// `DuelNotActive` when the duel is no longer `Active`.
    pub fn apply_narration(
        &mut self,
        round_index: u32,
        narration: ProposedNarration,
    ) -> Result<bool, DomainError> {
        if self.status != DuelStatus::Active {
            // Aborted or already-resolved duels discard late narrations.
            if self.status == DuelStatus::Aborted {
                return Ok(false);
            }
            if self.status == DuelStatus::Resolved {
                return Ok(false);
            }
            return Err(ValidationError::DuelNotActive.into());
        }
        if round_index != self.current_round {
            return Ok(false);
        }

        let current = [
            (self.participants[0].health, self.participants[0].score),
            (self.participants[1].health, self.participants[1].score),
        ];
        let round = self
            .round_mut(round_index)
            .ok_or(ValidationError::RoundNotResolving)?;
        if round.status != RoundStatus::Resolving {
            return Ok(false);
        }

        let sides = resolve_deltas(current, narration.proposed);
        round.status = RoundStatus::Resolved;
        round.outcome = Some(RoundOutcome {
            narrative: narration.narrative,
            summary: narration.summary,
            illustration_prompt: narration.illustration_prompt,
            sides,
        });

        for (participant, side) in self.participants.iter_mut().zip(sides.iter()) {
            participant.health = side.health;
            participant.score = side.score;
        }

        if let Some(verdict) = check_terminal(self.round_limit, round_index, &sides) {
            self.status = DuelStatus::Resolved;
            self.winners = verdict
                .winners
                .into_iter()
                .map(|i| self.participants[i].wizard_id)
                .collect();
            return Ok(true);
        }

        self.current_round = round_index + 1;
        let pending = match self.human_participant() {
            Some(human) if self.scripted => vec![human.wizard_id],
            _ => self.wizard_ids(),
        };
        self.rounds.push(Round::awaiting(self.current_round, pending));
        Ok(true)
    }

    /// Administrative escape hatch: irreversible, unconditional, and not
    /// subject to participant consent. In-flight round state is discarded
    /// without penalty to either participant.
    ///
    /// # Errors
    ///
    /// `DuelNotActive` when the duel is already `Resolved`.
    pub fn force_abort(&mut self, reason: String) -> Result<(), DomainError> {
        if self.status == DuelStatus::Resolved {
            return Err(ValidationError::DuelNotActive.into());
        }
        self.status = DuelStatus::Aborted;
        self.abort_reason = Some(reason);
        Ok(())
    }
}
