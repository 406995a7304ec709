//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A document was not found.
    #[error("document not found: {0}")]
    DocumentNotFound(Uuid),

    /// Optimistic concurrency conflict on a single document.
    #[error("concurrency conflict on document {document_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The document that had the conflict.
        document_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A validation error in domain logic. Rejected synchronously, never
    /// retried, surfaced verbatim to the caller.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

/// Validation failures surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The actor already has a live lobby entry.
    #[error("actor is already queued in the lobby")]
    AlreadyQueued,

    /// The actor has no lobby entry to leave.
    #[error("actor is not queued in the lobby")]
    NotQueued,

    /// The wizard does not belong to the acting player.
    #[error("wizard {wizard_id} is not owned by the caller")]
    WizardNotOwned {
        /// The wizard whose ownership check failed.
        wizard_id: Uuid,
    },

    /// The wizard is already committed to another lobby entry.
    #[error("wizard {wizard_id} is already queued")]
    WizardAlreadyQueued {
        /// The wizard already in the queue.
        wizard_id: Uuid,
    },

    /// The actor is not owed an action this round.
    #[error("it is not this participant's turn to act")]
    NotYourTurn,

    /// Undo requested but no action was submitted by this actor.
    #[error("no submitted action to undo")]
    ActionNotSubmitted,

    /// The round has left `AwaitingActions` and no longer accepts
    /// submissions or undos.
    #[error("round is already resolving")]
    RoundAlreadyResolving,

    /// Resolution or reprocessing requested for a round that is not in
    /// `Resolving`.
    #[error("round is not resolving")]
    RoundNotResolving,

    /// Reprocessing requested before the stuck-round grace period elapsed.
    #[error("round has not been resolving long enough to reprocess")]
    RoundNotStuck,

    /// The duel is not in a state that accepts this operation.
    #[error("duel is not active")]
    DuelNotActive,

    /// The duel cannot accept a joiner.
    #[error("duel is not joinable")]
    DuelNotJoinable,

    /// Both participant slots are already filled.
    #[error("duel is already full")]
    AlreadyFull,

    /// No opponent exists with the given number.
    #[error("unknown campaign opponent: {0}")]
    UnknownOpponent(u32),

    /// Campaign opponents must be fought strictly in order.
    #[error("opponent {attempted} cannot be fought while opponent {current} is next")]
    OpponentOutOfOrder {
        /// The opponent number the caller attempted to fight.
        attempted: u32,
        /// The opponent number that is actually next.
        current: u32,
    },
}
