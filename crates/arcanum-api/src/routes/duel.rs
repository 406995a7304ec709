//! Routes for the Duel & Round context.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use arcanum_duel::application::command_handlers::{
    CreateDuel, ForceAbort, JoinByCode, ReprocessRound, SubmitAction, UndoAction,
    handle_create_duel, handle_force_abort, handle_join_by_code, handle_reprocess_round,
    handle_submit_action, handle_undo_action,
};
use arcanum_duel::application::query_handlers;
use arcanum_duel::domain::duel::{Duel, RoundLimit};
use arcanum_narrator::dispatch::NarrationJob;

use crate::error::ApiError;
use crate::extract::ActorId;
use crate::state::AppState;

/// Request body for POST /api/v1/duels.
#[derive(Debug, Deserialize)]
pub struct CreateDuelRequest {
    /// The host's wizard.
    pub wizard_id: Uuid,
    /// Termination rule for the duel.
    pub round_limit: RoundLimit,
}

/// Request body for POST /api/v1/duels/join.
#[derive(Debug, Deserialize)]
pub struct JoinDuelRequest {
    /// The joiner's wizard.
    pub wizard_id: Uuid,
    /// The code shared by the host.
    pub join_code: String,
}

/// Request body for action submission.
#[derive(Debug, Deserialize)]
pub struct SubmitActionRequest {
    /// Free-text action.
    pub action: String,
}

/// Request body for stuck-round reprocessing.
#[derive(Debug, Deserialize)]
pub struct ReprocessRequest {
    /// The round expected to be stuck in `Resolving`.
    pub round_index: u32,
}

/// Request body for an administrative abort.
#[derive(Debug, Deserialize)]
pub struct AbortRequest {
    /// Audit reason.
    pub reason: String,
}

/// POST /api/v1/duels
#[instrument(skip(state, request), fields(wizard_id = %request.wizard_id))]
async fn create_duel(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(request): Json<CreateDuelRequest>,
) -> Result<Json<Duel>, ApiError> {
    let command = CreateDuel {
        actor,
        wizard_id: request.wizard_id,
        round_limit: request.round_limit,
    };
    let mut rng = state.rng.lock().await;
    let duel = handle_create_duel(
        &command,
        state.clock.as_ref(),
        &mut **rng,
        state.duels.as_ref(),
        state.wizards.as_ref(),
    )
    .await?;
    Ok(Json(duel))
}

/// POST /api/v1/duels/join
#[instrument(skip(state, request), fields(join_code = %request.join_code))]
async fn join_duel(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(request): Json<JoinDuelRequest>,
) -> Result<Json<Duel>, ApiError> {
    let command = JoinByCode {
        actor,
        wizard_id: request.wizard_id,
        join_code: request.join_code,
    };
    let duel =
        handle_join_by_code(&command, state.duels.as_ref(), state.wizards.as_ref()).await?;
    Ok(Json(duel))
}

/// GET /api/v1/duels/{id}
#[instrument(skip(state))]
async fn get_duel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Duel>, ApiError> {
    let duel = query_handlers::get_duel(state.duels.as_ref(), id).await?;
    Ok(Json(duel))
}

/// GET /api/v1/duels/code/{code}
#[instrument(skip(state))]
async fn get_duel_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Duel>, ApiError> {
    let duel = query_handlers::find_duel_by_code(state.duels.as_ref(), &code).await?;
    Ok(Json(duel))
}

/// POST /api/v1/duels/{id}/actions
#[instrument(skip(state, request))]
async fn submit_action(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitActionRequest>,
) -> Result<Json<Duel>, ApiError> {
    let command = SubmitAction {
        actor,
        duel_id: id,
        action: request.action,
    };
    let due = {
        let mut rng = state.rng.lock().await;
        handle_submit_action(
            &command,
            state.clock.as_ref(),
            &mut **rng,
            state.duels.as_ref(),
        )
        .await?
    };
    if let Some(due) = due {
        state
            .narrations
            .enqueue(NarrationJob {
                duel_id: due.duel_id,
                round_index: due.round_index,
            })
            .await;
    }
    let duel = query_handlers::get_duel(state.duels.as_ref(), id).await?;
    Ok(Json(duel))
}

/// DELETE /api/v1/duels/{id}/actions
#[instrument(skip(state))]
async fn undo_action(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<Uuid>,
) -> Result<Json<Duel>, ApiError> {
    let command = UndoAction { actor, duel_id: id };
    let duel = handle_undo_action(&command, state.duels.as_ref()).await?;
    Ok(Json(duel))
}

/// POST /api/v1/duels/{id}/reprocess
#[instrument(skip(state, request))]
async fn reprocess(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReprocessRequest>,
) -> Result<Json<Duel>, ApiError> {
    let command = ReprocessRound {
        duel_id: id,
        round_index: request.round_index,
    };
    let due =
        handle_reprocess_round(&command, state.clock.as_ref(), state.duels.as_ref()).await?;
    state
        .narrations
        .enqueue(NarrationJob {
            duel_id: due.duel_id,
            round_index: due.round_index,
        })
        .await;
    let duel = query_handlers::get_duel(state.duels.as_ref(), id).await?;
    Ok(Json(duel))
}

/// POST /api/v1/duels/{id}/abort
#[instrument(skip(state, request))]
async fn abort(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AbortRequest>,
) -> Result<Json<Duel>, ApiError> {
    info!(duel_id = %id, reason = %request.reason, "administrative abort requested");
    let command = ForceAbort {
        duel_id: id,
        reason: request.reason,
    };
    let duel = handle_force_abort(&command, state.duels.as_ref()).await?;
    Ok(Json(duel))
}

/// Returns the router for the duel context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_duel))
        .route("/join", post(join_duel))
        .route("/{id}", get(get_duel))
        .route("/code/{code}", get(get_duel_by_code))
        .route("/{id}/actions", post(submit_action).delete(undo_action))
        .route("/{id}/reprocess", post(reprocess))
        .route("/{id}/abort", post(abort))
}
