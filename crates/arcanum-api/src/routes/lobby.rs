//! Routes for the Lobby & Matchmaking context.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use arcanum_core::error::DomainError;
use arcanum_duel::domain::duel::Duel;
use arcanum_lobby::application::command_handlers::{
    JoinLobby, LeaveLobby, handle_join, handle_leave,
};
use arcanum_lobby::application::query_handlers;
use arcanum_lobby::domain::entry::{DuelType, LobbyEntry};

use crate::error::ApiError;
use crate::extract::ActorId;
use crate::state::AppState;

/// Request body for POST /api/v1/lobby/join.
#[derive(Debug, Deserialize)]
pub struct JoinLobbyRequest {
    /// The wizard to commit to the queue.
    pub wizard_id: Uuid,
    /// The kind of duel to queue for.
    pub duel_type: DuelType,
}

/// Response body for a lobby join.
#[derive(Debug, Serialize)]
pub struct JoinLobbyResponse {
    /// The caller's entry.
    pub entry: LobbyEntry,
    /// The duel created by this join, if pairing completed.
    pub duel: Option<Duel>,
}

/// POST /api/v1/lobby/join
#[instrument(skip(state, request), fields(wizard_id = %request.wizard_id))]
async fn join_lobby(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(request): Json<JoinLobbyRequest>,
) -> Result<Json<JoinLobbyResponse>, ApiError> {
    let command = JoinLobby {
        actor,
        wizard_id: request.wizard_id,
        duel_type: request.duel_type,
    };
    let mut rng = state.rng.lock().await;
    let outcome = handle_join(
        &command,
        state.clock.as_ref(),
        &mut **rng,
        state.lobby.as_ref(),
        state.duels.as_ref(),
        state.wizards.as_ref(),
    )
    .await?;
    Ok(Json(JoinLobbyResponse {
        entry: outcome.entry,
        duel: outcome.duel,
    }))
}

/// POST /api/v1/lobby/leave
#[instrument(skip(state))]
async fn leave_lobby(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
) -> Result<StatusCode, ApiError> {
    handle_leave(&LeaveLobby { actor }, state.lobby.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/lobby/entry
#[instrument(skip(state))]
async fn get_entry(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
) -> Result<Json<LobbyEntry>, ApiError> {
    let entry = query_handlers::get_entry(state.lobby.as_ref(), actor)
        .await?
        .ok_or(DomainError::DocumentNotFound(actor))?;
    Ok(Json(entry))
}

/// Returns the router for the lobby context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/join", post(join_lobby))
        .route("/leave", post(leave_lobby))
        .route("/entry", get(get_entry))
}
