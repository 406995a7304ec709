//! Routes for the Campaign context.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use arcanum_campaign::application::command_handlers::{StartBattle, handle_start_battle};
use arcanum_campaign::application::query_handlers;
use arcanum_campaign::domain::progress::CampaignProgress;
use arcanum_duel::domain::duel::Duel;

use crate::error::ApiError;
use crate::extract::ActorId;
use crate::state::AppState;

/// Request body for POST /api/v1/campaign/battles.
#[derive(Debug, Deserialize)]
pub struct StartBattleRequest {
    /// The wizard climbing the ladder.
    pub wizard_id: Uuid,
    /// The opponent to fight; must be exactly next.
    pub opponent_number: u32,
}

/// Query string for GET /api/v1/campaign/progress.
#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    /// The wizard whose progress to report.
    pub wizard_id: Uuid,
}

/// Public view of a campaign opponent. The action script stays hidden.
#[derive(Debug, Serialize)]
pub struct OpponentView {
    /// Ladder position.
    pub number: u32,
    /// Display name.
    pub name: &'static str,
    /// Honorific.
    pub title: &'static str,
    /// Flavor text.
    pub temperament: &'static str,
    /// Difficulty tier.
    pub difficulty: u32,
}

/// POST /api/v1/campaign/battles
#[instrument(skip(state, request), fields(wizard_id = %request.wizard_id, opponent = request.opponent_number))]
async fn start_battle(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(request): Json<StartBattleRequest>,
) -> Result<Json<Duel>, ApiError> {
    let command = StartBattle {
        actor,
        wizard_id: request.wizard_id,
        opponent_number: request.opponent_number,
    };
    let mut rng = state.rng.lock().await;
    let duel = handle_start_battle(
        &command,
        state.clock.as_ref(),
        &mut **rng,
        state.campaign.as_ref(),
        state.duels.as_ref(),
        state.wizards.as_ref(),
    )
    .await?;
    Ok(Json(duel))
}

/// GET /api/v1/campaign/progress?wizard_id=
#[instrument(skip(state))]
async fn get_progress(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<Option<CampaignProgress>>, ApiError> {
    let progress =
        query_handlers::get_progress(state.campaign.as_ref(), actor, query.wizard_id).await?;
    Ok(Json(progress))
}

/// GET /api/v1/campaign/opponents
#[instrument]
async fn list_opponents() -> Json<Vec<OpponentView>> {
    let roster = query_handlers::opponent_roster()
        .iter()
        .map(|o| OpponentView {
            number: o.number,
            name: o.name,
            title: o.title,
            temperament: o.temperament,
            difficulty: o.difficulty,
        })
        .collect();
    Json(roster)
}

/// Returns the router for the campaign context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/battles", post(start_battle))
        .route("/progress", get(get_progress))
        .route("/opponents", get(list_opponents))
}
