//! Routes for wizard profiles.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use arcanum_duel::application::command_handlers::{CreateWizard, handle_create_wizard};
use arcanum_duel::application::query_handlers;
use arcanum_duel::domain::wizard::Wizard;

use crate::error::ApiError;
use crate::extract::ActorId;
use crate::state::AppState;

/// Request body for POST /api/v1/wizards.
#[derive(Debug, Deserialize)]
pub struct CreateWizardRequest {
    /// Display name.
    pub name: String,
    /// Free-text appearance description.
    pub appearance: String,
}

/// POST /api/v1/wizards
#[instrument(skip(state, request))]
async fn create_wizard(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(request): Json<CreateWizardRequest>,
) -> Result<Json<Wizard>, ApiError> {
    let command = CreateWizard {
        actor,
        name: request.name,
        appearance: request.appearance,
    };
    let wizard = handle_create_wizard(&command, state.wizards.as_ref()).await?;
    Ok(Json(wizard))
}

/// GET /api/v1/wizards — the caller's wizards.
#[instrument(skip(state))]
async fn list_wizards(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
) -> Result<Json<Vec<Wizard>>, ApiError> {
    let wizards = query_handlers::list_wizards(state.wizards.as_ref(), actor).await?;
    Ok(Json(wizards))
}

/// GET /api/v1/wizards/{id}
#[instrument(skip(state))]
async fn get_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Wizard>, ApiError> {
    let wizard = query_handlers::get_wizard(state.wizards.as_ref(), id).await?;
    Ok(Json(wizard))
}

/// Returns the router for wizard profiles.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wizards).post(create_wizard))
        .route("/{id}", get(get_wizard))
}
