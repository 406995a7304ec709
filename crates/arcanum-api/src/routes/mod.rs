//! Route modules organized by bounded context.

use axum::Router;

use crate::state::AppState;

pub mod campaign;
pub mod duel;
pub mod health;
pub mod lobby;
pub mod wizard;

/// Assembles every context router under the versioned API prefix.
#[must_use]
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/wizards", wizard::router())
        .nest("/api/v1/lobby", lobby::router())
        .nest("/api/v1/duels", duel::router())
        .nest("/api/v1/campaign", campaign::router())
}
