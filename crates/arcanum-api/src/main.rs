//! Arcanum Arena API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use arcanum_api::error::AppError;
use arcanum_api::routes;
use arcanum_api::state::AppState;
use arcanum_core::clock::SystemClock;
use arcanum_core::rng::{DeterministicRng, ThreadRandom};
use arcanum_duel::application::command_handlers::handle_sweep_stuck_rounds;
use arcanum_duel::domain::repository::DuelRepository;
use arcanum_narrator::client::{DisabledNarrator, NarratorClient};
use arcanum_narrator::dispatch::{NarrationJob, NarrationQueue, NarrationWorker, run_worker};
use arcanum_narrator::http::HttpNarrator;
use arcanum_store::pg::{
    PgCampaignRepository, PgDuelRepository, PgLobbyRepository, PgWizardRepository, migrate,
};

/// Depth of the narration queue before submissions back-pressure.
const NARRATION_QUEUE_DEPTH: usize = 256;

/// How often the background sweep re-dispatches stuck rounds.
const SWEEP_INTERVAL_SECS: u64 = 60;

/// Periodically re-enqueues narration for rounds stuck in `Resolving`
/// past the grace period, recovering rounds whose narration run died
/// without a player asking for a reprocess.
async fn run_stuck_round_sweep(duels: Arc<dyn DuelRepository>, narrations: NarrationQueue) {
    let mut ticker = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
    loop {
        ticker.tick().await;
        match handle_sweep_stuck_rounds(&SystemClock, duels.as_ref()).await {
            Ok(due) => {
                for item in due {
                    narrations
                        .enqueue(NarrationJob {
                            duel_id: item.duel_id,
                            round_index: item.round_index,
                        })
                        .await;
                }
            }
            Err(error) => tracing::warn!(%error, "stuck round sweep failed"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("starting arcanum arena api server");

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| AppError::Config("DATABASE_URL environment variable must be set".into()))?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;
    migrate(&pool)
        .await
        .map_err(|e| AppError::Config(format!("schema migration failed: {e}")))?;

    let narrator: Arc<dyn NarratorClient> = match std::env::var("NARRATOR_URL") {
        Ok(endpoint) => {
            let timeout: u64 = std::env::var("NARRATOR_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("NARRATOR_TIMEOUT_SECS: {e}")))?;
            Arc::new(
                HttpNarrator::new(endpoint, Duration::from_secs(timeout))
                    .map_err(|e| AppError::Config(e.to_string()))?,
            )
        }
        Err(_) => {
            tracing::warn!("NARRATOR_URL unset, rounds will use fallback narration");
            Arc::new(DisabledNarrator)
        }
    };

    let wizards = Arc::new(PgWizardRepository::new(pool.clone()));
    let duels = Arc::new(PgDuelRepository::new(pool.clone()));
    let lobby = Arc::new(PgLobbyRepository::new(pool.clone()));
    let campaign = Arc::new(PgCampaignRepository::new(pool.clone()));

    let (narrations, jobs) = NarrationQueue::channel(NARRATION_QUEUE_DEPTH);
    let worker = NarrationWorker::new(
        duels.clone(),
        wizards.clone(),
        campaign.clone(),
        narrator,
        Box::new(ThreadRandom),
    );
    tokio::spawn(run_worker(worker, jobs));
    tokio::spawn(run_stuck_round_sweep(duels.clone(), narrations.clone()));

    let rng: Arc<Mutex<Box<dyn DeterministicRng>>> = Arc::new(Mutex::new(Box::new(ThreadRandom)));
    let app_state = AppState::new(
        Arc::new(SystemClock),
        rng,
        wizards,
        duels,
        lobby,
        campaign,
        narrations,
    );

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::api_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
