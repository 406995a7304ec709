//! Shared application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use arcanum_campaign::domain::repository::CampaignRepository;
use arcanum_core::clock::Clock;
use arcanum_core::rng::DeterministicRng;
use arcanum_duel::domain::repository::{DuelRepository, WizardRepository};
use arcanum_lobby::domain::repository::LobbyRepository;
use arcanum_narrator::dispatch::NarrationQueue;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Random source. Behind an async lock because handlers draw while
    /// awaiting repository calls.
    pub rng: Arc<Mutex<Box<dyn DeterministicRng>>>,
    /// Wizard profiles.
    pub wizards: Arc<dyn WizardRepository>,
    /// Duel documents.
    pub duels: Arc<dyn DuelRepository>,
    /// Lobby entries.
    pub lobby: Arc<dyn LobbyRepository>,
    /// Campaign progress.
    pub campaign: Arc<dyn CampaignRepository>,
    /// Sender half of the narration queue.
    pub narrations: NarrationQueue,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        rng: Arc<Mutex<Box<dyn DeterministicRng>>>,
        wizards: Arc<dyn WizardRepository>,
        duels: Arc<dyn DuelRepository>,
        lobby: Arc<dyn LobbyRepository>,
        campaign: Arc<dyn CampaignRepository>,
        narrations: NarrationQueue,
    ) -> Self {
        Self {
            clock,
            rng,
            wizards,
            duels,
            lobby,
            campaign,
            narrations,
        }
    }
}
