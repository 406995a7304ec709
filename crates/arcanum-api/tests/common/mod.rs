//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use arcanum_core::clock::{Clock, SystemClock};
use arcanum_core::rng::{DeterministicRng, ThreadRandom};
use arcanum_narrator::client::DisabledNarrator;
use arcanum_narrator::dispatch::{NarrationQueue, NarrationWorker, run_worker};
use arcanum_campaign::testing::InMemoryCampaignRepository;
use arcanum_duel::testing::{InMemoryDuelRepository, InMemoryWizardRepository};
use arcanum_lobby::testing::InMemoryLobbyRepository;

use arcanum_api::routes;
use arcanum_api::state::AppState;

/// Builds the full app router over in-memory repositories, with a
/// narration worker running on fallback narration. The same route
/// structure as `main.rs`.
pub fn build_test_app() -> Router {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rng: Arc<Mutex<Box<dyn DeterministicRng>>> = Arc::new(Mutex::new(Box::new(ThreadRandom)));

    let wizards = Arc::new(InMemoryWizardRepository::default());
    let duels = Arc::new(InMemoryDuelRepository::default());
    let lobby = Arc::new(InMemoryLobbyRepository::default());
    let campaign = Arc::new(InMemoryCampaignRepository::default());

    let (narrations, jobs) = NarrationQueue::channel(64);
    let worker = NarrationWorker::new(
        duels.clone(),
        wizards.clone(),
        campaign.clone(),
        Arc::new(DisabledNarrator),
        Box::new(ThreadRandom),
    );
    tokio::spawn(run_worker(worker, jobs));

    let app_state = AppState::new(clock, rng, wizards, duels, lobby, campaign, narrations);

    Router::new()
        .merge(routes::api_router())
        .with_state(app_state)
}

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    actor: Option<Uuid>,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header("x-actor-id", actor.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body as `actor`.
pub async fn post_json(
    app: Router,
    uri: &str,
    actor: Uuid,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(actor), Some(body)).await
}

/// Send a GET request as `actor`.
pub async fn get_json(app: Router, uri: &str, actor: Uuid) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, Some(actor), None).await
}

/// Send a DELETE request as `actor`.
pub async fn delete_json(app: Router, uri: &str, actor: Uuid) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", uri, Some(actor), None).await
}

/// Send a request without the actor header.
pub async fn send_anonymous(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    send(app, method, uri, None, body).await
}

/// Creates a wizard through the API and returns its id.
pub async fn create_wizard(app: &Router, actor: Uuid, name: &str) -> Uuid {
    let (status, json) = post_json(
        app.clone(),
        "/api/v1/wizards",
        actor,
        &serde_json::json!({ "name": name, "appearance": "robed and watchful" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    Uuid::parse_str(json["id"].as_str().unwrap()).unwrap()
}

/// Polls the duel until `predicate` holds or a short deadline passes.
pub async fn wait_for_duel(
    app: &Router,
    actor: Uuid,
    duel_id: Uuid,
    predicate: impl Fn(&serde_json::Value) -> bool,
) -> serde_json::Value {
    for _ in 0..100 {
        let (status, json) = get_json(app.clone(), &format!("/api/v1/duels/{duel_id}"), actor).await;
        assert_eq!(status, StatusCode::OK);
        if predicate(&json) {
            return json;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("duel {duel_id} never reached the expected state");
}
