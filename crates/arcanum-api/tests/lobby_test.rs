//! Integration tests for lobby routes.

mod common;

use axum::http::StatusCode;
use uuid::Uuid;

async fn join(
    app: &axum::Router,
    actor: Uuid,
    wizard_id: Uuid,
) -> (StatusCode, serde_json::Value) {
    common::post_json(
        app.clone(),
        "/api/v1/lobby/join",
        actor,
        &serde_json::json!({ "wizard_id": wizard_id, "duel_type": "quick" }),
    )
    .await
}

#[tokio::test]
async fn test_first_joiner_waits_and_second_gets_a_duel() {
    let app = common::build_test_app();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    let alice_wizard = common::create_wizard(&app, alice, "Aldra").await;
    let bob_wizard = common::create_wizard(&app, bob, "Belric").await;

    let (status, json) = join(&app, alice, alice_wizard).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["entry"]["status"], "waiting");
    assert!(json["duel"].is_null());

    let (status, json) = join(&app, bob, bob_wizard).await;
    assert_eq!(status, StatusCode::OK);
    let duel = &json["duel"];
    assert_eq!(duel["status"], "active");
    assert_eq!(duel["current_round"], 1);
    assert_eq!(
        duel["participants"][0]["wizard_id"],
        alice_wizard.to_string()
    );
    assert_eq!(duel["participants"][1]["wizard_id"], bob_wizard.to_string());

    // Both entries were consumed by materialization.
    let (status, _) = common::get_json(app.clone(), "/api/v1/lobby/entry", alice).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_double_join_is_rejected() {
    let app = common::build_test_app();
    let actor = Uuid::new_v4();
    let wizard = common::create_wizard(&app, actor, "Morwen").await;
    join(&app, actor, wizard).await;

    let (status, json) = join(&app, actor, wizard).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_leave_clears_entry() {
    let app = common::build_test_app();
    let actor = Uuid::new_v4();
    let wizard = common::create_wizard(&app, actor, "Morwen").await;
    join(&app, actor, wizard).await;

    let (status, _) =
        common::post_json(app.clone(), "/api/v1/lobby/leave", actor, &serde_json::json!({})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = common::get_json(app, "/api/v1/lobby/entry", actor).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leave_without_entry_is_400() {
    let app = common::build_test_app();

    let (status, _) = common::post_json(
        app,
        "/api/v1/lobby/leave",
        Uuid::new_v4(),
        &serde_json::json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
