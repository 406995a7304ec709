//! Integration tests for wizard routes.

mod common;

use axum::http::StatusCode;
use uuid::Uuid;

#[tokio::test]
async fn test_create_and_list_wizards() {
    let app = common::build_test_app();
    let actor = Uuid::new_v4();

    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/wizards",
        actor,
        &serde_json::json!({ "name": "Morwen", "appearance": "storm-eyed" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Morwen");
    assert_eq!(json["owner"], actor.to_string());

    let (status, json) = common::get_json(app, "/api/v1/wizards", actor).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_listing_only_shows_own_wizards() {
    let app = common::build_test_app();
    let owner = Uuid::new_v4();
    common::create_wizard(&app, owner, "Morwen").await;

    let (status, json) = common::get_json(app, "/api/v1/wizards", Uuid::new_v4()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_wizard_by_id() {
    let app = common::build_test_app();
    let actor = Uuid::new_v4();
    let wizard = common::create_wizard(&app, actor, "Morwen").await;

    let (status, json) =
        common::get_json(app.clone(), &format!("/api/v1/wizards/{wizard}"), actor).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Morwen");

    let (status, json) = common::get_json(
        app,
        &format!("/api/v1/wizards/{}", Uuid::new_v4()),
        actor,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "document_not_found");
}

#[tokio::test]
async fn test_missing_actor_header_is_400() {
    let app = common::build_test_app();

    let (status, json) = common::send_anonymous(
        app,
        "POST",
        "/api/v1/wizards",
        Some(&serde_json::json!({ "name": "Morwen", "appearance": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "actor_required");
}
