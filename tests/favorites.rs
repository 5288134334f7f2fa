mod common;

use common::{json_body, spawn_app};
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_favoriting_twice_keeps_one_row() {
    let app = spawn_app().await;
    let token = app.user_token("fan").await;
    let category = app.create_category("Brushes", "brushes").await;
    let product = app.create_product("ink-brush", category, 3.0, json!({})).await;

    let first = app
        .authed(Method::POST, "/favorites/", &token)
        .json(&json!({ "product_id": product }))
        .send()
        .await
        .expect("Failed to add favorite");
    assert_eq!(first.status(), StatusCode::CREATED);
    let first_id = json_body(first).await["id"].clone();

    let second = app
        .authed(Method::POST, "/favorites/", &token)
        .json(&json!({ "product_id": product }))
        .send()
        .await
        .expect("Failed to add favorite");
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(json_body(second).await["id"], first_id);

    let list = json_body(
        app.authed(Method::GET, "/favorites/", &token)
            .send()
            .await
            .expect("Failed to list favorites"),
    )
    .await;
    assert_eq!(list["count"], 1);
    assert_eq!(list["results"][0]["product"]["slug"], "ink-brush");
}

#[tokio::test]
async fn test_favorites_are_scoped_to_their_owner() {
    let app = spawn_app().await;
    let owner = app.user_token("owner").await;
    let other = app.user_token("other").await;
    let category = app.create_category("Brushes", "brushes").await;
    let product = app.create_product("ink-brush", category, 3.0, json!({})).await;

    let created = json_body(
        app.authed(Method::POST, "/favorites/", &owner)
            .json(&json!({ "product_id": product }))
            .send()
            .await
            .expect("Failed to add favorite"),
    )
    .await;
    let path = format!("/favorites/{}/", created["id"]);

    let list = json_body(
        app.authed(Method::GET, "/favorites/", &other)
            .send()
            .await
            .expect("Failed to list favorites"),
    )
    .await;
    assert_eq!(list["count"], 0);

    let response = app
        .authed(Method::DELETE, &path, &other)
        .send()
        .await
        .expect("Failed to delete favorite");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .authed(Method::DELETE, &path, &owner)
        .send()
        .await
        .expect("Failed to delete favorite");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_favorite_unknown_product_is_rejected() {
    let app = spawn_app().await;
    let token = app.user_token("fan").await;

    let response = app
        .authed(Method::POST, "/favorites/", &token)
        .json(&json!({ "product_id": 404 }))
        .send()
        .await
        .expect("Failed to add favorite");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
