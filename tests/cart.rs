mod common;

use common::{json_body, spawn_app};
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_get_cart_requires_authentication() {
    let app = spawn_app().await;

    let response = app.get("/cart/").send().await.expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .get("/cart/")
        .bearer_auth("not-a-token")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_adding_same_product_twice_increments_quantity() {
    let app = spawn_app().await;
    let token = app.user_token("buyer").await;
    let category = app.create_category("Icons", "icons").await;
    let product = app.create_product("icon-pack", category, 10.0, json!({})).await;

    let first = app.add_to_cart(&token, product, 1).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = app.add_to_cart(&token, product, 2).await;
    assert_eq!(second.status(), StatusCode::OK);

    let body = json_body(second).await;
    assert_eq!(body["quantity"], 3);
    assert_eq!(body["total_price"].as_f64(), Some(30.0));

    let cart = json_body(
        app.authed(Method::GET, "/cart/", &token)
            .send()
            .await
            .expect("Failed to get cart"),
    )
    .await;
    assert_eq!(cart["count"], 1);
    assert_eq!(cart["results"][0]["quantity"], 3);
    assert_eq!(cart["results"][0]["product"]["id"], product);
}

#[tokio::test]
async fn test_add_rejects_bad_quantity_and_unknown_product() {
    let app = spawn_app().await;
    let token = app.user_token("buyer").await;
    let category = app.create_category("Icons", "icons").await;
    let product = app.create_product("icon-pack", category, 10.0, json!({})).await;

    let response = app.add_to_cart(&token, product, 0).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.add_to_cart(&token, 9999, 1).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let total = json_body(
        app.authed(Method::GET, "/cart/total/", &token)
            .send()
            .await
            .expect("Failed to get total"),
    )
    .await;
    assert_eq!(total["items_count"], 0);
}

#[tokio::test]
async fn test_cart_total_and_clear() {
    let app = spawn_app().await;
    let token = app.user_token("buyer").await;
    let category = app.create_category("Fonts", "fonts").await;
    let a = app.create_product("serif", category, 19.99, json!({})).await;
    let b = app.create_product("sans", category, 5.5, json!({})).await;

    app.add_to_cart(&token, a, 2).await;
    app.add_to_cart(&token, b, 1).await;

    let total = json_body(
        app.authed(Method::GET, "/cart/total/", &token)
            .send()
            .await
            .expect("Failed to get total"),
    )
    .await;
    assert_eq!(total["total"].as_f64(), Some(45.48));
    assert_eq!(total["items_count"], 2);

    let response = app
        .authed(Method::DELETE, "/cart/clear/", &token)
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let total = json_body(
        app.authed(Method::GET, "/cart/total/", &token)
            .send()
            .await
            .expect("Failed to get total"),
    )
    .await;
    assert_eq!(total["total"].as_f64(), Some(0.0));
    assert_eq!(total["items_count"], 0);
}

#[tokio::test]
async fn test_patch_and_delete_cart_item() {
    let app = spawn_app().await;
    let token = app.user_token("buyer").await;
    let category = app.create_category("Icons", "icons").await;
    let product = app.create_product("icon-pack", category, 4.0, json!({})).await;

    let entry = json_body(app.add_to_cart(&token, product, 1).await).await;
    let path = format!("/cart/{}/", entry["id"]);

    let patched = app
        .authed(Method::PATCH, &path, &token)
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .expect("Failed to patch cart item");
    assert_eq!(patched.status(), StatusCode::OK);
    assert_eq!(json_body(patched).await["quantity"], 5);

    let rejected = app
        .authed(Method::PATCH, &path, &token)
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("Failed to patch cart item");
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let deleted = app
        .authed(Method::DELETE, &path, &token)
        .send()
        .await
        .expect("Failed to delete cart item");
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = app
        .authed(Method::GET, &path, &token)
        .send()
        .await
        .expect("Failed to get cart item");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_users_cart_item_is_not_found() {
    let app = spawn_app().await;
    let owner = app.user_token("owner").await;
    let intruder = app.user_token("intruder").await;
    let category = app.create_category("Icons", "icons").await;
    let product = app.create_product("icon-pack", category, 4.0, json!({})).await;

    let entry = json_body(app.add_to_cart(&owner, product, 1).await).await;
    let path = format!("/cart/{}/", entry["id"]);

    for method in [Method::GET, Method::DELETE] {
        let response = app
            .authed(method, &path, &intruder)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let still_there = app
        .authed(Method::GET, &path, &owner)
        .send()
        .await
        .expect("Failed to get cart item");
    assert_eq!(still_there.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cart_line_quantity_is_capped() {
    let app = spawn_app().await;
    let token = app.user_token("buyer").await;
    let category = app.create_category("Icons", "icons").await;
    let product = app.create_product("icon-pack", category, 1.0, json!({})).await;

    let huge = app.add_to_cart(&token, product, i32::MAX as i64).await;
    assert_eq!(huge.status(), StatusCode::BAD_REQUEST);

    let first = app.add_to_cart(&token, product, 9_999).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let entry = json_body(first).await;

    let overflow = app.add_to_cart(&token, product, 2).await;
    assert_eq!(overflow.status(), StatusCode::BAD_REQUEST);

    let patched = app
        .authed(Method::PATCH, &format!("/cart/{}/", entry["id"]), &token)
        .json(&json!({ "quantity": 10_001 }))
        .send()
        .await
        .expect("Failed to patch cart item");
    assert_eq!(patched.status(), StatusCode::BAD_REQUEST);

    let filled = app.add_to_cart(&token, product, 1).await;
    assert_eq!(filled.status(), StatusCode::OK);
    assert_eq!(json_body(filled).await["quantity"], 10_000);

    let cart = app
        .authed(Method::GET, "/cart/", &token)
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(cart.status(), StatusCode::OK);

    let total = json_body(
        app.authed(Method::GET, "/cart/total/", &token)
            .send()
            .await
            .expect("Failed to get total"),
    )
    .await;
    assert_eq!(total["total"].as_f64(), Some(10_000.0));

    let order = app
        .authed(Method::POST, "/orders/", &token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(order.status(), StatusCode::CREATED);
}
