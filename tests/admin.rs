mod common;

use common::{json_body, spawn_app};
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_category_slug_must_be_unique_and_well_formed() {
    let app = spawn_app().await;
    app.create_category("Icons", "icons").await;

    let duplicate = app
        .authed(Method::POST, "/admin/categories/", &app.admin_token)
        .json(&json!({ "name": "More icons", "slug": "icons" }))
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let malformed = app
        .authed(Method::POST, "/admin/categories/", &app.admin_token)
        .json(&json!({ "name": "Spaced", "slug": "has spaces" }))
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_bounds_are_validated() {
    let app = spawn_app().await;
    let category = app.create_category("Icons", "icons").await;

    for payload in [
        json!({ "name": "x", "slug": "neg", "category": category, "price": -1.0,
                "image": "https://cdn.example.com/x.png", "author": "a" }),
        json!({ "name": "x", "slug": "rated", "category": category, "price": 1.0,
                "image": "https://cdn.example.com/x.png", "author": "a", "rating": 5.5 }),
        json!({ "name": "x", "slug": "no-image", "category": category, "price": 1.0,
                "image": "not a url", "author": "a" }),
        json!({ "name": "x", "slug": "orphan", "category": 9999, "price": 1.0,
                "image": "https://cdn.example.com/x.png", "author": "a" }),
    ] {
        let response = app
            .authed(Method::POST, "/admin/products/", &app.admin_token)
            .json(&payload)
            .send()
            .await
            .expect("Failed to create product");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
    }

    let list = json_body(app.get("/products/").send().await.unwrap()).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_patch_product_detaches_style_with_null() {
    let app = spawn_app().await;
    let category = app.create_category("Icons", "icons").await;
    let style = app.create_style("Flat", "flat").await;
    let product = app
        .create_product("flat-icons", category, 5.0, json!({ "style": style }))
        .await;
    let path = format!("/admin/products/{product}/");

    let renamed = app
        .authed(Method::PATCH, &path, &app.admin_token)
        .json(&json!({ "name": "Renamed" }))
        .send()
        .await
        .expect("Failed to patch product");
    assert_eq!(renamed.status(), StatusCode::OK);
    let body = json_body(renamed).await;
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["style"], style);

    let detached = app
        .authed(Method::PATCH, &path, &app.admin_token)
        .json(&json!({ "style": null }))
        .send()
        .await
        .expect("Failed to patch product");
    assert_eq!(detached.status(), StatusCode::OK);
    assert!(json_body(detached).await["style"].is_null());
}

#[tokio::test]
async fn test_patch_and_delete_unknown_ids_are_not_found() {
    let app = spawn_app().await;

    let response = app
        .authed(Method::PATCH, "/admin/styles/42/", &app.admin_token)
        .json(&json!({ "name": "Ghost" }))
        .send()
        .await
        .expect("Failed to patch style");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .authed(Method::DELETE, "/admin/products/42/", &app.admin_token)
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
