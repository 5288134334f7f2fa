mod common;

use common::{json_body, spawn_app, ADMIN_USERNAME};
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_register_validates_payload() {
    let app = spawn_app().await;

    let mismatch = app
        .client
        .post(app.url("/register/"))
        .json(&json!({
            "username": "newbie",
            "email": "newbie@example.com",
            "password": "Password123",
            "password2": "Password321",
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);

    let bad_email = app
        .client
        .post(app.url("/register/"))
        .json(&json!({
            "username": "newbie",
            "email": "newbie",
            "password": "Password123",
            "password2": "Password123",
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/register/"))
        .json(&json!({
            "username": ADMIN_USERNAME,
            "email": "someone@example.com",
            "password": "Password123",
            "password2": "Password123",
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = spawn_app().await;
    app.user_token("member").await;

    let response = app
        .client
        .post(app.url("/login/"))
        .json(&json!({ "username": "member", "password": "WrongPass999" }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn test_user_routes_require_token() {
    let app = spawn_app().await;

    for path in ["/favorites/", "/cart/", "/cart/total/", "/orders/"] {
        let response = app.get(path).send().await.expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
    }

    let response = app
        .client
        .post(app.url("/orders/"))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_regular_users() {
    let app = spawn_app().await;
    let token = app.user_token("member").await;

    let response = app
        .authed(Method::POST, "/admin/categories/", &token)
        .json(&json!({ "name": "Icons", "slug": "icons" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .client
        .post(app.url("/admin/categories/"))
        .json(&json!({ "name": "Icons", "slug": "icons" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/categories/").send().await.expect("Failed to send request");
    assert_eq!(json_body(response).await["count"], 0);
}
