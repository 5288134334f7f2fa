#![allow(dead_code)]

use marketplace::{
    config::{AdminCredentials, Config},
    create_app,
    entities::{connect, ensure_admin, setup_schema},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "AdminPass123";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub admin_token: String,
}

/// Starts the application on an ephemeral port over a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    let config = Config {
        database_url: "sqlite::memory:".to_owned(),
        // Every pooled sqlite connection would get its own in-memory database.
        database_max_connections: 1,
        bind_addr: "127.0.0.1:0".to_owned(),
        jwt_secret: "test-secret".to_owned(),
        jwt_ttl_hours: 1,
        page_size: 12,
        max_page_size: 100,
        admin: Some(AdminCredentials {
            username: ADMIN_USERNAME.to_owned(),
            email: "admin@example.com".to_owned(),
            password: ADMIN_PASSWORD.to_owned(),
        }),
    };

    let db = connect(&config).await.expect("Failed to connect to database");
    setup_schema(&db).await.expect("Failed to create schema");
    ensure_admin(&db, &config).await.expect("Failed to create admin");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");
    let address = format!("http://{}", listener.local_addr().unwrap());
    let app = create_app(db, config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::new();
    let admin_token = login(&client, &address, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    TestApp {
        address,
        client,
        admin_token,
    }
}

async fn login(client: &Client, address: &str, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{address}/api/login/"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse login body");
    body["token"]
        .as_str()
        .expect("Token not found in login response")
        .to_owned()
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn authed(&self, method: reqwest::Method, path: &str, token: &str) -> RequestBuilder {
        self.client.request(method, self.url(path)).bearer_auth(token)
    }

    /// Registers a regular user and returns a bearer token for them.
    pub async fn user_token(&self, username: &str) -> String {
        let password = "UserPass123";
        let response = self
            .client
            .post(self.url("/register/"))
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": password,
                "password2": password,
            }))
            .send()
            .await
            .expect("Failed to send register request");
        assert_eq!(response.status(), StatusCode::CREATED);

        login(&self.client, &self.address, username, password).await
    }

    async fn admin_post(&self, path: &str, payload: Value) -> Value {
        let response = self
            .authed(reqwest::Method::POST, path, &self.admin_token)
            .json(&payload)
            .send()
            .await
            .expect("Failed to send admin request");
        assert_eq!(response.status(), StatusCode::CREATED, "POST {path}");
        response.json().await.expect("Failed to parse admin response")
    }

    pub async fn create_category(&self, name: &str, slug: &str) -> i64 {
        let body = self
            .admin_post("/admin/categories/", json!({ "name": name, "slug": slug }))
            .await;
        body["id"].as_i64().expect("category id")
    }

    pub async fn create_style(&self, name: &str, slug: &str) -> i64 {
        let body = self
            .admin_post("/admin/styles/", json!({ "name": name, "slug": slug }))
            .await;
        body["id"].as_i64().expect("style id")
    }

    /// Creates a product; `extra` fields override the defaults.
    pub async fn create_product(&self, slug: &str, category: i64, price: f64, extra: Value) -> i64 {
        let mut payload = json!({
            "name": format!("Product {slug}"),
            "slug": slug,
            "description": "A digital asset",
            "category": category,
            "price": price,
            "image": format!("https://cdn.example.com/{slug}.png"),
            "author": "studio",
        });
        if let (Some(target), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                target.insert(key.clone(), value.clone());
            }
        }

        let body = self.admin_post("/admin/products/", payload).await;
        body["id"].as_i64().expect("product id")
    }

    pub async fn add_to_cart(&self, token: &str, product_id: i64, quantity: i64) -> Response {
        self.authed(reqwest::Method::POST, "/cart/", token)
            .json(&json!({ "product_id": product_id, "quantity": quantity }))
            .send()
            .await
            .expect("Failed to send add to cart request")
    }
}

pub async fn json_body(response: Response) -> Value {
    response.json().await.expect("Failed to parse response JSON")
}
