#![allow(dead_code)]

use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;
use task_auth::configuration::{HashingSettings, JwtSettings};
use task_auth::startup::{build_auth, run};
use task_auth::store::InMemoryStore;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_ttl(1800).await
}

/// Serves the whole application on a random port over an in-memory store.
pub async fn spawn_app_with_ttl(access_token_expiry: i64) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let jwt = JwtSettings {
        secret: TEST_SECRET.to_string(),
        algorithm: "HS256".to_string(),
        access_token_expiry,
        leeway_seconds: 0,
    };
    let hashing = HashingSettings { cost: 4 };

    let store = Arc::new(InMemoryStore::new());
    let (auth, verifier) =
        build_auth(&jwt, &hashing, store.clone()).expect("Failed to build auth core");
    let server = run(listener, auth, verifier, store).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn signup(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/signup"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Signs up a fresh user and returns an access token for them.
    pub async fn token_for(&self, username: &str) -> String {
        let response = self.signup(username, "pw123").await;
        assert_eq!(response.status().as_u16(), 201);

        let response = self.login(username, "pw123").await;
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }
}
