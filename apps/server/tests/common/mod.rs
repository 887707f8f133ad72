//! Common test utilities for integration tests.
//!
//! Every [`TestContext`] runs over its own in-memory SQLite database with the
//! bundled vocabulary and, unless built with [`TestContext::without_admin`],
//! a seeded admin account.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::{Arc, Mutex};

use axum::http::HeaderValue;
use axum::Router;
use axum_test::TestServer;
use chrono::Utc;
use futures::future::BoxFuture;
use serde_json::Value;

use hsk_core::{accounts, OrderingBank, UserStore, Vocabulary};
use hsk_tutor_server::config::Config;
use hsk_tutor_server::db::SqliteRepository;
use hsk_tutor_server::services::generator::{
    ExerciseGenerator, GenerationError, GenerationResult,
};
use hsk_tutor_server::{app, AppState};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-secret";
pub const PASSWORD: &str = "secret123";

/// Generator returning a fixed document, or failing when `reply` is `None`.
pub struct StubGenerator {
    reply: Option<Value>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn replying(reply: Value) -> Self {
        Self {
            reply: Some(reply),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl ExerciseGenerator for StubGenerator {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        _schema: &'a Value,
    ) -> BoxFuture<'a, GenerationResult<Value>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self.reply.clone();
        Box::pin(async move { reply.ok_or(GenerationError::Empty) })
    }
}

pub struct TestContext {
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// Context without a practice generator.
    pub fn new() -> Self {
        Self::build(None, true)
    }

    pub fn with_generator(generator: Arc<dyn ExerciseGenerator>) -> Self {
        Self::build(Some(generator), true)
    }

    /// Context started without `ADMIN_PASSWORD`, so no admin account exists.
    pub fn without_admin() -> Self {
        Self::build(None, false)
    }

    fn build(generator: Option<Arc<dyn ExerciseGenerator>>, seed_admin: bool) -> Self {
        let repo = SqliteRepository::open_in_memory().expect("Failed to open test database");
        if seed_admin {
            accounts::ensure_admin(&repo, ADMIN_USERNAME, ADMIN_PASSWORD, Utc::now())
                .expect("Failed to seed admin");
        }

        let config = Config {
            admin_username: ADMIN_USERNAME.to_string(),
            admin_password: seed_admin.then(|| ADMIN_PASSWORD.to_string()),
            ..Config::default()
        };
        let vocabulary = Vocabulary::bundled().expect("Bundled vocabulary should parse");
        let ordering = OrderingBank::bundled().expect("Bundled ordering exercises should parse");

        let state = AppState::new(repo, vocabulary, ordering, config, generator);
        let app = app(state.clone());
        Self { state, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).unwrap()
    }

    /// Grant VIP membership directly in the database.
    pub fn make_vip(&self, username: &str, expiry: Option<chrono::NaiveDate>) {
        let repo = self.state.repo().unwrap();
        let mut user = repo.get_user(username).unwrap().expect("user exists");
        user.is_vip = true;
        user.vip_expiry_date = expiry;
        repo.replace_user(username, &user).unwrap();
    }
}

/// `Authorization` header value for a session token.
pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

/// Register `username` with the default password.
pub async fn register(server: &TestServer, username: &str) {
    server
        .post("/api/auth/register")
        .json(&fixtures::registration(username))
        .await
        .assert_status(axum::http::StatusCode::CREATED);
}

/// Log in and return the session token.
pub async fn login(server: &TestServer, identifier: &str, password: &str, device_id: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&fixtures::login(identifier, password, device_id))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

/// Register a fresh user and log them in from `device-1`.
pub async fn user_token(server: &TestServer, username: &str) -> String {
    register(server, username).await;
    login(server, username, PASSWORD, "device-1").await
}

pub async fn admin_token(server: &TestServer) -> String {
    login(server, ADMIN_USERNAME, ADMIN_PASSWORD, "admin-device").await
}
