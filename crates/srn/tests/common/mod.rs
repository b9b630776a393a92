//! Test utilities and common setup.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use srn::api::{self, AppState, CorsSettings};
use srn::auth::{CredentialVerifier, Identity};
use srn::db::Database;
use srn::store::Store;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

/// Router over an in-memory database, plus direct access to that database
/// for seeding and inspection.
pub struct TestApp {
    pub router: Router,
    pub db: Database,
    pub verifier: CredentialVerifier,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        let store = Store::new(db.pool().clone());
        let verifier = CredentialVerifier::new(TEST_SECRET);
        let state = AppState::new(store, verifier.clone(), CorsSettings::default());

        Self {
            router: api::create_router(state),
            db,
            verifier,
        }
    }

    /// Valid token for `sub` / `email`.
    pub fn token(&self, sub: &str, email: &str) -> String {
        self.verifier
            .issue(&Identity::new(sub, email), Duration::from_secs(3600))
            .expect("Failed to sign token")
    }

    /// Insert a user row directly, bypassing the API.
    pub async fn seed_user(&self, sub: &str, email: &str, role: &str) {
        sqlx::query("INSERT INTO users (user_id, email, role) VALUES (?, ?, ?)")
            .bind(sub)
            .bind(email)
            .bind(role)
            .execute(self.db.pool())
            .await
            .expect("Failed to seed user");
    }

    pub async fn set_role(&self, sub: &str, role: &str) {
        sqlx::query("UPDATE users SET role = ? WHERE user_id = ?")
            .bind(role)
            .bind(sub)
            .execute(self.db.pool())
            .await
            .expect("Failed to set role");
    }

    pub async fn stored_role(&self, sub: &str) -> Option<String> {
        sqlx::query_scalar("SELECT role FROM users WHERE user_id = ?")
            .bind(sub)
            .fetch_optional(self.db.pool())
            .await
            .expect("Failed to read role")
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to count rows")
    }

    /// Send a request and return the status plus the body. Non-JSON bodies
    /// come back as a JSON string; empty bodies as `null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let authorization = token.map(|token| format!("Bearer {token}"));
        let content_type = body.as_ref().map(|_| "application/json");
        let body = body.map(|json| json.to_string()).unwrap_or_default();

        self.send_raw(method, uri, authorization.as_deref(), content_type, body)
            .await
    }

    /// Send a request with exactly the given `Authorization` and
    /// `Content-Type` headers and raw body.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        content_type: Option<&str>,
        body: String,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(authorization) = authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body)).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }
}
