//! Integration tests for Crewdesk.
//!
//! # Running Tests
//!
//! The ignored tests need a running server and a migrated database:
//!
//! ```bash
//! cargo run -p crewdesk-cli -- migrate
//! cargo run -p crewdesk-cli -- user create -e admin@test.local -n Admin -p admin-password -r admin
//! cargo run -p crewdesk-cli -- user create -e worker@test.local -n Worker -p worker-password
//! cargo run -p crewdesk-server &
//! cargo test -p crewdesk-integration-tests -- --ignored
//! ```
//!
//! Override the target with `CREWDESK_TEST_BASE_URL` (defaults to
//! `http://127.0.0.1:4000`).

use reqwest::Client;
use serde_json::Value;

/// Default admin credentials the test setup creates.
pub const ADMIN_EMAIL: &str = "admin@test.local";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Default employee credentials the test setup creates.
pub const EMPLOYEE_EMAIL: &str = "worker@test.local";
pub const EMPLOYEE_PASSWORD: &str = "worker-password";

/// Shared context for tests that talk to a live server.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Build a context pointing at the server under test.
    #[must_use]
    pub fn new() -> Self {
        let base_url = std::env::var("CREWDESK_TEST_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:4000".to_owned());
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Log in and return a bearer token.
    ///
    /// # Panics
    ///
    /// Panics if the login request fails; the tests need the fixture
    /// accounts to exist.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request");
        assert!(
            response.status().is_success(),
            "login failed for {email}: {}",
            response.status()
        );

        let body: Value = response.json().await.expect("login body");
        body["access_token"]
            .as_str()
            .expect("access_token field")
            .to_owned()
    }

    /// POST a JSON body with a bearer token.
    pub async fn post(&self, token: &str, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("request")
    }

    /// PATCH a JSON body with a bearer token.
    pub async fn patch(&self, token: &str, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .patch(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("request")
    }

    /// GET with a bearer token.
    pub async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .expect("request")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
