//! Common test utilities for inventory service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};

use inventory_core::UserId;
use inventory_service::{create_router, AppState, ServiceConfig, StorageBackend};
use inventory_store::MemoryStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
}

impl TestHarness {
    /// Create a new test harness with a fresh in-memory store.
    pub fn new() -> Self {
        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            storage_backend: StorageBackend::Memory,
            ..ServiceConfig::default()
        };

        let state = AppState::new(Arc::new(MemoryStore::new()), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            test_user_id: UserId::generate(),
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.test_user_id)
    }

    /// Register a location.
    pub async fn add_location(&self, name: &str) {
        let response = self
            .server
            .post("/v1/locations")
            .add_header("authorization", self.user_auth_header())
            .json(&json!({ "name": name }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    /// Register a project.
    pub async fn add_project(&self, name: &str) {
        let response = self
            .server
            .post("/v1/projects")
            .add_header("authorization", self.user_auth_header())
            .json(&json!({ "name": name }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    /// Create an item and return the response body.
    pub async fn create_item(&self, body: Value) -> Value {
        let response = self
            .server
            .post("/v1/items")
            .add_header("authorization", self.user_auth_header())
            .json(&body)
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json()
    }

    /// Fetch the audit log, newest first.
    pub async fn audit_entries(&self, uid: Option<&str>) -> Vec<Value> {
        let path = match uid {
            Some(uid) => format!("/v1/audit?uid={uid}"),
            None => "/v1/audit".to_string(),
        };
        let response = self
            .server
            .get(&path)
            .add_header("authorization", self.user_auth_header())
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["entries"].as_array().cloned().unwrap_or_default()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// The UID month component for items created now.
pub fn current_year_month() -> String {
    inventory_core::YearMonth::now().to_string()
}
