//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! backed by an in-memory persistence backend, so API tests need neither a
//! filesystem nor a hosted file service.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ticketdesk_core::{
    auth::hash_password,
    config::{AdminCredentialsConfig, ServerConfig, StorageConfig, TicketsConfig},
    create_authenticator,
    testing::MockBackend,
    AuthConfig, AuthMethod, Authenticator, Config, RequiredField, TicketStore,
};

/// Re-export fixtures for test convenience
pub use ticketdesk_core::testing::fixtures;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// Test fixture for API testing with a mock backend.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_ticket_creation() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/tickets", json!({
///         "title": "Build dashboard", ...
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock backend - inspect writes, inject failures
    pub backend: Arc<MockBackend>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Raw body, for non-JSON responses.
    pub text: String,
    pub content_type: Option<String>,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Require admin credentials for edits
    pub admin_auth: bool,
    /// Fields that must be filled in on submission
    pub required_fields: Vec<RequiredField>,
    /// CSV the backend starts with
    pub initial_content: Option<Vec<u8>>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            admin_auth: true,
            required_fields: RequiredField::ALL.to_vec(),
            initial_content: None,
        }
    }
}

impl TestConfig {
    /// Create config with open editing (auth method "none").
    pub fn open_editing() -> Self {
        Self {
            admin_auth: false,
            ..Default::default()
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with admin auth and an empty backend.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let backend = Arc::new(match &test_config.initial_content {
            Some(content) => MockBackend::with_content(content),
            None => MockBackend::new(),
        });

        let auth = if test_config.admin_auth {
            AuthConfig {
                method: AuthMethod::Admin,
                admin: Some(AdminCredentialsConfig {
                    username: ADMIN_USER.to_string(),
                    password_sha256: hash_password(ADMIN_PASSWORD),
                }),
            }
        } else {
            AuthConfig {
                method: AuthMethod::None,
                admin: None,
            }
        };

        let config = Config {
            auth,
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            storage: StorageConfig::default(),
            tickets: TicketsConfig {
                required_fields: test_config.required_fields.clone(),
            },
        };

        let authenticator: Arc<dyn Authenticator> = Arc::from(
            create_authenticator(&config.auth).expect("Failed to create authenticator"),
        );

        let store = TicketStore::open(backend.clone(), test_config.required_fields)
            .await
            .expect("Failed to open store")
            .with_clock(fixtures::fixed_clock(2024, 6, 1));

        let state = Arc::new(ticketdesk_server::state::AppState::new(
            config,
            authenticator,
            store,
        ));

        let router = ticketdesk_server::api::create_router(state);

        Self { router, backend }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    /// Send a POST request with JSON body as the administrator.
    pub async fn post_as_admin(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), Some(admin_header()))
            .await
    }

    /// Send a PUT request with JSON body as the administrator.
    pub async fn put_as_admin(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body), Some(admin_header()))
            .await
    }

    /// Send a PATCH request with JSON body as the administrator.
    pub async fn patch_as_admin(&self, path: &str, body: Value) -> TestResponse {
        self.request("PATCH", path, Some(body), Some(admin_header()))
            .await
    }

    /// Send a request with an explicit Authorization header.
    pub async fn request_with_auth(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        authorization: &str,
    ) -> TestResponse {
        self.request(method, path, body, Some(authorization.to_string()))
            .await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Send a request to the test server.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        authorization: Option<String>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(authorization) = authorization {
            request_builder = request_builder.header("Authorization", authorization);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            body,
            text,
            content_type,
        }
    }
}

/// Basic authorization header for the fixture's administrator.
pub fn admin_header() -> String {
    basic_header(ADMIN_USER, ADMIN_PASSWORD)
}

/// Basic authorization header for arbitrary credentials.
pub fn basic_header(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password)))
}

/// JSON body for a complete submission.
pub fn submission_json(title: &str) -> Value {
    serde_json::json!({
        "name": "A",
        "title": title,
        "description": "x",
        "business_case": "y",
        "priority": "High"
    })
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
