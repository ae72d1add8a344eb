use crate::config::GatewayConfig;
use crate::create_app;
use crate::state::AppState;
use crate::store::{InMemoryStore, ResourceStore};
use axum::body::{Body, Bytes};
use axum::Router;
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use hydra_client::{AdminType, HydraAdmin, MockAdmin};
use log::LevelFilter;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::MockServer;

/// Test fixture for setting up a complete test environment with mocked services.
///
/// The TestFixture provides a convenient way to test API endpoints with mock backends for
/// the authorization server's public and admin interfaces. It sets up both mock servers,
/// configures the gateway against them, and provides helper methods for making requests.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     // Create a new test fixture with mock servers
///     let fixture = TestFixture::new().await;
///
///     // Set up a mock admin response
///     Mock::given(matchers::method("GET"))
///         .and(matchers::path("/admin/oauth2/auth/requests/login"))
///         .respond_with(ResponseTemplate::new(200)
///             .set_body_json(json!({ "challenge": "abc", "skip": false })))
///         .mount(&fixture.hydra_admin_mock)
///         .await;
///
///     // Send a request to the API
///     let response = fixture.get("/api/oauth/login?login_challenge=abc").await;
///
///     // Verify the response
///     response.assert_ok();
///     assert_eq!(response.json()["data"]["challenge"], "abc");
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration settings
    pub config: GatewayConfig,
    /// Resource store behind the scoped API, shared with the router
    pub store: Arc<InMemoryStore>,
    /// Mock server for the public interface
    pub hydra_public_mock: MockServer,
    /// Mock server for the admin interface
    pub hydra_admin_mock: MockServer,
    /// Scripted admin binding, when the fixture was built with one
    mock_admin: Option<MockAdmin>,
}

impl TestFixture {
    /// Creates a new test fixture with mock servers for both interfaces.
    ///
    /// This method sets up:
    /// - Mock servers for the public and admin interfaces
    /// - Gateway configuration pointing at the mock servers
    /// - The application router with an HTTP admin binding and an empty store
    pub async fn new() -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let hydra_public_mock = MockServer::start().await;
        let hydra_admin_mock = MockServer::start().await;
        let config = GatewayConfig::for_test_with_mocks(&hydra_public_mock, &hydra_admin_mock);

        Self::with_config(config, hydra_public_mock, hydra_admin_mock).await
    }

    /// Creates a fixture from an explicit configuration and mock servers.
    ///
    /// Use this when a test needs to tweak the configuration, e.g. a short health check
    /// timeout, before the router is built.
    pub async fn with_config(
        config: GatewayConfig,
        hydra_public_mock: MockServer,
        hydra_admin_mock: MockServer,
    ) -> Self {
        Self::setup_logger(LevelFilter::Debug);
        let store = Arc::new(InMemoryStore::new());
        let app = Self::build_app(&config, None, store.clone()).await;

        Self {
            app,
            config,
            store,
            hydra_public_mock,
            hydra_admin_mock,
            mock_admin: None,
        }
    }

    /// Creates a fixture whose admin calls go to a scripted [`MockAdmin`].
    ///
    /// The public interface is still a wiremock server, so proxy routes remain usable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let admin = MockAdmin::default().with_token("tok", introspected);
    /// let fixture = TestFixture::with_mock_admin(admin.clone()).await;
    ///
    /// let response = fixture.get_with_auth("/api/oauth/userinfo", Some("Bearer tok")).await;
    /// assert_eq!(admin.calls().len(), 1);
    /// ```
    pub async fn with_mock_admin(admin: MockAdmin) -> Self {
        let mut fixture = Self::new().await;
        fixture.mock_admin = Some(admin);
        fixture.rebuild().await
    }

    /// Rebuilds the router from the current `config`, keeping mocks and store.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let mut fixture = TestFixture::new().await;
    /// fixture.config.hydra.enabled = false;
    /// let fixture = fixture.rebuild().await;
    /// ```
    pub async fn rebuild(mut self) -> Self {
        self.app = Self::build_app(&self.config, self.mock_admin.clone(), self.store.clone()).await;
        self
    }

    async fn build_app(
        config: &GatewayConfig,
        mock_admin: Option<MockAdmin>,
        store: Arc<InMemoryStore>,
    ) -> Router {
        let store: Arc<dyn ResourceStore> = store;
        let state = match mock_admin {
            Some(admin) => AppState::with_admin(config, AdminType::Mock(admin), store)
                .expect("Failed to create test state"),
            None => {
                let admin = HydraAdmin::new(&config.hydra.admin_url, config.hydra.admin_timeout())
                    .expect("Failed to create admin client");
                AppState::with_admin(config, AdminType::Hydra(admin), store)
                    .expect("Failed to create test state")
            }
        };
        create_app(state).await
    }

    /// Initializes the test logger with customized settings.
    ///
    /// Only the first call in a test binary takes effect.
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// Creates a request builder with pre-configured headers.
    ///
    /// The request builder includes standard headers:
    /// - Authorization: Bearer token using the flow API key
    /// - Content-Type: application/json
    pub fn request_builder(&self, method: Method, uri: impl AsRef<str>) -> http::request::Builder {
        let auth = format!("Bearer {}", self.config.flows.api_key);
        self.request_builder_with_auth(method, uri, Some(&auth))
    }

    /// Creates a request builder with the given `Authorization` value, or none at all.
    pub fn request_builder_with_auth(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        auth: Option<&str>,
    ) -> http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri.as_ref());
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        builder.header("Content-Type", "application/json")
    }

    /// Sends a GET request authenticated with the flow API key.
    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a POST request with a JSON body, authenticated with the flow API key.
    pub async fn post<T: Serialize>(&self, uri: impl AsRef<str>, body: &T) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder(Method::POST, uri)
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a GET request with the given `Authorization` value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// // Access token issued by the authorization server
    /// let response = fixture.get_with_auth("/api/oauth/balance", Some("Bearer tok")).await;
    ///
    /// // No credentials at all
    /// let response = fixture.get_with_auth("/api/oauth/balance", None).await;
    /// response.assert_status(StatusCode::UNAUTHORIZED);
    /// ```
    pub async fn get_with_auth(&self, uri: impl AsRef<str>, auth: Option<&str>) -> TestResponse {
        let request = self
            .request_builder_with_auth(Method::GET, uri, auth)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a POST request with a JSON body and the given `Authorization` value.
    pub async fn post_with_auth<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        body: &T,
        auth: Option<&str>,
    ) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder_with_auth(Method::POST, uri, auth)
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a DELETE request with the given `Authorization` value.
    pub async fn delete_with_auth(&self, uri: impl AsRef<str>, auth: Option<&str>) -> TestResponse {
        let request = self
            .request_builder_with_auth(Method::DELETE, uri, auth)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request and returns a TestResponse.
    ///
    /// This is a lower-level method that is used by the convenience methods
    /// like `get()` and `post()`. Use this method when you need more control
    /// over the request details, e.g. custom `Host` or forwarding headers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let request = fixture.request_builder(Method::GET, "/oauth2/auth")
    ///     .header("host", "app.example.com")
    ///     .body(Body::empty())
    ///     .expect("Failed to build request");
    ///
    /// let response = fixture.send(request).await;
    /// response.assert_status(StatusCode::FOUND);
    /// ```
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        TestResponse {
            status,
            headers,
            body,
            json,
        }
    }
}

/// Response from a test request that provides convenient access to status, headers and body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers, repeated values included
    pub headers: HeaderMap,
    /// Raw response body
    pub body: Bytes,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Asserts that the response status is OK (200).
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Asserts that header `name` has exactly the value `expected`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// response.assert_header("location", "https://app.example.com/oauth/login?challenge=abc");
    /// ```
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let actual = self.headers.get(name).and_then(|v| v.to_str().ok());
        assert_eq!(actual, Some(expected), "Unexpected value for header {}", name);
        self
    }

    /// The parsed JSON body, `{}` when the body was empty or not JSON
    pub fn json(&self) -> &Value {
        &self.json
    }

    /// The body as text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
