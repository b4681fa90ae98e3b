//! Common test utilities for E2E tests

use ideaboard::{AppState, config};
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Token secret shared by test servers; long enough to pass validation
pub const TEST_TOKEN_SECRET: &str = "test-secret-key-32-bytes-long!!!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            database: config::DatabaseConfig { path: db_path },
            auth: config::AuthConfig {
                token_secret: TEST_TOKEN_SECRET.to_string(),
                token_max_age: 604800,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = ideaboard::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Register a user through the API, returning the response body
    pub async fn register_user(&self, username: &str, email: &str, password: &str) -> Value {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 201, "registration should succeed");
        response.json().await.unwrap()
    }

    /// Create an idea through the API, returning the response body
    pub async fn create_idea(&self, token: &str, text: &str) -> Value {
        let response = self
            .client
            .post(self.url("/ideas"))
            .header("Authorization", format!("Bearer {}", token))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 201, "idea creation should succeed");
        response.json().await.unwrap()
    }
}
