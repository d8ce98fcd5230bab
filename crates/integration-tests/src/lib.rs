//! Integration test harness for Orderman.
//!
//! Each test spawns the full app in-process on an ephemeral port, backed by
//! an in-memory store repository and a fake BigCommerce API that records
//! every request it receives.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p orderman-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use orderman_app::config::{AppConfig, BigCommerceConfig, LogFormat};
use orderman_app::db::{MemoryStoreRepository, StoreRepository};
use orderman_app::models::Store;
use orderman_app::routes;
use orderman_app::state::AppState;
use orderman_core::StoreHash;
use secrecy::SecretString;
use sha2::Sha256;
use url::Url;

/// Client secret shared by the app under test and [`sign_payload`].
pub const CLIENT_SECRET: &str = "3f9b1c7a0e24d58b6a91fc0d7e3b52a8";

/// Client ID of the app under test.
pub const CLIENT_ID: &str = "orderman-test-client";

/// Public URL the app believes it is served from.
pub const APP_URL: &str = "https://orderman.test";

/// Access token issued by the fake token endpoint unless re-scripted.
pub const ISSUED_TOKEN: &str = "fake-access-token";

// =============================================================================
// Fake BigCommerce
// =============================================================================

/// A request received by the fake BigCommerce API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedRequest {
    /// A header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body decoded as `application/x-www-form-urlencoded`.
    #[must_use]
    pub fn form(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }

    /// The body decoded as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

#[derive(Default)]
struct FakeState {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<HashMap<(Method, String), (StatusCode, String)>>,
}

/// A scripted stand-in for the BigCommerce login service and REST API.
#[derive(Clone)]
pub struct FakeBigCommerce {
    pub url: String,
    state: Arc<FakeState>,
}

impl FakeBigCommerce {
    /// Start the fake on an ephemeral port.
    ///
    /// The token endpoint is pre-scripted to issue [`ISSUED_TOKEN`].
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new().fallback(record).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake BigCommerce");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move { axum::serve(listener, app).await });

        let fake = Self {
            url: format!("http://{addr}"),
            state,
        };
        fake.respond(
            Method::POST,
            "/oauth2/token",
            StatusCode::OK,
            serde_json::json!({
                "access_token": ISSUED_TOKEN,
                "scope": "store_v2_orders",
                "user": {"id": 24654, "username": "merchant", "email": "merchant@example.com"},
                "context": "stores/abc123",
            })
            .to_string(),
        );
        fake
    }

    /// Script the response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: impl Into<String>) {
        self.state
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((method, path.to_string()), (status, body.into()));
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `method path`.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| &r.method == method && r.path == path)
            .collect()
    }
}

async fn record(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri.path().to_string();
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        });

    let (status, body) = state
        .responses
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&(method, path))
        .cloned()
        .unwrap_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                r#"[{"status":404,"message":"No script for this request"}]"#.to_string(),
            )
        });

    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

// =============================================================================
// App under test
// =============================================================================

/// A running app wired to a [`FakeBigCommerce`].
pub struct TestApp {
    pub url: String,
    pub client: reqwest::Client,
    pub stores: Arc<MemoryStoreRepository>,
    pub bigcommerce: FakeBigCommerce,
}

impl TestApp {
    /// Start the app and its fake upstream.
    ///
    /// # Panics
    ///
    /// Panics if a local port cannot be bound.
    pub async fn spawn() -> Self {
        let bigcommerce = FakeBigCommerce::spawn().await;
        let stores = Arc::new(MemoryStoreRepository::new());

        let config = test_config(&bigcommerce.url);
        let state = AppState::new(config, Arc::clone(&stores) as Arc<dyn StoreRepository>);
        let app = routes::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind app");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move { axum::serve(listener, app).await });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            url: format!("http://{addr}"),
            client,
            stores,
            bigcommerce,
        }
    }

    /// Absolute URL for a path on the app.
    #[must_use]
    pub fn at(&self, path: &str) -> String {
        format!("{}{path}", self.url)
    }

    /// Insert a connected store directly.
    ///
    /// # Panics
    ///
    /// Panics if `store_hash` is invalid.
    pub async fn seed_store(&self, store_hash: &str, access_token: &str) -> Store {
        let store_hash = StoreHash::parse(store_hash).expect("invalid store hash");
        self.stores
            .upsert(&store_hash, &SecretString::from(access_token), "store_v2_orders")
            .await
            .expect("Failed to seed store")
    }
}

fn test_config(bigcommerce_url: &str) -> AppConfig {
    let bigcommerce_url = Url::parse(bigcommerce_url).expect("invalid fake URL");

    AppConfig {
        debug: false,
        host: [127, 0, 0, 1].into(),
        port: 0,
        app_url: Url::parse(APP_URL).expect("invalid app URL"),
        database_url: SecretString::from("postgres://unused/orderman"),
        bigcommerce: BigCommerceConfig {
            client_id: CLIENT_ID.to_string(),
            client_secret: SecretString::from(CLIENT_SECRET),
            api_url: bigcommerce_url.clone(),
            login_url: bigcommerce_url,
        },
        log_format: LogFormat::Text,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    }
}

// =============================================================================
// Signed payloads
// =============================================================================

/// Sign `payload` the way BigCommerce signs load requests.
///
/// # Panics
///
/// Panics if `secret` cannot key an HMAC (never for SHA-256).
#[must_use]
pub fn sign_payload(payload: &serde_json::Value, secret: &str) -> String {
    let json = payload.to_string();
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(json.as_bytes());
    let digest = hex::encode(mac.finalize().into_bytes());

    format!("{}.{}", STANDARD.encode(json), STANDARD.encode(digest))
}

/// A load payload for `store_hash`.
#[must_use]
pub fn load_payload(store_hash: &str) -> serde_json::Value {
    serde_json::json!({
        "user": {"id": 9, "email": "owner@example.com"},
        "owner": {"id": 9, "email": "owner@example.com"},
        "context": format!("stores/{store_hash}"),
        "store_hash": store_hash,
        "timestamp": 1_700_000_000.5,
    })
}
