//! BigCommerce REST API client.
//!
//! # Architecture
//!
//! - OAuth code exchange against the login service (`/oauth2/token`)
//! - Order reads and date updates against the v2 REST API
//! - Signed payload verification for the in-admin load callback
//!
//! Every outbound call is attempted exactly once. Failed calls keep a
//! redacted copy of the request and the upstream response so the error page
//! can show what went wrong.
//!
//! # Example
//!
//! ```rust,ignore
//! use orderman_app::bigcommerce::{BigCommerceClient, OrderLookup};
//!
//! let client = BigCommerceClient::new(&config.bigcommerce);
//!
//! match client.get_order(&store, order_id).await? {
//!     OrderLookup::Found(order) => println!("{:?}", order.status),
//!     other => println!("{other:?}"),
//! }
//! ```

mod client;
pub mod signed_payload;
pub mod types;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use thiserror::Error;

pub use client::{BigCommerceClient, OrderLookup};
pub use signed_payload::{SignedPayload, SignedPayloadError};
pub use types::*;

/// Header names whose values never leave the process.
const SENSITIVE_HEADERS: &[&str] = &["x-auth-token", "authorization", "cookie", "set-cookie"];

/// Form fields whose values never leave the process.
const SENSITIVE_FIELDS: &[&str] = &["client_secret", "code"];

const REDACTED: &str = "[REDACTED]";

/// Errors that can occur when talking to BigCommerce.
#[derive(Debug, Error)]
pub enum BigCommerceError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// BigCommerce answered, but not with something we can use.
    #[error("{0}")]
    Upstream(Box<UpstreamFailure>),
}

impl BigCommerceError {
    /// The captured request/response pair, when BigCommerce answered.
    #[must_use]
    pub fn upstream(&self) -> Option<&UpstreamFailure> {
        match self {
            Self::Upstream(failure) => Some(failure),
            Self::Http(_) => None,
        }
    }
}

/// A failed exchange with BigCommerce, as shown on the error page.
#[derive(Debug, Clone, Error)]
#[error("{reason} (HTTP {status})")]
pub struct UpstreamFailure {
    pub status: StatusCode,
    pub reason: String,
    pub response_headers: Vec<(String, String)>,
    pub response_body: String,
    pub request: RequestSnapshot,
}

impl UpstreamFailure {
    /// Numeric status code.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }
}

/// Redacted copy of an outbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RequestSnapshot {
    /// Capture a built request before it is sent.
    #[must_use]
    pub fn capture(request: &reqwest::Request) -> Self {
        let body = request
            .body()
            .and_then(reqwest::Body::as_bytes)
            .map(|bytes| redact_body(&String::from_utf8_lossy(bytes)))
            .unwrap_or_default();

        Self {
            method: request.method().to_string(),
            url: request.url().to_string(),
            headers: redact_headers(request.headers()),
            body,
        }
    }
}

/// Header pairs with sensitive values replaced.
pub(crate) fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if SENSITIVE_HEADERS.contains(&name.as_str()) {
                REDACTED.to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.to_string(), value)
        })
        .collect()
}

/// Replace sensitive fields of a form-encoded body. Other bodies pass through.
fn redact_body(body: &str) -> String {
    let is_form = !body.trim_start().starts_with(['{', '['])
        && body.contains('=')
        && SENSITIVE_FIELDS
            .iter()
            .any(|field| body.contains(&format!("{field}=")));
    if !is_form {
        return body.to_owned();
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        if SENSITIVE_FIELDS.contains(&key.as_ref()) {
            serializer.append_pair(&key, REDACTED);
        } else {
            serializer.append_pair(&key, &value);
        }
    }
    serializer.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::header::{HeaderValue, ACCEPT};

    use super::*;

    #[test]
    fn test_redact_headers_hides_auth_token() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Auth-Token", HeaderValue::from_static("tok_live"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let redacted = redact_headers(&headers);

        assert!(redacted.contains(&("x-auth-token".to_string(), REDACTED.to_string())));
        assert!(redacted.contains(&("accept".to_string(), "application/json".to_string())));
    }

    #[test]
    fn test_redact_body_hides_client_secret() {
        let body = "client_id=abc&client_secret=s3cr3t&code=xyz&scope=store_v2_orders";
        let redacted = redact_body(body);

        assert!(!redacted.contains("s3cr3t"));
        assert!(!redacted.contains("xyz"));
        assert!(redacted.contains("client_id=abc"));
        assert!(redacted.contains("scope=store_v2_orders"));
    }

    #[test]
    fn test_redact_body_leaves_json_alone() {
        let body = r#"{"date_created":"01 May 2023 14:30:00 +0000"}"#;
        assert_eq!(redact_body(body), body);
    }

    #[test]
    fn test_capture_request() {
        let client = reqwest::Client::new();
        let request = client
            .put("https://api.example.test/stores/abc/v2/orders/7")
            .header("X-Auth-Token", "tok_live")
            .body(r#"{"date_created":"x"}"#)
            .build()
            .unwrap();

        let snapshot = RequestSnapshot::capture(&request);

        assert_eq!(snapshot.method, "PUT");
        assert_eq!(snapshot.url, "https://api.example.test/stores/abc/v2/orders/7");
        assert_eq!(snapshot.body, r#"{"date_created":"x"}"#);
        assert!(snapshot.headers.iter().all(|(_, v)| v != "tok_live"));
    }
}
