//! HTTP client for the BigCommerce login service and v2 REST API.

use std::sync::Arc;

use orderman_core::{OrderDate, OrderId};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;
use url::Url;

use super::types::{AccessToken, ApiErrorBody, Order, TokenRequest, TokenResponseBody, UpdateOrderDate};
use super::{BigCommerceError, RequestSnapshot, UpstreamFailure, redact_headers};
use crate::config::BigCommerceConfig;
use crate::models::Store;

const JSON: &str = "application/json";

/// Outcome of an order lookup.
#[derive(Debug, Clone)]
pub enum OrderLookup {
    /// 200: the order.
    Found(Box<Order>),
    /// 404: the first error message from BigCommerce.
    NotFound(String),
    /// 401/403: the error title from BigCommerce.
    Unauthorized(String),
    /// Any other status.
    UnknownStatus(StatusCode),
}

/// BigCommerce API client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct BigCommerceClient {
    inner: Arc<BigCommerceClientInner>,
}

struct BigCommerceClientInner {
    client: reqwest::Client,
    api_url: Url,
    login_url: Url,
    client_id: String,
    client_secret: SecretString,
}

/// A response read to completion, kept for error reporting.
struct ReadResponse {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: String,
}

impl ReadResponse {
    fn into_failure(self, request: RequestSnapshot, reason: impl Into<String>) -> BigCommerceError {
        BigCommerceError::Upstream(Box::new(UpstreamFailure {
            status: self.status,
            reason: reason.into(),
            response_headers: self.headers,
            response_body: self.body,
            request,
        }))
    }
}

impl BigCommerceClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: &BigCommerceConfig) -> Self {
        Self {
            inner: Arc::new(BigCommerceClientInner {
                client: reqwest::Client::new(),
                api_url: config.api_url.clone(),
                login_url: config.login_url.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            }),
        }
    }

    /// Get the client secret (for signed payload verification).
    #[must_use]
    pub fn client_secret(&self) -> &SecretString {
        &self.inner.client_secret
    }

    // =========================================================================
    // OAuth Flow
    // =========================================================================

    /// Exchange an authorization code for a permanent access token.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Http` if the request cannot be sent, or
    /// `BigCommerceError::Upstream` for a non-2xx or unreadable response.
    #[instrument(skip(self, request), fields(context = %request.context))]
    pub async fn exchange_code(
        &self,
        request: TokenRequest<'_>,
    ) -> Result<AccessToken, BigCommerceError> {
        let url = join(&self.inner.login_url, "oauth2/token");
        let params = [
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", request.code),
            ("scope", request.scope),
            ("grant_type", "authorization_code"),
            ("redirect_uri", request.redirect_uri),
            ("context", request.context),
        ];

        let builder = self
            .inner
            .client
            .post(url)
            .header(ACCEPT, JSON)
            .form(&params);
        let (snapshot, response) = self.send(builder).await?;

        if !response.status.is_success() {
            tracing::warn!(status = %response.status, "Token exchange rejected");
            return Err(response.into_failure(snapshot, "Token exchange failed"));
        }

        match serde_json::from_str::<TokenResponseBody>(&response.body) {
            Ok(body) => Ok(AccessToken::from(body)),
            Err(e) => Err(response.into_failure(snapshot, format!("Invalid token response: {e}"))),
        }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Fetch an order.
    ///
    /// 200, 401, 403 and 404 are mapped to [`OrderLookup`] variants; other
    /// statuses come back as [`OrderLookup::UnknownStatus`].
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Http` if the request cannot be sent, or
    /// `BigCommerceError::Upstream` if a mapped status carries a body that
    /// cannot be parsed.
    #[instrument(skip(self, store), fields(store_hash = %store.store_hash, order_id = %order_id))]
    pub async fn get_order(
        &self,
        store: &Store,
        order_id: OrderId,
    ) -> Result<OrderLookup, BigCommerceError> {
        let builder = self.order_request(Method::GET, store, order_id);
        let (snapshot, response) = self.send(builder).await?;

        match response.status {
            StatusCode::OK => match serde_json::from_str::<Order>(&response.body) {
                Ok(order) => Ok(OrderLookup::Found(Box::new(order))),
                Err(e) => Err(response.into_failure(snapshot, format!("Invalid order response: {e}"))),
            },
            StatusCode::NOT_FOUND => {
                let message = parse_error_body(&response.body)
                    .and_then(|body| body.message().map(str::to_owned));
                match message {
                    Some(message) => Ok(OrderLookup::NotFound(message)),
                    None => Err(response.into_failure(snapshot, "Unreadable not-found response")),
                }
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let title = parse_error_body(&response.body)
                    .and_then(|body| body.title().map(str::to_owned));
                match title {
                    Some(title) => Ok(OrderLookup::Unauthorized(title)),
                    None => Err(response.into_failure(snapshot, "Unreadable authorization error")),
                }
            }
            status => {
                tracing::warn!(%status, "Unexpected status from orders API");
                Ok(OrderLookup::UnknownStatus(status))
            }
        }
    }

    /// Replace an order's creation date.
    ///
    /// Returns the status BigCommerce answered with; callers decide what a
    /// non-200 means.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Http` if the request cannot be sent.
    #[instrument(skip(self, store), fields(store_hash = %store.store_hash, order_id = %order_id))]
    pub async fn update_order_date(
        &self,
        store: &Store,
        order_id: OrderId,
        date: OrderDate,
    ) -> Result<StatusCode, BigCommerceError> {
        let body = UpdateOrderDate {
            date_created: date.to_api_string(),
        };
        let builder = self
            .order_request(Method::PUT, store, order_id)
            .json(&body);
        let (_, response) = self.send(builder).await?;

        if response.status != StatusCode::OK {
            tracing::warn!(status = %response.status, "Order date update rejected");
        }

        Ok(response.status)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn order_request(&self, method: Method, store: &Store, order_id: OrderId) -> RequestBuilder {
        let url = join(
            &self.inner.api_url,
            &format!("stores/{}/v2/orders/{order_id}", store.store_hash),
        );

        self.inner
            .client
            .request(method, url)
            .header("X-Auth-Token", store.access_token.expose_secret())
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
    }

    async fn send(
        &self,
        builder: RequestBuilder,
    ) -> Result<(RequestSnapshot, ReadResponse), BigCommerceError> {
        let request = builder.build()?;
        let snapshot = RequestSnapshot::capture(&request);

        tracing::debug!(method = %snapshot.method, url = %snapshot.url, "BigCommerce request");

        let response = self.inner.client.execute(request).await?;
        let status = response.status();
        let headers = redact_headers(response.headers());
        let body = response.text().await?;

        Ok((
            snapshot,
            ReadResponse {
                status,
                headers,
                body,
            },
        ))
    }
}

fn join(base: &Url, path: &str) -> String {
    format!("{}/{path}", base.as_str().trim_end_matches('/'))
}

fn parse_error_body(body: &str) -> Option<ApiErrorBody> {
    serde_json::from_str(body).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_join_handles_trailing_slash() {
        let with = Url::parse("https://api.bigcommerce.com/").unwrap();
        let without = Url::parse("http://127.0.0.1:4010").unwrap();

        assert_eq!(
            join(&with, "stores/abc/v2/orders/1"),
            "https://api.bigcommerce.com/stores/abc/v2/orders/1"
        );
        assert_eq!(join(&without, "oauth2/token"), "http://127.0.0.1:4010/oauth2/token");
    }

    #[test]
    fn test_parse_error_body_rejects_html() {
        assert!(parse_error_body("<html>502</html>").is_none());
    }
}
