//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page (optional storeId)
//! GET  /order                  - Look up an order (storeId, orderId)
//! POST /order                  - Replace an order's creation date (storeId, orderId, newdate)
//!
//! # BigCommerce app callbacks
//! GET  /bigcommerce/callback   - OAuth install/re-authorization
//! GET  /bigcommerce/load       - Open from the control panel (signed_payload)
//!
//! # Operations
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (store database reachable)
//! ```

pub mod bigcommerce;
pub mod health;
pub mod index;
pub mod orders;

use std::time::Duration;

use axum::{Router, routing::get};
use orderman_core::StoreId;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::CALLBACK_PATH;
use crate::error::AppError;
use crate::models::Store;
use crate::state::AppState;

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index::index))
        .route("/order", get(orders::show).post(orders::update))
        .route(CALLBACK_PATH, get(bigcommerce::callback))
        .route("/bigcommerce/load", get(bigcommerce::load))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Build the application with request tracing, bound to `state`.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri().path(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Treat missing and blank query/form values alike.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A required parameter, or a 400 naming it.
pub(crate) fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, AppError> {
    non_empty(value).ok_or_else(|| AppError::BadRequest(format!("missing required parameter {name}")))
}

/// Resolve the `storeId` parameter to a connected store.
///
/// Missing or malformed IDs are a 400, unknown IDs a 404.
pub(crate) async fn resolve_store(
    state: &AppState,
    store_id: Option<&str>,
) -> Result<Store, AppError> {
    let raw = required(store_id, "storeId")?;
    let id: StoreId = raw
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid storeId {raw:?}")))?;

    state
        .stores()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no store with id {id}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_treats_blank_as_missing() {
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(" 42 ")), Some("42"));
    }

    #[test]
    fn test_required_names_parameter() {
        let err = required(Some(""), "orderId").unwrap_err();
        assert_eq!(err.to_string(), "Bad request: missing required parameter orderId");
    }
}
