//! Unified error handling and the diagnostic error page.
//!
//! Every handler returns `Result<Reply, AppError>`. Failures are rendered as an
//! HTML page carrying the failed BigCommerce exchange when there is one.
//! Server errors are captured to Sentry before responding.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::bigcommerce::{BigCommerceError, UpstreamFailure};
use crate::db::RepositoryError;
use crate::views::{ErrorPage, Reply};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// BigCommerce API operation failed.
    #[error("BigCommerce error: {0}")]
    BigCommerce(#[from] BigCommerceError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::BigCommerce(_) | Self::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The failed BigCommerce exchange behind this error, if any.
    #[must_use]
    pub fn upstream(&self) -> Option<&UpstreamFailure> {
        match self {
            Self::BigCommerce(err) => err.upstream(),
            _ => None,
        }
    }

    fn heading(&self) -> String {
        let label = self.status_code().canonical_reason().unwrap_or("Error");
        match self {
            Self::NotFound(detail) | Self::BadRequest(detail) => format!("{label}: {detail}"),
            _ => format!("{label}: {self}"),
        }
    }

    /// Render the diagnostic page.
    #[must_use]
    pub fn to_reply(&self) -> Reply {
        let page = ErrorPage {
            heading: self.heading(),
            upstream: self.upstream(),
        };

        let reply = match page.render() {
            Ok(body) => Reply::html(body),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                Reply::text(self.heading())
            }
        };

        reply.with_status(self.status_code())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.status_code().is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        self.to_reply().into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::bigcommerce::RequestSnapshot;
    use crate::views::ContentType;

    fn upstream_error() -> AppError {
        AppError::BigCommerce(BigCommerceError::Upstream(Box::new(UpstreamFailure {
            status: StatusCode::BAD_REQUEST,
            reason: "Token exchange failed".to_string(),
            response_headers: vec![("content-type".to_string(), "application/json".to_string())],
            response_body: r#"{"error":"invalid_grant"}"#.to_string(),
            request: RequestSnapshot {
                method: "POST".to_string(),
                url: "https://login.bigcommerce.com/oauth2/token".to_string(),
                headers: vec![("accept".to_string(), "application/json".to_string())],
                body: "client_id=abc&client_secret=%5BREDACTED%5D".to_string(),
            },
        })))
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("store 12".to_string());
        assert_eq!(err.to_string(), "Not found: store 12");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(upstream_error()), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_page_shows_upstream_exchange() {
        let reply = upstream_error().to_reply();

        assert_eq!(reply.content_type, ContentType::Html);
        assert!(reply.body.contains("Internal Server Error: BigCommerce error: Token exchange failed"));
        assert!(reply.body.contains("HTTP 400"));
        assert!(reply.body.contains("invalid_grant"));
        assert!(reply.body.contains("POST https://login.bigcommerce.com/oauth2/token"));
        assert!(reply.body.contains("%5BREDACTED%5D"));
    }

    #[test]
    fn test_error_page_without_upstream() {
        let reply = AppError::BadRequest("missing code".to_string()).to_reply();

        assert_eq!(reply.status_code, StatusCode::BAD_REQUEST);
        assert!(reply.body.contains("Bad Request: missing code"));
        assert!(reply.body.contains("Not an HTTP error"));
    }
}
