//! Uniform handler responses and page templates.
//!
//! Every handler returns a [`Reply`]: a body, a status code and a content
//! type, plus a `Location` for redirects.

use askama::Template;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use orderman_core::StoreId;

use crate::bigcommerce::{Order, UpstreamFailure};
use crate::error::AppError;

/// Response body media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    PlainText,
}

impl ContentType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::PlainText => "text/plain; charset=utf-8",
        }
    }
}

/// The response every handler produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status_code: StatusCode,
    pub content_type: ContentType,
    pub body: String,
    pub location: Option<String>,
}

impl Reply {
    /// 200 with an HTML body.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::OK,
            content_type: ContentType::Html,
            body: body.into(),
            location: None,
        }
    }

    /// 200 with a plain-text body.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::PlainText,
            ..Self::html(body)
        }
    }

    /// 302 to `location`.
    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::FOUND,
            location: Some(location.into()),
            ..Self::text(String::new())
        }
    }

    /// Render a template into an HTML reply.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Template` if rendering fails.
    pub fn page(template: &impl Template) -> Result<Self, AppError> {
        Ok(Self::html(template.render()?))
    }

    /// Replace the status code.
    #[must_use]
    pub const fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = (self.status_code, self.body).into_response();
        let headers = response.headers_mut();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(self.content_type.as_str()),
        );
        if let Some(location) = self.location
            && let Ok(value) = HeaderValue::from_str(&location)
        {
            headers.insert(LOCATION, value);
        }
        response
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Landing page with the order lookup form.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub store_id: Option<StoreId>,
    pub msg: Option<String>,
}

/// Order details with the date edit form.
#[derive(Template)]
#[template(path = "order.html")]
pub struct OrderPage {
    pub store_id: StoreId,
    pub order: Order,
}

/// Diagnostic page for failed requests.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage<'a> {
    pub heading: String,
    pub upstream: Option<&'a UpstreamFailure>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_sets_location() {
        let response = Reply::redirect("/?storeId=4").into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/?storeId=4");
    }

    #[test]
    fn test_text_reply_content_type() {
        let response = Reply::text("nope")
            .with_status(StatusCode::UNAUTHORIZED)
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_index_page_renders_message_and_store() {
        let reply = Reply::page(&IndexPage {
            store_id: Some(StoreId::new(12)),
            msg: Some("Please provide a Order Id".to_string()),
        })
        .unwrap();

        assert_eq!(reply.content_type, ContentType::Html);
        assert!(reply.body.contains("Please provide a Order Id"));
        assert!(reply.body.contains(r#"value="12""#));
    }

    #[test]
    fn test_order_page_renders_fields() {
        let order: Order = serde_json::from_str(
            r#"{"id":100,"status":"Shipped","date_created":"Tue, 20 Nov 2012 00:00:00 +0000",
                "total_inc_tax":"12.0000","currency_code":"USD",
                "billing_address":{"first_name":"Jane","last_name":"Doe","email":"jane@example.com"}}"#,
        )
        .unwrap();
        let reply = Reply::page(&OrderPage {
            store_id: StoreId::new(3),
            order,
        })
        .unwrap();

        assert!(reply.body.contains("Order #100"));
        assert!(reply.body.contains("Shipped"));
        assert!(reply.body.contains("Jane Doe"));
        assert!(reply.body.contains("12.0000 USD"));
        assert!(reply.body.contains(r#"name="storeId" value="3""#));
    }
}
