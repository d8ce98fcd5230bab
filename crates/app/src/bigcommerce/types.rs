//! BigCommerce REST v2 and OAuth wire types.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Orders
// =============================================================================

/// An order as returned by `GET /stores/{hash}/v2/orders/{id}`.
///
/// Only the fields shown in the editor are modelled; everything else in the
/// payload is ignored. Every field is optional so that partial responses still
/// render.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: Option<u64>,
    pub customer_id: Option<u64>,
    pub status: Option<String>,
    pub date_created: Option<String>,
    pub date_modified: Option<String>,
    pub items_total: Option<u64>,
    pub currency_code: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub subtotal_inc_tax: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub total_inc_tax: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub customer_message: Option<String>,
    pub staff_notes: Option<String>,
    pub billing_address: Option<BillingAddress>,
}

impl Order {
    /// Full name from the billing address, if any part of it is present.
    #[must_use]
    pub fn customer_name(&self) -> Option<String> {
        let address = self.billing_address.as_ref()?;
        let name = [address.first_name.as_deref(), address.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!name.is_empty()).then_some(name)
    }
}

/// Billing address attached to an order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BillingAddress {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Request body for replacing an order's creation date.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateOrderDate {
    pub date_created: String,
}

/// Money amounts arrive as decimal strings (`"12.0000"`) but some stores
/// return bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// =============================================================================
// Errors
// =============================================================================

/// Error body returned by the REST API.
///
/// 404s arrive as `[{"status": 404, "message": "..."}]`, auth failures as
/// `{"status": 401, "title": "..."}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorBody {
    List(Vec<ApiErrorEntry>),
    Single(ApiErrorEntry),
}

/// One entry of an [`ApiErrorBody`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorEntry {
    pub status: Option<u16>,
    pub message: Option<String>,
    pub title: Option<String>,
}

impl ApiErrorBody {
    fn first(&self) -> Option<&ApiErrorEntry> {
        match self {
            Self::List(entries) => entries.first(),
            Self::Single(entry) => Some(entry),
        }
    }

    /// The first error message, falling back to the title.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        let entry = self.first()?;
        entry.message.as_deref().or(entry.title.as_deref())
    }

    /// The error title, falling back to the message.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        let entry = self.first()?;
        entry.title.as_deref().or(entry.message.as_deref())
    }
}

// =============================================================================
// OAuth
// =============================================================================

/// Parameters of an authorization code exchange.
#[derive(Debug, Clone, Copy)]
pub struct TokenRequest<'a> {
    pub code: &'a str,
    pub scope: &'a str,
    pub context: &'a str,
    pub redirect_uri: &'a str,
}

/// The user who authorized the app.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenUser {
    pub id: Option<u64>,
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Raw token response from `POST /oauth2/token`.
#[derive(Deserialize)]
pub(crate) struct TokenResponseBody {
    pub access_token: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub user: TokenUser,
    #[serde(default)]
    pub context: String,
}

/// A permanent access token issued for a store.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct AccessToken {
    pub access_token: SecretString,
    pub scope: String,
    pub user: TokenUser,
    pub context: String,
}

impl From<TokenResponseBody> for AccessToken {
    fn from(body: TokenResponseBody) -> Self {
        Self {
            access_token: SecretString::from(body.access_token),
            scope: body.scope,
            user: body.user,
            context: body.context,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("user", &self.user)
            .field("context", &self.context)
            .finish()
    }
}
