//! Order lookup and creation date update.

use axum::Form;
use axum::extract::rejection::FormRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use orderman_core::{OrderDate, OrderId};
use serde::Deserialize;
use tracing::instrument;

use super::{non_empty, required, resolve_store};
use crate::bigcommerce::OrderLookup;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::views::{IndexPage, OrderPage, Reply};

const ORDER_ID_PROMPT: &str = "Please provide a Order Id";
const UPDATE_SUCCEEDED: &str = "Order successfully updated";
const UNKNOWN_STATUS: &str = "Unknown Status Code";

/// Parameters accepted by `/order`, from the query string or a form body.
#[derive(Debug, Default, Deserialize)]
pub struct OrderParams {
    #[serde(rename = "storeId")]
    pub store_id: Option<String>,
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
    pub newdate: Option<String>,
}

impl OrderParams {
    /// Fill fields missing here from `other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self {
            store_id: self.store_id.or(other.store_id),
            order_id: self.order_id.or(other.order_id),
            newdate: self.newdate.or(other.newdate),
        }
    }
}

fn parse_order_id(raw: &str) -> Result<OrderId> {
    OrderId::parse(raw).map_err(|e| AppError::BadRequest(format!("invalid orderId: {e}")))
}

/// GET /order - Show an order.
///
/// Without an `orderId` the landing page is shown again with a prompt.
/// Upstream rejections are answered with 200 and the upstream message as a
/// plain-text body.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Query(params): Query<OrderParams>,
) -> Result<Reply> {
    let store = resolve_store(&state, params.store_id.as_deref()).await?;

    let Some(raw_order_id) = non_empty(params.order_id.as_deref()) else {
        return Reply::page(&IndexPage {
            store_id: Some(store.id),
            msg: Some(ORDER_ID_PROMPT.to_string()),
        });
    };
    let order_id = parse_order_id(raw_order_id)?;

    match state.bigcommerce().get_order(&store, order_id).await? {
        OrderLookup::Found(order) => Reply::page(&OrderPage {
            store_id: store.id,
            order: *order,
        }),
        OrderLookup::NotFound(message) => Ok(Reply::text(message)),
        OrderLookup::Unauthorized(title) => Ok(Reply::text(title)),
        OrderLookup::UnknownStatus(_) => Ok(Reply::text(UNKNOWN_STATUS)),
    }
}

/// POST /order - Replace an order's creation date.
///
/// Parameters may come from the query string or the form body; the query
/// string wins when both carry a value.
#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    Query(query): Query<OrderParams>,
    form: std::result::Result<Form<OrderParams>, FormRejection>,
) -> Result<Reply> {
    let params = query.or(form.map(|Form(body)| body).unwrap_or_default());

    let store = resolve_store(&state, params.store_id.as_deref()).await?;
    let order_id = parse_order_id(required(params.order_id.as_deref(), "orderId")?)?;
    let date = OrderDate::parse(required(params.newdate.as_deref(), "newdate")?)
        .map_err(|e| AppError::BadRequest(format!("invalid newdate: {e}")))?;

    let status = state
        .bigcommerce()
        .update_order_date(&store, order_id, date)
        .await?;

    let msg = if status == StatusCode::OK {
        tracing::info!(store_id = %store.id, %order_id, %date, "Order date updated");
        UPDATE_SUCCEEDED.to_string()
    } else {
        format!(
            "Some error occurred while updating - Status Code {}",
            status.as_u16()
        )
    };

    Reply::page(&IndexPage {
        store_id: Some(store.id),
        msg: Some(msg),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_values_take_priority() {
        let query = OrderParams {
            store_id: Some("1".to_string()),
            order_id: None,
            newdate: None,
        };
        let form = OrderParams {
            store_id: Some("2".to_string()),
            order_id: Some("100".to_string()),
            newdate: Some("2023-05-01T14:30".to_string()),
        };

        let merged = query.or(form);

        assert_eq!(merged.store_id.as_deref(), Some("1"));
        assert_eq!(merged.order_id.as_deref(), Some("100"));
        assert_eq!(merged.newdate.as_deref(), Some("2023-05-01T14:30"));
    }

    #[test]
    fn test_parse_order_id_rejects_non_numeric() {
        assert!(matches!(parse_order_id("12/../34"), Err(AppError::BadRequest(_))));
        assert!(parse_order_id("100").is_ok());
    }
}
