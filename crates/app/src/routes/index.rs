//! Landing page.

use axum::extract::Query;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::views::{IndexPage, Reply};

#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    #[serde(rename = "storeId")]
    pub store_id: Option<String>,
}

/// GET / - Landing page with the order lookup form.
///
/// An unparseable `storeId` is ignored rather than rejected.
#[instrument]
pub async fn index(Query(params): Query<IndexParams>) -> Result<Reply> {
    let store_id = super::non_empty(params.store_id.as_deref()).and_then(|s| s.parse().ok());

    Reply::page(&IndexPage {
        store_id,
        msg: None,
    })
}
