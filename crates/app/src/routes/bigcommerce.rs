//! BigCommerce app callbacks.
//!
//! These routes are registered with BigCommerce as the app's auth callback
//! and load callback URLs.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use orderman_core::{StoreContext, StoreHash};
use serde::Deserialize;
use tracing::instrument;

use super::required;
use crate::bigcommerce::{TokenRequest, signed_payload};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::views::Reply;

const VERIFICATION_FAILED: &str = "Payload verification failed!";
const STORE_NOT_FOUND: &str = "Store not found!";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub context: Option<String>,
    pub scope: Option<String>,
}

#[derive(Deserialize)]
pub struct LoadParams {
    pub signed_payload: Option<String>,
}

/// GET /bigcommerce/callback - Complete the OAuth install flow.
///
/// Exchanges the code for a permanent token, then creates the store record
/// or replaces the token and scope of the existing one.
#[instrument(skip(state, params), fields(context = ?params.context))]
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Reply> {
    let code = required(params.code.as_deref(), "code")?;
    let scope = required(params.scope.as_deref(), "scope")?;
    let context = StoreContext::parse(required(params.context.as_deref(), "context")?)
        .map_err(|e| AppError::BadRequest(format!("invalid context: {e}")))?;

    let redirect_uri = state.config().callback_url();
    let token = state
        .bigcommerce()
        .exchange_code(TokenRequest {
            code,
            scope,
            context: context.as_str(),
            redirect_uri: &redirect_uri,
        })
        .await?;

    let store = state
        .stores()
        .upsert(context.store_hash(), &token.access_token, scope)
        .await?;

    tracing::info!(
        store_id = %store.id,
        store_hash = %store.store_hash,
        user_id = ?token.user.id,
        "Store connected"
    );
    Ok(Reply::redirect(state.config().store_landing_url(store.id)))
}

/// GET /bigcommerce/load - Open the app from the control panel.
///
/// A payload that fails verification is rejected before any store lookup.
#[instrument(skip(state, params))]
pub async fn load(
    State(state): State<AppState>,
    Query(params): Query<LoadParams>,
) -> Result<Reply> {
    let raw = required(params.signed_payload.as_deref(), "signed_payload")?;

    let payload = match signed_payload::verify(raw, state.bigcommerce().client_secret()) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Signed payload rejected");
            return Ok(Reply::text(VERIFICATION_FAILED).with_status(StatusCode::UNAUTHORIZED));
        }
    };

    let store = match StoreHash::parse(&payload.store_hash) {
        Ok(store_hash) => state.stores().get_by_store_hash(&store_hash).await?,
        Err(e) => {
            tracing::warn!(error = %e, "Signed payload carries an invalid store hash");
            None
        }
    };

    let Some(store) = store else {
        return Ok(Reply::text(STORE_NOT_FOUND).with_status(StatusCode::UNAUTHORIZED));
    };

    tracing::info!(store_id = %store.id, user_id = ?payload.user.id, "Store loaded");
    Ok(Reply::redirect(state.config().store_landing_url(store.id)))
}
