//! Connected BigCommerce store.

use orderman_core::{StoreHash, StoreId};
use secrecy::SecretString;

/// Maximum length of an access token (matches the `stores.access_token` column).
pub const MAX_ACCESS_TOKEN_LENGTH: usize = 128;

/// A merchant store that has installed the app.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct Store {
    /// Local identifier, exposed to the browser as `storeId`.
    pub id: StoreId,
    /// BigCommerce store hash.
    pub store_hash: StoreHash,
    /// OAuth access token for the REST API (redacted in debug output).
    pub access_token: SecretString,
    /// Space-delimited scopes granted at install time.
    pub scope: String,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.id)
            .field("store_hash", &self.store_hash)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store {
            id: StoreId::new(3),
            store_hash: StoreHash::parse("abc123").unwrap(),
            access_token: SecretString::from("tok_live_value"),
            scope: "store_v2_orders store_v2_information_read_only".to_string(),
        }
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let debug_output = format!("{:?}", store());
        assert!(debug_output.contains("abc123"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("tok_live_value"));
    }
}
