//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe wrappers for database
//! primary keys. Platform-assigned identifiers that never touch our database
//! (such as [`OrderId`]) are defined by hand.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i32()`
/// - `Display` and `FromStr` so IDs round-trip through query strings
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use orderman_core::define_id;
/// define_id!(WidgetId);
///
/// let id: WidgetId = "42".parse().unwrap();
/// assert_eq!(id.as_i32(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Primary key of the `stores` table, exposed to the browser as `storeId`.
define_id!(StoreId);

/// Errors that can occur when parsing an [`OrderId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderIdError {
    /// The input string is empty.
    #[error("order id cannot be empty")]
    Empty,
    /// The input is not a positive integer.
    #[error("order id must be a positive integer (got {0:?})")]
    NotNumeric(String),
}

/// A BigCommerce order number.
///
/// Orders are addressed by a positive integer in the v2 REST API. Parsing
/// rejects anything else so that user input never ends up as an arbitrary
/// path segment in an outbound URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Create a new order ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Parse an order ID from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or not a positive integer.
    pub fn parse(s: &str) -> Result<Self, OrderIdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(OrderIdError::Empty);
        }
        match s.parse::<u64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(OrderIdError::NotNumeric(s.to_owned())),
        }
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = OrderIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_store_id_from_query_string() {
        let id: StoreId = " 17 ".parse().unwrap();
        assert_eq!(id, StoreId::new(17));
        assert_eq!(id.to_string(), "17");
        assert!("abc".parse::<StoreId>().is_err());
    }

    #[test]
    fn test_order_id_parse() {
        assert_eq!(OrderId::parse("100").unwrap().as_u64(), 100);
        assert_eq!(OrderId::parse(" 7 ").unwrap(), OrderId::new(7));
    }

    #[test]
    fn test_order_id_rejects_non_numeric() {
        assert_eq!(OrderId::parse(""), Err(OrderIdError::Empty));
        assert!(matches!(
            OrderId::parse("../customers"),
            Err(OrderIdError::NotNumeric(_))
        ));
        assert!(matches!(OrderId::parse("0"), Err(OrderIdError::NotNumeric(_))));
        assert!(matches!(OrderId::parse("-4"), Err(OrderIdError::NotNumeric(_))));
    }
}
