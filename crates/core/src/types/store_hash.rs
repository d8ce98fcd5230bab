//! BigCommerce store hash and install context types.

use core::fmt;

/// Errors that can occur when parsing a [`StoreHash`] or [`StoreContext`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreHashError {
    /// The input string is empty.
    #[error("store hash cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("store hash must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains characters outside `[A-Za-z0-9]`.
    #[error("store hash must be alphanumeric")]
    InvalidCharacter,
    /// The context string is not of the form `stores/<hash>`.
    #[error("context must look like stores/<store_hash> (got {0:?})")]
    InvalidContext(String),
}

/// The identifier of a merchant's store on BigCommerce.
///
/// ## Constraints
///
/// - Length: 1-16 characters
/// - ASCII alphanumeric only
///
/// ## Examples
///
/// ```
/// use orderman_core::StoreHash;
///
/// assert!(StoreHash::parse("abc123").is_ok());
/// assert!(StoreHash::parse("").is_err());
/// assert!(StoreHash::parse("stores/abc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreHash(String);

impl StoreHash {
    /// Maximum length of a store hash (matches the `stores.store_hash` column).
    pub const MAX_LENGTH: usize = 16;

    /// Parse a `StoreHash` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 16 characters, or
    /// contains non-alphanumeric characters.
    pub fn parse(s: &str) -> Result<Self, StoreHashError> {
        if s.is_empty() {
            return Err(StoreHashError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(StoreHashError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StoreHashError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the store hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StoreHash {
    type Err = StoreHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for StoreHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for StoreHash {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for StoreHash {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for StoreHash {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// The `context` value BigCommerce sends with install and load requests.
///
/// Always of the form `stores/<store_hash>`; the raw string is kept because the
/// token endpoint expects it back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreContext {
    raw: String,
    store_hash: StoreHash,
}

impl StoreContext {
    /// Parse a `stores/<store_hash>` context string.
    ///
    /// # Errors
    ///
    /// Returns `StoreHashError::InvalidContext` if the prefix is missing, or
    /// the store hash error if the hash itself is invalid.
    pub fn parse(s: &str) -> Result<Self, StoreHashError> {
        let hash = s
            .strip_prefix("stores/")
            .ok_or_else(|| StoreHashError::InvalidContext(s.to_owned()))?;
        let store_hash = StoreHash::parse(hash)?;

        Ok(Self {
            raw: s.to_owned(),
            store_hash,
        })
    }

    /// The context string as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The store hash embedded in the context.
    #[must_use]
    pub const fn store_hash(&self) -> &StoreHash {
        &self.store_hash
    }
}
