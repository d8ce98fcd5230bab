//! Replacement order creation date.
//!
//! The editor form submits an HTML `datetime-local` value (`YYYY-MM-DDTHH:MM`)
//! while the BigCommerce v2 API expects RFC 2822 style dates. The submitted
//! value carries no zone information and is sent to the platform as UTC.

use core::fmt;

use chrono::NaiveDateTime;

/// Accepted input layouts, tried in order.
const INPUT_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Layout of the `date_created` field in the v2 orders API.
const API_FORMAT: &str = "%d %b %Y %H:%M:%S +0000";

/// Errors that can occur when parsing an [`OrderDate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderDateError {
    /// The input string is empty.
    #[error("date cannot be empty")]
    Empty,
    /// The input does not match `YYYY-MM-DDTHH:MM`.
    #[error("date must look like YYYY-MM-DDTHH:MM (got {0:?})")]
    InvalidFormat(String),
}

/// A naive date-time chosen by the operator as the new order creation date.
///
/// ## Examples
///
/// ```
/// use orderman_core::OrderDate;
///
/// let date = OrderDate::parse("2023-05-01T14:30").unwrap();
/// assert_eq!(date.to_api_string(), "01 May 2023 14:30:00 +0000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderDate(NaiveDateTime);

impl OrderDate {
    /// Parse a `datetime-local` form value.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or not in `YYYY-MM-DDTHH:MM`
    /// (optionally `:SS`) form.
    pub fn parse(s: &str) -> Result<Self, OrderDateError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(OrderDateError::Empty);
        }

        INPUT_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            .map(Self)
            .ok_or_else(|| OrderDateError::InvalidFormat(s.to_owned()))
    }

    /// Format for the `date_created` field of the orders API.
    #[must_use]
    pub fn to_api_string(&self) -> String {
        self.0.format(API_FORMAT).to_string()
    }
}

impl fmt::Display for OrderDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M"))
    }
}

impl std::str::FromStr for OrderDate {
    type Err = OrderDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
