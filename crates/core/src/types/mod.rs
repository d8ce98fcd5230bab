//! Core types for Orderman.
//!
//! This module provides type-safe wrappers for the platform concepts the
//! editor works with.

pub mod id;
pub mod order_date;
pub mod store_hash;

pub use id::*;
pub use order_date::{OrderDate, OrderDateError};
pub use store_hash::{StoreContext, StoreHash, StoreHashError};
