//! Orderman Core - Shared domain types.
//!
//! This crate provides the types used across the Orderman components:
//! - `app` - The BigCommerce order-date editor web service
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP clients. Database encoding for the identifier types is
//! available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Store identifiers, order identifiers, and the order date format

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
