//! Orderman library.
//!
//! A BigCommerce single-click app that lets a merchant look up an order and
//! replace its creation date. The crate is split into a library so the whole
//! HTTP surface can be exercised in-process by the integration tests.
//!
//! # Security
//!
//! Store records hold long-lived BigCommerce access tokens. The error page is
//! a debugging aid and shows upstream request and response details, with
//! credentials redacted.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bigcommerce;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod views;

pub use error::AppError;
pub use state::AppState;
