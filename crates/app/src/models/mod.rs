//! Domain models for Orderman.

pub mod store;

pub use store::Store;
