//! Common library for the helpdesk client
//!
//! This crate provides shared infrastructure used across the client crates,
//! currently the process-wide keyed storage that backs session persistence.

pub mod store;

pub use store::KeyValueStore;
