//! Homeward Egress Connector
//!
//! This crate provides the connector to the Tractive tracking service:
//! - Shared HTTP client construction
//! - The `TractiveConnector` with authenticate/locate/history operations

pub mod client;
pub mod tractive;

pub use tractive::{Session, TimeBound, TractiveConfig, TractiveConnector};
