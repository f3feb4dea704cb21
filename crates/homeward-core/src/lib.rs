//! Homeward Core Types
//!
//! This crate provides the fundamental pieces shared across Homeward:
//! - Tracker position and location report types
//! - Great-circle distance math
//! - Core error types

pub mod error;
pub mod geo;
pub mod types;

pub use error::{Error, Result};
