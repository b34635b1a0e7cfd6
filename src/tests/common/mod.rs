//! Common Test Utilities
//!
//! Shared fixtures used across the property suites:
//! - Wizard drafts and controllers filled up to a given step (`fixtures`)

pub mod fixtures;

pub use fixtures::*;
