//! In-crate test suites that span more than one module.
//!
//! Unit tests live next to the code they exercise; HTTP-level tests against a
//! mock backend live in the top-level `tests/` directory.

mod common;
mod mocks;
mod property;
