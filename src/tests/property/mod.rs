//! Property-based tests for OneHand
//!
//! This module contains property-based tests using the proptest framework.
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Running Property Tests
//!
//! Run all property tests:
//! ```sh
//! cargo test property --release
//! ```
//!
//! Run a specific property test module:
//! ```sh
//! cargo test property::wizard_gating_props --release
//! ```
//!
//! ## Test Modules
//!
//! - `wizard_gating_props`: Tests for step navigation in the creation wizard
//!   - Advancing never skips a step
//!   - An invalid basic-info field always blocks the step
//!   - Going back never validates and never leaves errors behind
//!   - The step index stays within 1..=4 under any command sequence
//!
//! - `location_props`: Tests for the encoded campaign location
//!   - Comma-free countries survive a round trip through `location`
//!   - Countries containing a comma are always rejected
//!   - The encoded form always splits on the country's end
//!
//! - `media_size_props`: Tests for main image staging
//!   - Files up to 5 MiB are accepted
//!   - Larger files are rejected and keep the previous selection
//!   - Non-image MIME types are rejected regardless of size
//!
//! ## Configuration
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable:
//!
//! ```sh
//! PROPTEST_CASES=1000 cargo test property --release
//! ```

mod location_props;
mod media_size_props;
mod wizard_gating_props;
