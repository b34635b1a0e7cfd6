//! Campaign Creation Wizard
//!
//! Guides an organizer through creating a campaign in four steps:
//! 1. Category - Pick one entry from the fixed catalog
//! 2. Basic Info - Title, donation goal, location, short description, end date
//! 3. Media - Main image and the volunteer toggle
//! 4. Description - Rich-text body from the editor
//!
//! # Design Principles
//!
//! - **Linear**: Forward and backward by one step only, no skipping
//! - **Re-validated**: Advancing always re-checks the current step
//! - **Ephemeral**: The draft is discarded after a successful submission
//! - **Strict**: A failed submission keeps the organizer on the final step

mod controller;
mod media;
mod submission;
mod types;
mod validators;

pub use controller::*;
pub use media::*;
pub use submission::*;
pub use types::*;
pub use validators::*;
