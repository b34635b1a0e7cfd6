//! Typed client for the OneHand backend REST API.
//!
//! All business logic (persistence, payments, auth, file storage) lives on
//! the backend; this module only shapes requests and decodes responses.

pub mod auth;
pub mod campaigns;
pub mod client;
pub mod error;
pub mod models;
pub mod upload;

pub use client::OneHandClient;
pub use error::{ApiError, Result};
pub use models::{
    Campaign, Donation, EmailDispatch, NewUser, UserProfile, VolunteerApplication,
    DONATION_PRESETS,
};
pub use upload::{CancellationToken, UploadError, UploadProgress, MAX_EDITOR_IMAGE_BYTES};
