//! Wire models for the OneHand backend.
//!
//! The backend is loose about types (ids and counters arrive as either
//! strings or numbers) and about casing (`mainimage`, `isvolunteer`), so
//! deserialization is lenient and every field has a default.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::{ApiError, Result};
use crate::core::campaign::wizard::Address;

/// Preset donation amounts offered before the custom option.
pub const DONATION_PRESETS: [u32; 4] = [25, 50, 100, 250];

// ============================================================================
// Campaign
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Campaign {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub description: String,
    /// Encoded `"<country>,<city>"`.
    pub location: String,
    pub date: String,
    pub donation_goal: f64,
    pub current_donation: f64,
    pub category: String,
    pub is_featured: bool,
    #[serde(rename = "mainimage")]
    pub main_image: String,
    pub user_profile: Option<UserProfile>,
    pub days_left: Option<i64>,
    pub short_description: String,
    #[serde(deserialize_with = "string_or_number")]
    pub volunteers: String,
    #[serde(rename = "donatercount", deserialize_with = "string_or_number")]
    pub donor_count: String,
    #[serde(rename = "isvolunteer")]
    pub is_volunteer: bool,
}

impl Campaign {
    /// Funding progress in percent, capped at 100.
    pub fn progress_percent(&self) -> u16 {
        if self.donation_goal <= 0.0 {
            return 0;
        }
        let pct = (self.current_donation / self.donation_goal * 100.0).clamp(0.0, 100.0);
        pct.round() as u16
    }

    pub fn address(&self) -> Option<Address> {
        Address::from_location(&self.location)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub avatar: String,
    pub verified: bool,
    pub roles: String,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

// ============================================================================
// Donation / Volunteer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Donation {
    pub campaign_id: String,
    pub amount: String,
}

impl Donation {
    /// Custom amount; must parse as a positive number.
    pub fn new(campaign_id: impl Into<String>, amount: &str) -> Result<Self> {
        let amount = amount.trim();
        let valid = amount
            .parse::<f64>()
            .map(|a| a.is_finite() && a > 0.0)
            .unwrap_or(false);
        if !valid {
            return Err(ApiError::Invalid(format!(
                "Donation amount must be a positive number, got {:?}",
                amount
            )));
        }
        Ok(Self {
            campaign_id: campaign_id.into(),
            amount: amount.to_string(),
        })
    }

    /// One of [`DONATION_PRESETS`] by index.
    pub fn preset(campaign_id: impl Into<String>, index: usize) -> Result<Self> {
        let amount = DONATION_PRESETS
            .get(index)
            .ok_or_else(|| ApiError::Invalid(format!("No donation preset #{}", index)))?;
        Self::new(campaign_id, &amount.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolunteerApplication {
    pub campaign_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: String,
    pub availability: String,
    pub experience: String,
    pub agreed_to_terms: bool,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

impl VolunteerApplication {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Invalid("Name is required".to_string()));
        }
        if !email_regex().is_match(self.email.trim()) {
            return Err(ApiError::Invalid("A valid email is required".to_string()));
        }
        if !self.agreed_to_terms {
            return Err(ApiError::Invalid(
                "You must agree to the volunteer terms".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("First name", &self.first_name),
            ("Last name", &self.last_name),
            ("Username", &self.username),
            ("Password", &self.password),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(ApiError::Invalid(format!("{} is required", label)));
            }
        }
        if !email_regex().is_match(self.email.trim()) {
            return Err(ApiError::Invalid("A valid email is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct VerifyCodeRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

/// Outcome of a verification-email request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailDispatch {
    Sent,
    /// Skipped; an email went to this address within the dedup window.
    AlreadySent,
}

// ============================================================================
// Helpers
// ============================================================================

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
