//! Wizard Domain Types
//!
//! Defines the core domain types for the campaign creation wizard:
//! - [`WizardStep`]: The four steps, in order
//! - [`WizardField`]: Keys of the per-field error map
//! - [`Address`]: Country/city value object, encoded as `location` on submit
//! - [`DraftCampaign`]: Accumulating draft state filled in across steps
//!
//! # Architecture
//!
//! The wizard is a strictly linear state machine. Each step collects a subset
//! of [`DraftCampaign`] and the controller only moves one step at a time.
//! The draft lives exactly as long as one creation session.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::media::MediaStaging;
use crate::core::campaign::category::Category;

/// Upper bound on the short description, in characters.
pub const SHORT_DESCRIPTION_MAX_CHARS: usize = 200;

// ============================================================================
// WizardStep
// ============================================================================

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Category,
    BasicInfo,
    Media,
    Description,
}

impl WizardStep {
    pub const COUNT: usize = 4;

    pub const ALL: [WizardStep; WizardStep::COUNT] = [
        WizardStep::Category,
        WizardStep::BasicInfo,
        WizardStep::Media,
        WizardStep::Description,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Category => "category",
            WizardStep::BasicInfo => "basic_info",
            WizardStep::Media => "media",
            WizardStep::Description => "description",
        }
    }

    /// 1-based position in the flow.
    pub fn number(&self) -> usize {
        match self {
            WizardStep::Category => 1,
            WizardStep::BasicInfo => 2,
            WizardStep::Media => 3,
            WizardStep::Description => 4,
        }
    }

    pub fn from_number(number: usize) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|idx| WizardStep::ALL.get(idx))
            .copied()
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Category => "Category",
            WizardStep::BasicInfo => "Basic Info",
            WizardStep::Media => "Media & Options",
            WizardStep::Description => "Description",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            WizardStep::Category => "Choose campaign type",
            WizardStep::BasicInfo => "Campaign details",
            WizardStep::Media => "Image & volunteers",
            WizardStep::Description => "Rich content",
        }
    }

    /// Get the next step in the wizard flow (None if at the end)
    pub fn next(&self) -> Option<Self> {
        match self {
            WizardStep::Category => Some(WizardStep::BasicInfo),
            WizardStep::BasicInfo => Some(WizardStep::Media),
            WizardStep::Media => Some(WizardStep::Description),
            WizardStep::Description => None,
        }
    }

    /// Get the previous step in the wizard flow (None if at the beginning)
    pub fn previous(&self) -> Option<Self> {
        match self {
            WizardStep::Category => None,
            WizardStep::BasicInfo => Some(WizardStep::Category),
            WizardStep::Media => Some(WizardStep::BasicInfo),
            WizardStep::Description => Some(WizardStep::Media),
        }
    }

    /// The final step submits instead of advancing.
    pub fn is_final(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for WizardStep {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        WizardStep::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("Unknown wizard step: {}", s))
    }
}

// ============================================================================
// WizardField
// ============================================================================

/// Keys of the per-field error map rendered next to each input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WizardField {
    Category,
    Title,
    DonationGoal,
    Country,
    City,
    ShortDescription,
    EndDate,
    MainImage,
}

impl WizardField {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardField::Category => "category",
            WizardField::Title => "title",
            WizardField::DonationGoal => "donationGoal",
            WizardField::Country => "country",
            WizardField::City => "city",
            WizardField::ShortDescription => "shortDescription",
            WizardField::EndDate => "endDate",
            WizardField::MainImage => "mainImage",
        }
    }

    /// Human label used in "<label> is required" messages.
    pub fn label(&self) -> &'static str {
        match self {
            WizardField::Category => "Campaign category",
            WizardField::Title => "Campaign title",
            WizardField::DonationGoal => "Donation goal",
            WizardField::Country => "Country",
            WizardField::City => "City",
            WizardField::ShortDescription => "Short description",
            WizardField::EndDate => "Campaign end date",
            WizardField::MainImage => "Campaign image",
        }
    }

    /// The step on which this field is collected.
    pub fn step(&self) -> WizardStep {
        match self {
            WizardField::Category => WizardStep::Category,
            WizardField::Title
            | WizardField::DonationGoal
            | WizardField::Country
            | WizardField::City
            | WizardField::ShortDescription
            | WizardField::EndDate => WizardStep::BasicInfo,
            WizardField::MainImage => WizardStep::Media,
        }
    }
}

impl fmt::Display for WizardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Address
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Country cannot contain a comma")]
    CommaInCountry,
}

/// Campaign location as entered on the basic-info step.
///
/// Stored as two parts and joined into the backend's `"<country>,<city>"`
/// string only when the submission is assembled. The country may not contain
/// a comma because the encoded form is split on the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    country: String,
    city: String,
}

impl Address {
    pub fn new(country: &str, city: &str) -> Result<Self, AddressError> {
        let mut address = Address::default();
        address.set_country(country)?;
        address.set_city(city);
        Ok(address)
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Replace the country. On error the previous value is kept.
    pub fn set_country(&mut self, value: &str) -> Result<(), AddressError> {
        if value.contains(',') {
            return Err(AddressError::CommaInCountry);
        }
        self.country = value.to_string();
        Ok(())
    }

    pub fn set_city(&mut self, value: &str) {
        self.city = value.to_string();
    }

    pub fn is_complete(&self) -> bool {
        !self.country.trim().is_empty() && !self.city.trim().is_empty()
    }

    /// Encoded `location` form field.
    pub fn to_location(&self) -> String {
        format!("{},{}", self.country.trim(), self.city.trim())
    }

    /// Decode a `location` string produced by [`Address::to_location`].
    pub fn from_location(location: &str) -> Option<Self> {
        let (country, city) = location.split_once(',')?;
        Some(Self {
            country: country.trim().to_string(),
            city: city.trim().to_string(),
        })
    }
}

// ============================================================================
// DraftCampaign
// ============================================================================

/// Mutable aggregate of everything collected by the wizard.
///
/// Created empty when the wizard mounts and dropped after a successful
/// submission; nothing is persisted between sessions.
#[derive(Debug, Clone, Default)]
pub struct DraftCampaign {
    /// Step 1
    pub category: Option<Category>,

    // Step 2
    pub title: String,
    pub donation_goal: String,
    pub address: Address,
    short_description: String,
    pub end_date: Option<NaiveDate>,

    // Step 3
    pub media: MediaStaging,
    pub enable_volunteers: bool,

    /// Step 4, latest editor output
    pub description_html: String,
}

impl DraftCampaign {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    /// Set the short description, dropping characters past the limit.
    pub fn set_short_description(&mut self, value: &str) {
        self.short_description = value
            .chars()
            .take(SHORT_DESCRIPTION_MAX_CHARS)
            .collect();
    }

    pub fn has_main_image(&self) -> bool {
        self.media.staged().is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_navigation_is_linear() {
        assert_eq!(WizardStep::Category.next(), Some(WizardStep::BasicInfo));
        assert_eq!(WizardStep::Description.next(), None);
        assert_eq!(WizardStep::Category.previous(), None);
        assert_eq!(WizardStep::Media.previous(), Some(WizardStep::BasicInfo));
        assert!(WizardStep::Description.is_final());
        assert!(!WizardStep::Media.is_final());
    }

    #[test]
    fn test_step_numbers_are_one_based() {
        for (idx, step) in WizardStep::ALL.iter().enumerate() {
            assert_eq!(step.number(), idx + 1);
            assert_eq!(WizardStep::from_number(idx + 1), Some(*step));
        }
        assert_eq!(WizardStep::from_number(0), None);
        assert_eq!(WizardStep::from_number(5), None);
    }

    #[test]
    fn test_step_string_conversion() {
        assert_eq!(WizardStep::try_from("media"), Ok(WizardStep::Media));
        assert!(WizardStep::try_from("review").is_err());
        assert_eq!(WizardStep::BasicInfo.to_string(), "basic_info");
    }

    #[test]
    fn test_field_keys() {
        assert_eq!(WizardField::DonationGoal.as_str(), "donationGoal");
        assert_eq!(WizardField::City.to_string(), "city");
        assert_eq!(WizardField::EndDate.step(), WizardStep::BasicInfo);
        assert_eq!(WizardField::MainImage.step(), WizardStep::Media);
    }

    #[test]
    fn test_address_location_encoding() {
        let address = Address::new("US", "Springfield").unwrap();
        assert_eq!(address.to_location(), "US,Springfield");

        let decoded = Address::from_location("US,Springfield").unwrap();
        assert_eq!(decoded, address);
    }

    #[test]
    fn test_address_city_may_contain_commas() {
        let address = Address::new("US", "Springfield, Illinois").unwrap();
        let decoded = Address::from_location(&address.to_location()).unwrap();
        assert_eq!(decoded.city(), "Springfield, Illinois");
    }

    #[test]
    fn test_address_rejects_comma_in_country_and_keeps_previous() {
        let mut address = Address::new("Kenya", "Nairobi").unwrap();
        assert_eq!(address.set_country("Kenya, East Africa"), Err(AddressError::CommaInCountry));
        assert_eq!(address.country(), "Kenya");
    }

    #[test]
    fn test_address_completeness_ignores_whitespace() {
        let address = Address::new("  ", "Nairobi").unwrap();
        assert!(!address.is_complete());
        assert!(Address::new("Kenya", "Nairobi").unwrap().is_complete());
    }

    #[test]
    fn test_short_description_is_capped() {
        let mut draft = DraftCampaign::new();
        draft.set_short_description(&"é".repeat(250));
        assert_eq!(draft.short_description().chars().count(), SHORT_DESCRIPTION_MAX_CHARS);
    }

    #[test]
    fn test_new_draft_is_empty() {
        let draft = DraftCampaign::new();
        assert!(draft.category.is_none());
        assert!(draft.title.is_empty());
        assert!(draft.end_date.is_none());
        assert!(!draft.has_main_image());
        assert!(!draft.enable_volunteers);
        assert!(draft.description_html.is_empty());
    }
}
