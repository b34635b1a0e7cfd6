//! Per-step validation.
//!
//! Every validator is a pure function of the draft (and, for dates, the
//! current day). They never fail; problems come back as a [`StepValidation`]
//! whose error map the controller hands to the view.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::types::{AddressError, DraftCampaign, WizardField, WizardStep};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("Please choose a campaign category")]
    MissingCategory,

    #[error("{} is required", .0.label())]
    RequiredField(WizardField),

    #[error("Campaign end date cannot be in the past")]
    InvalidDate,

    #[error("Donation goal must be a positive number")]
    InvalidAmount,

    #[error("Campaign image is required")]
    MissingImage,

    #[error(transparent)]
    Address(#[from] AddressError),
}

/// Outcome of validating one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepValidation {
    pub valid: bool,
    pub errors: BTreeMap<WizardField, ValidationIssue>,
}

impl StepValidation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: BTreeMap::new(),
        }
    }

    pub fn from_errors(errors: BTreeMap<WizardField, ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Error map rendered as `field -> message`.
    pub fn messages(&self) -> BTreeMap<&'static str, String> {
        self.errors
            .iter()
            .map(|(field, issue)| (field.as_str(), issue.to_string()))
            .collect()
    }
}

/// Run the validator registered for `step`.
pub fn validate_step(step: WizardStep, draft: &DraftCampaign, today: NaiveDate) -> StepValidation {
    match step {
        WizardStep::Category => validate_category(draft),
        WizardStep::BasicInfo => validate_basic_info(draft, today),
        WizardStep::Media => validate_media(draft),
        WizardStep::Description => validate_description(draft),
    }
}

pub fn validate_category(draft: &DraftCampaign) -> StepValidation {
    let mut errors = BTreeMap::new();
    if draft.category.is_none() {
        errors.insert(WizardField::Category, ValidationIssue::MissingCategory);
    }
    StepValidation::from_errors(errors)
}

/// Title, goal, country, city and end date are required. The end date is
/// compared against `today` here rather than trusted from the date picker.
pub fn validate_basic_info(draft: &DraftCampaign, today: NaiveDate) -> StepValidation {
    let mut errors = BTreeMap::new();

    let required = [
        (WizardField::Title, draft.title.as_str()),
        (WizardField::DonationGoal, draft.donation_goal.as_str()),
        (WizardField::Country, draft.address.country()),
        (WizardField::City, draft.address.city()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.insert(field, ValidationIssue::RequiredField(field));
        }
    }

    if !errors.contains_key(&WizardField::DonationGoal) && !is_positive_amount(&draft.donation_goal) {
        errors.insert(WizardField::DonationGoal, ValidationIssue::InvalidAmount);
    }

    match draft.end_date {
        None => {
            errors.insert(
                WizardField::EndDate,
                ValidationIssue::RequiredField(WizardField::EndDate),
            );
        }
        Some(date) if date < today => {
            errors.insert(WizardField::EndDate, ValidationIssue::InvalidDate);
        }
        Some(_) => {}
    }

    StepValidation::from_errors(errors)
}

pub fn validate_media(draft: &DraftCampaign) -> StepValidation {
    let mut errors = BTreeMap::new();
    if !draft.has_main_image() {
        errors.insert(WizardField::MainImage, ValidationIssue::MissingImage);
    }
    StepValidation::from_errors(errors)
}

/// The rich-text description may be empty.
pub fn validate_description(_draft: &DraftCampaign) -> StepValidation {
    StepValidation::ok()
}

/// `true` for a finite decimal greater than zero.
pub fn is_positive_amount(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .map(|amount| amount.is_finite() && amount > 0.0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::campaign::category::Category;
    use crate::core::campaign::wizard::media::ImageFile;
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn filled_basic_info() -> DraftCampaign {
        let mut draft = DraftCampaign::new();
        draft.title = "Help Maria".to_string();
        draft.donation_goal = "5000".to_string();
        draft.address.set_country("Kenya").unwrap();
        draft.address.set_city("Nairobi");
        draft.end_date = NaiveDate::from_ymd_opt(2025, 12, 31);
        draft
    }

    #[test]
    fn test_category_required() {
        let mut draft = DraftCampaign::new();
        let result = validate_category(&draft);
        assert!(!result.valid);
        assert_eq!(
            result.errors.get(&WizardField::Category),
            Some(&ValidationIssue::MissingCategory)
        );

        draft.category = Some(Category::Education);
        assert!(validate_category(&draft).valid);
    }

    #[test]
    fn test_category_validation_is_idempotent() {
        let mut draft = DraftCampaign::new();
        assert_eq!(validate_category(&draft), validate_category(&draft));
        draft.category = Some(Category::Arts);
        assert_eq!(validate_category(&draft), validate_category(&draft));
    }

    #[test]
    fn test_complete_basic_info_passes() {
        let result = validate_basic_info(&filled_basic_info(), today());
        assert!(result.valid, "unexpected errors: {:?}", result.messages());
    }

    #[rstest]
    #[case::title(WizardField::Title)]
    #[case::goal(WizardField::DonationGoal)]
    #[case::country(WizardField::Country)]
    #[case::city(WizardField::City)]
    fn test_blank_field_is_required(#[case] field: WizardField) {
        let mut draft = filled_basic_info();
        match field {
            WizardField::Title => draft.title = "   ".to_string(),
            WizardField::DonationGoal => draft.donation_goal.clear(),
            WizardField::Country => draft.address.set_country("").unwrap(),
            WizardField::City => draft.address.set_city(" "),
            _ => unreachable!(),
        }

        let result = validate_basic_info(&draft, today());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors.get(&field),
            Some(&ValidationIssue::RequiredField(field))
        );
    }

    #[test]
    fn test_missing_end_date_is_required() {
        let mut draft = filled_basic_info();
        draft.end_date = None;
        let result = validate_basic_info(&draft, today());
        assert_eq!(
            result.errors.get(&WizardField::EndDate),
            Some(&ValidationIssue::RequiredField(WizardField::EndDate))
        );
    }

    #[rstest]
    #[case::yesterday(2025, 5, 31, false)]
    #[case::today(2025, 6, 1, true)]
    #[case::tomorrow(2025, 6, 2, true)]
    fn test_end_date_must_not_be_past(
        #[case] y: i32,
        #[case] m: u32,
        #[case] d: u32,
        #[case] valid: bool,
    ) {
        let mut draft = filled_basic_info();
        draft.end_date = NaiveDate::from_ymd_opt(y, m, d);
        let result = validate_basic_info(&draft, today());
        assert_eq!(result.valid, valid);
        if !valid {
            assert_eq!(
                result.errors.get(&WizardField::EndDate),
                Some(&ValidationIssue::InvalidDate)
            );
        }
    }

    #[rstest]
    #[case("5000", true)]
    #[case(" 12.50 ", true)]
    #[case("0", false)]
    #[case("-10", false)]
    #[case("five thousand", false)]
    #[case("NaN", false)]
    #[case("inf", false)]
    fn test_positive_amount(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_positive_amount(input), expected);
    }

    #[test]
    fn test_non_numeric_goal_reports_invalid_amount() {
        let mut draft = filled_basic_info();
        draft.donation_goal = "lots".to_string();
        let result = validate_basic_info(&draft, today());
        assert_eq!(
            result.errors.get(&WizardField::DonationGoal),
            Some(&ValidationIssue::InvalidAmount)
        );
    }

    #[test]
    fn test_messages_are_keyed_by_field_name() {
        let draft = DraftCampaign::new();
        let messages = validate_basic_info(&draft, today()).messages();
        assert_eq!(messages.get("title").map(String::as_str), Some("Campaign title is required"));
        assert_eq!(messages.get("city").map(String::as_str), Some("City is required"));
        assert_eq!(
            messages.get("endDate").map(String::as_str),
            Some("Campaign end date is required")
        );
    }

    #[test]
    fn test_media_requires_staged_image() {
        let mut draft = DraftCampaign::new();
        assert_eq!(
            validate_media(&draft).errors.get(&WizardField::MainImage),
            Some(&ValidationIssue::MissingImage)
        );

        draft
            .media
            .select_file(ImageFile::new("a.jpg", "image/jpeg", vec![0u8; 8]))
            .unwrap();
        assert!(validate_media(&draft).valid);
    }

    #[test]
    fn test_description_always_passes() {
        assert!(validate_description(&DraftCampaign::new()).valid);
        assert!(validate_step(WizardStep::Description, &DraftCampaign::new(), today()).valid);
    }
}
