//! Test Fixtures
//!
//! Builders for wizard state. Every fixture pins "today" so date validation
//! does not depend on the machine clock.

use chrono::NaiveDate;

use crate::core::campaign::category::Category;
use crate::core::campaign::wizard::{ImageFile, Transition, WizardController, WizardStep};
use crate::core::session::AuthToken;

// =============================================================================
// Dates
// =============================================================================

/// Fixed "today" for wizard fixtures.
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

/// An end date comfortably after [`fixed_today`].
pub fn future_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date")
}

pub fn test_token() -> AuthToken {
    AuthToken::new("test-token").expect("non-empty token")
}

// =============================================================================
// Media
// =============================================================================

/// A JPEG-typed file of `size` bytes. Content is not decoded anywhere.
pub fn jpeg_of_size(size: usize) -> ImageFile {
    ImageFile::new("cover.jpg", "image/jpeg", vec![0xABu8; size])
}

// =============================================================================
// Wizard
// =============================================================================

/// Fill every basic-info field with valid values.
pub fn fill_basic_info(wizard: &mut WizardController) {
    wizard.set_title("Help Maria");
    wizard.set_donation_goal("5000");
    wizard
        .set_country("Kenya")
        .expect("country without comma");
    wizard.set_city("Nairobi");
    wizard.set_short_description("School fees for Maria");
    wizard.set_end_date(Some(future_end_date()));
}

/// A controller advanced with valid data until it sits on `step`.
pub fn wizard_at(step: WizardStep) -> WizardController {
    let mut wizard = WizardController::new().with_today(fixed_today());

    while wizard.current_step() != step {
        match wizard.current_step() {
            WizardStep::Category => wizard.select_category(Category::Education),
            WizardStep::BasicInfo => fill_basic_info(&mut wizard),
            WizardStep::Media => {
                wizard
                    .select_image(jpeg_of_size(1024))
                    .expect("small jpeg accepted");
            }
            WizardStep::Description => unreachable!("description is the last step"),
        }
        assert!(
            matches!(wizard.go_next(), Transition::Advanced(_)),
            "fixture data should pass step {}",
            wizard.current_step()
        );
    }

    wizard
}
