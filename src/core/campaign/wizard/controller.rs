//! Wizard controller.
//!
//! Owns the current step, the draft and the per-field error map. Moving
//! forward always re-runs the current step's validator; nothing is cached, so
//! a field cleared after backing up has to be filled in again.
//!
//! Submission is split in two halves so the caller decides where the network
//! call runs: [`WizardController::go_next`] on the final step hands back a
//! [`CampaignSubmission`], and [`WizardController::finish_submission`] applies
//! the outcome. A failed submission keeps the wizard on the final step.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::media::{ImageFile, MediaError};
use super::submission::{CampaignSubmission, CampaignSubmitter, SubmissionError};
use super::types::{AddressError, DraftCampaign, WizardField, WizardStep};
use super::validators::{validate_step, ValidationIssue};
use crate::core::campaign::category::Category;
use crate::core::session::AuthToken;

/// Where the application should go after the wizard is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    CampaignList,
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Validation failed; see [`WizardController::errors`].
    Blocked,
    Advanced(WizardStep),
    /// Final step passed; send this and report back via `finish_submission`.
    ReadyToSubmit(CampaignSubmission),
    /// A submission is already running.
    InFlight,
    Navigate(Route),
    SubmissionFailed,
}

#[derive(Debug, Default)]
pub struct WizardController {
    step: WizardStep,
    draft: DraftCampaign,
    errors: BTreeMap<WizardField, ValidationIssue>,
    submitting: bool,
    submission_error: Option<SubmissionError>,
    today: Option<NaiveDate>,
}

impl WizardController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin "today" for date validation instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn current_step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &DraftCampaign {
        &self.draft
    }

    pub fn errors(&self) -> &BTreeMap<WizardField, ValidationIssue> {
        &self.errors
    }

    pub fn error_for(&self, field: WizardField) -> Option<&ValidationIssue> {
        self.errors.get(&field)
    }

    pub fn media_error(&self) -> Option<&MediaError> {
        self.draft.media.error()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submission_error(&self) -> Option<&SubmissionError> {
        self.submission_error.as_ref()
    }

    // ------------------------------------------------------------------------
    // Field input
    // ------------------------------------------------------------------------

    pub fn select_category(&mut self, category: Category) {
        self.draft.category = Some(category);
    }

    pub fn set_title(&mut self, value: &str) {
        self.draft.title = value.to_string();
    }

    pub fn set_donation_goal(&mut self, value: &str) {
        self.draft.donation_goal = value.to_string();
    }

    /// Reject commas at input time and show the problem next to the field.
    pub fn set_country(&mut self, value: &str) -> Result<(), AddressError> {
        match self.draft.address.set_country(value) {
            Ok(()) => {
                if matches!(self.errors.get(&WizardField::Country), Some(ValidationIssue::Address(_))) {
                    self.errors.remove(&WizardField::Country);
                }
                Ok(())
            }
            Err(e) => {
                self.errors.insert(WizardField::Country, e.clone().into());
                Err(e)
            }
        }
    }

    pub fn set_city(&mut self, value: &str) {
        self.draft.address.set_city(value);
    }

    pub fn set_short_description(&mut self, value: &str) {
        self.draft.set_short_description(value);
    }

    pub fn set_end_date(&mut self, date: Option<NaiveDate>) {
        self.draft.end_date = date;
    }

    pub fn select_image(&mut self, file: ImageFile) -> Result<(), MediaError> {
        self.draft.media.select_file(file)
    }

    pub fn remove_image(&mut self) {
        self.draft.media.remove_file();
    }

    pub fn set_enable_volunteers(&mut self, enabled: bool) {
        self.draft.enable_volunteers = enabled;
    }

    /// Editor callback; stores the latest HTML verbatim.
    pub fn on_editor_update(&mut self, html: &str) {
        self.draft.description_html = html.to_string();
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Retreat one step without validating. No-op on the first step.
    pub fn go_back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
            self.errors.clear();
        }
        self.step
    }

    pub fn go_next(&mut self) -> Transition {
        if self.submitting {
            return Transition::InFlight;
        }

        let validation = validate_step(self.step, &self.draft, self.today());
        self.errors = validation.errors;
        if !validation.valid {
            log::debug!(
                "Step {} blocked: {:?}",
                self.step,
                self.errors.keys().collect::<Vec<_>>()
            );
            return Transition::Blocked;
        }

        if let Some(next) = self.step.next() {
            self.step = next;
            log::debug!("Advanced to step {} ({})", next.number(), next);
            return Transition::Advanced(next);
        }

        match CampaignSubmission::from_draft(&self.draft) {
            Ok(submission) => {
                self.submitting = true;
                self.submission_error = None;
                Transition::ReadyToSubmit(submission)
            }
            Err(e) => {
                log::warn!("Cannot assemble campaign: {}", e);
                self.submission_error = Some(e);
                Transition::SubmissionFailed
            }
        }
    }

    /// Apply the outcome of a submission started by `go_next`.
    pub fn finish_submission(&mut self, result: Result<(), SubmissionError>) -> Transition {
        self.submitting = false;
        match result {
            Ok(()) => {
                log::info!("Campaign created");
                self.reset();
                Transition::Navigate(Route::CampaignList)
            }
            Err(e) => {
                log::warn!("Campaign submission failed: {}", e);
                self.submission_error = Some(e);
                Transition::SubmissionFailed
            }
        }
    }

    /// `go_next`, sending the submission inline when the final step passes.
    pub async fn advance(
        &mut self,
        submitter: &dyn CampaignSubmitter,
        token: &AuthToken,
    ) -> Transition {
        match self.go_next() {
            Transition::ReadyToSubmit(submission) => {
                let result = submitter.submit(submission, token).await;
                self.finish_submission(result)
            }
            other => other,
        }
    }

    /// Discard the draft and return to the first step.
    pub fn reset(&mut self) {
        let today = self.today;
        *self = Self::default();
        self.today = today;
    }

    fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
