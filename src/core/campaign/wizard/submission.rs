//! Submission assembly.
//!
//! Turns a finished [`DraftCampaign`] into the multipart body expected by
//! `POST /api/campaigns/create`. The address is decomposed into the
//! `location` field here and nowhere else.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use super::media::ImageFile;
use super::types::{DraftCampaign, WizardField};
use crate::core::session::AuthToken;

pub const CREATE_CAMPAIGN_PATH: &str = "/api/campaigns/create";

/// Multipart field carrying the main image.
pub const MAIN_IMAGE_FIELD: &str = "main";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Campaign is missing {}", .0.label())]
    Incomplete(WizardField),

    #[error("Campaign was rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid form part: {0}")]
    InvalidPart(String),
}

/// Immutable snapshot of a draft, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignSubmission {
    fields: Vec<(&'static str, String)>,
    image: Option<ImageFile>,
}

impl CampaignSubmission {
    pub fn from_draft(draft: &DraftCampaign) -> Result<Self, SubmissionError> {
        let category = draft
            .category
            .ok_or(SubmissionError::Incomplete(WizardField::Category))?;
        let end_date = draft
            .end_date
            .ok_or(SubmissionError::Incomplete(WizardField::EndDate))?;

        let fields = vec![
            ("title", draft.title.trim().to_string()),
            ("donationGoal", draft.donation_goal.trim().to_string()),
            ("country", draft.address.country().trim().to_string()),
            ("city", draft.address.city().trim().to_string()),
            ("shortDescription", draft.short_description().to_string()),
            ("category", category.id().to_string()),
            ("date", end_date.format(DATE_FORMAT).to_string()),
            ("location", draft.address.to_location()),
            ("description", draft.description_html.clone()),
            ("isvolunteer", draft.enable_volunteers.to_string()),
        ];

        Ok(Self {
            fields,
            image: draft.media.staged().map(|staged| staged.file.clone()),
        })
    }

    /// Text fields in the order they are written to the form.
    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn image(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }

    pub fn into_form(self) -> Result<Form, SubmissionError> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }

        if let Some(image) = self.image {
            let part = Part::bytes(image.bytes.to_vec())
                .file_name(image.file_name)
                .mime_str(&image.mime)
                .map_err(|e| SubmissionError::InvalidPart(e.to_string()))?;
            form = form.part(MAIN_IMAGE_FIELD, part);
        }

        Ok(form)
    }
}

/// Sends a finished submission to the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignSubmitter: Send + Sync {
    async fn submit(
        &self,
        submission: CampaignSubmission,
        token: &AuthToken,
    ) -> Result<(), SubmissionError>;
}
