//! Campaign endpoints.

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Method;
use tracing::{info, instrument, warn};

use super::client::OneHandClient;
use super::error::{ApiError, Result};
use super::models::{Campaign, Donation, VolunteerApplication};
use crate::core::campaign::wizard::{
    CampaignSubmission, CampaignSubmitter, SubmissionError, CREATE_CAMPAIGN_PATH,
};
use crate::core::session::AuthToken;

pub const CAMPAIGNS_PATH: &str = "/api/campaigns";
pub const FEATURED_PATH: &str = "/api/campaigns/featured";
pub const GET_CAMPAIGN_PATH: &str = "/api/campaigns/getcampaign";
pub const ORGANIZER_PATH: &str = "/api/campaigns/filter/organizer";
pub const DONATE_PATH: &str = "/api/campaigns/donate";
pub const VOLUNTEER_PATH: &str = "/api/campaigns/volunteer";

impl OneHandClient {
    pub async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        self.get_json(CAMPAIGNS_PATH, None).await
    }

    pub async fn featured_campaigns(&self) -> Result<Vec<Campaign>> {
        self.get_json(FEATURED_PATH, None).await
    }

    pub async fn get_campaign(&self, id: &str) -> Result<Campaign> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::Invalid("Campaign id is required".to_string()));
        }
        self.get_json(&format!("{}/{}", GET_CAMPAIGN_PATH, id), None)
            .await
    }

    /// Campaigns organized by the session's user.
    pub async fn my_campaigns(&self, token: &AuthToken) -> Result<Vec<Campaign>> {
        self.get_json(ORGANIZER_PATH, Some(token)).await
    }

    /// `POST /api/campaigns/create` with the assembled multipart body.
    #[instrument(skip_all)]
    pub async fn create_campaign(
        &self,
        submission: CampaignSubmission,
        token: &AuthToken,
    ) -> Result<()> {
        let form = submission
            .into_form()
            .map_err(|e| ApiError::Invalid(e.to_string()))?;
        let response = self
            .authed(Method::POST, CREATE_CAMPAIGN_PATH, token)?
            .multipart(form)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        info!("Campaign created");
        Ok(())
    }

    #[instrument(skip(self, token), fields(campaign = %donation.campaign_id))]
    pub async fn donate(&self, token: &AuthToken, donation: &Donation) -> Result<()> {
        // Fields are public; re-check the amount rule before sending.
        Donation::new(donation.campaign_id.as_str(), &donation.amount)?;
        let form = Form::new()
            .text("id", donation.campaign_id.clone())
            .text("amount", donation.amount.clone())
            .text("intent", "donate");
        let response = self
            .authed(Method::POST, DONATE_PATH, token)?
            .multipart(form)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    #[instrument(skip(self, token, application), fields(campaign = %application.campaign_id))]
    pub async fn volunteer(
        &self,
        token: &AuthToken,
        application: &VolunteerApplication,
    ) -> Result<()> {
        application.validate()?;
        let form = Form::new()
            .text("id", application.campaign_id.clone())
            .text("name", application.name.trim().to_string())
            .text("email", application.email.trim().to_string())
            .text("phone", application.phone.clone())
            .text("skills", application.skills.clone())
            .text("availability", application.availability.clone())
            .text("experience", application.experience.clone())
            .text("intent", "volunteer");
        let response = self
            .authed(Method::POST, VOLUNTEER_PATH, token)?
            .multipart(form)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CampaignSubmitter for OneHandClient {
    async fn submit(
        &self,
        submission: CampaignSubmission,
        token: &AuthToken,
    ) -> std::result::Result<(), SubmissionError> {
        self.create_campaign(submission, token)
            .await
            .map_err(|e| {
                warn!("Create campaign failed: {}", e);
                SubmissionError::from(e)
            })
    }
}

impl From<ApiError> for SubmissionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, body } => SubmissionError::Rejected { status, body },
            ApiError::NotFound(path) => SubmissionError::Rejected {
                status: 404,
                body: path,
            },
            ApiError::Invalid(msg) => SubmissionError::InvalidPart(msg),
            other => SubmissionError::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_maps_to_submission_error() {
        assert_eq!(
            SubmissionError::from(ApiError::status(422, "bad")),
            SubmissionError::Rejected {
                status: 422,
                body: "bad".to_string()
            }
        );
        assert!(matches!(
            SubmissionError::from(ApiError::Invalid("mime".into())),
            SubmissionError::InvalidPart(_)
        ));
    }

    #[tokio::test]
    async fn test_get_campaign_rejects_blank_id() {
        let client = OneHandClient::new("http://localhost:1").unwrap();
        assert!(matches!(
            client.get_campaign("  ").await,
            Err(ApiError::Invalid(_))
        ));
    }
}
