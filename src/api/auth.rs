//! Authentication endpoints.

use chrono::Utc;
use reqwest::multipart::Form;
use reqwest::Method;
use tracing::{debug, info, instrument, warn};

use super::client::OneHandClient;
use super::error::{ApiError, Result};
use super::models::{
    EmailDispatch, EmailRequest, LoginResponse, NewUser, UserProfile, VerifyCodeRequest,
};
use crate::core::dedup::DedupStore;
use crate::core::session::AuthToken;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/newuser";
pub const VERIFY_USER_PATH: &str = "/api/auth/verifyuser";
pub const SEND_EMAIL_PATH: &str = "/api/auth/send-email";
pub const VERIFY_CODE_PATH: &str = "/api/auth/verify-code";

impl OneHandClient {
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthToken> {
        let form = Form::new()
            .text("intent", "login")
            .text("userName", username.trim().to_string())
            .text("password", password.to_string());
        let response = self
            .request(Method::POST, LOGIN_PATH)?
            .multipart(form)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let body: LoginResponse = response.json().await?;

        let token = AuthToken::new(body.token)
            .ok_or_else(|| ApiError::Invalid("Login returned an empty token".to_string()))?;
        info!("Logged in");
        Ok(token)
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn register(&self, user: &NewUser) -> Result<()> {
        user.validate()?;
        let form = Form::new()
            .text("intent", "register")
            .text("firstName", user.first_name.trim().to_string())
            .text("lastName", user.last_name.trim().to_string())
            .text("username", user.username.trim().to_string())
            .text("email", user.email.trim().to_string())
            .text("password", user.password.clone());
        let response = self
            .request(Method::POST, REGISTER_PATH)?
            .multipart(form)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Profile for `token`, or `None` if the backend does not accept it.
    pub async fn verify_user(&self, token: &AuthToken) -> Result<Option<UserProfile>> {
        let response = self
            .authed(Method::GET, VERIFY_USER_PATH, token)?
            .send()
            .await?;
        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "Session not accepted");
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    /// Ask the backend to email a verification code, at most once per dedup
    /// window per address. The address is recorded only after a successful
    /// send.
    #[instrument(skip(self, token, dedup))]
    pub async fn send_verification_email(
        &self,
        token: &AuthToken,
        email: &str,
        dedup: &dyn DedupStore,
    ) -> Result<EmailDispatch> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ApiError::Invalid("Email is required".to_string()));
        }

        // Claimed before sending so a concurrent caller sees the address as taken.
        if !dedup.try_record(email, Utc::now()).await {
            info!("Verification code already sent recently");
            return Ok(EmailDispatch::AlreadySent);
        }

        let sent = async {
            let response = self
                .authed(Method::POST, SEND_EMAIL_PATH, token)?
                .json(&EmailRequest { email })
                .send()
                .await?;
            Ok::<_, ApiError>(Self::ensure_success(response).await?)
        };
        if let Err(e) = sent.await {
            warn!("Failed to send verification email: {}", e);
            dedup.forget(email).await;
            return Err(e);
        }

        Ok(EmailDispatch::Sent)
    }

    #[instrument(skip(self, token, code, dedup))]
    pub async fn verify_code(
        &self,
        token: &AuthToken,
        email: &str,
        code: &str,
        dedup: &dyn DedupStore,
    ) -> Result<()> {
        let (email, code) = (email.trim(), code.trim());
        if email.is_empty() || code.is_empty() {
            return Err(ApiError::Invalid("Missing code or email".to_string()));
        }

        let response = self
            .authed(Method::POST, VERIFY_CODE_PATH, token)?
            .json(&VerifyCodeRequest { email, code })
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&error_text)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| "Invalid verification code".to_string());
            return Err(ApiError::status(status, message));
        }

        dedup.forget(email).await;
        info!("Email verified");
        Ok(())
    }
}
