//! OneHand backend client.
//!
//! [`OneHandClient`] owns the `reqwest::Client` and base URL. Endpoint groups
//! live in sibling modules as further `impl OneHandClient` blocks.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::{ApiError, Result};
use crate::config::ApiConfig;
use crate::core::session::AuthToken;

#[derive(Debug, Clone)]
pub struct OneHandClient {
    http: reqwest::Client,
    base_url: Url,
}

impl OneHandClient {
    /// Client with no request timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: Url::parse(&config.base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        debug!(%method, %url, "API request");
        Ok(self.http.request(method, url))
    }

    pub(crate) fn authed(
        &self,
        method: Method,
        path: &str,
        token: &AuthToken,
    ) -> Result<RequestBuilder> {
        Ok(self.request(method, path)?.bearer_auth(token.as_str()))
    }

    /// Map a non-2xx response to [`ApiError::Status`].
    pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "API error response");
        Err(ApiError::status(status.as_u16(), error_text))
    }

    /// `GET path` and decode a JSON body. 404 becomes [`ApiError::NotFound`].
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&AuthToken>,
    ) -> Result<T> {
        let request = match token {
            Some(token) => self.authed(Method::GET, path, token)?,
            None => self.request(Method::GET, path)?,
        };
        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }
}
