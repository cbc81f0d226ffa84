//! Remote access to the theme preference endpoint.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::Serialize;
use tracing::debug;

use super::error::PreferenceSyncError;
use super::model::{Theme, ThemePreference};
use crate::config::Configuration;

pub const PREFERENCE_PATH: &str = "/api/preferences/theme/";

/// Header carrying the authenticated user, set by the session layer in front of the API.
pub const USER_HEADER: &str = "x-user-id";

/// Reads and writes a user's theme preference.
pub trait PreferenceTransport: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<ThemePreference, PreferenceSyncError>> + Send;

    fn store(
        &self,
        theme: Theme,
    ) -> impl Future<Output = Result<ThemePreference, PreferenceSyncError>> + Send;
}

impl<T: PreferenceTransport> PreferenceTransport for Arc<T> {
    fn fetch(&self) -> impl Future<Output = Result<ThemePreference, PreferenceSyncError>> + Send {
        (**self).fetch()
    }

    fn store(
        &self,
        theme: Theme,
    ) -> impl Future<Output = Result<ThemePreference, PreferenceSyncError>> + Send {
        (**self).store(theme)
    }
}

/// HTTP transport: `GET`/`PATCH {api_base_url}/api/preferences/theme/`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    user: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct ThemeUpdate {
    theme: Theme,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        user: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PreferenceSyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PreferenceSyncError::Network(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), PREFERENCE_PATH),
            user: user.into(),
            timeout,
        })
    }

    /// Transport for `user` against the configured API with its timeout.
    pub fn from_config(
        config: &Configuration,
        user: impl Into<String>,
    ) -> Result<Self, PreferenceSyncError> {
        Self::new(&config.api_base_url, user, config.api_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, err: reqwest::Error) -> PreferenceSyncError {
        if err.is_timeout() {
            PreferenceSyncError::Timeout(self.timeout)
        } else if err.is_decode() {
            PreferenceSyncError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            PreferenceSyncError::Status {
                status: status.as_u16(),
            }
        } else {
            PreferenceSyncError::Network(err.to_string())
        }
    }

    async fn decode(&self, response: Response) -> Result<ThemePreference, PreferenceSyncError> {
        let status = response.status();
        if !status.is_success() {
            return Err(PreferenceSyncError::Status {
                status: status.as_u16(),
            });
        }
        response
            .json::<ThemePreference>()
            .await
            .map_err(|e| self.classify(e))
    }
}

impl PreferenceTransport for HttpTransport {
    async fn fetch(&self) -> Result<ThemePreference, PreferenceSyncError> {
        debug!(endpoint = %self.endpoint, "fetching theme preference");
        let response = self
            .client
            .get(&self.endpoint)
            .header(USER_HEADER, &self.user)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        self.decode(response).await
    }

    async fn store(&self, theme: Theme) -> Result<ThemePreference, PreferenceSyncError> {
        debug!(endpoint = %self.endpoint, %theme, "storing theme preference");
        let response = self
            .client
            .patch(&self.endpoint)
            .header(USER_HEADER, &self.user)
            .json(&ThemeUpdate { theme })
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        self.decode(response).await
    }
}
