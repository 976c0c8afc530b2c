//! Shared HTTP plumbing for availability providers.

use std::time::Duration;

use evmap_core::AppConfig;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::error::{AvailabilityError, RemoteCause};

/// Transport settings shared by every provider client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl HttpSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.http_timeout_secs,
            connect_timeout_secs: config.http_connect_timeout_secs,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 10,
            user_agent: "evmap/0.1 (availability)".to_string(),
        }
    }
}

/// Build the `reqwest::Client` shared by all detectors.
///
/// # Errors
///
/// Returns [`AvailabilityError::ClientBuild`] if the TLS backend cannot be
/// initialised.
pub fn build_client(settings: &HttpSettings) -> Result<Client, AvailabilityError> {
    Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .user_agent(settings.user_agent.as_str())
        .build()
        .map_err(AvailabilityError::ClientBuild)
}

/// Parse `base_url`, normalised to end with exactly one slash so relative
/// paths are joined below it rather than replacing its last segment.
///
/// # Errors
///
/// Returns [`AvailabilityError::InvalidBaseUrl`] if the URL does not parse.
pub fn normalize_base_url(base_url: &str) -> Result<Url, AvailabilityError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| AvailabilityError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

/// A provider's base URL bound to the shared client.
#[derive(Debug, Clone)]
pub struct ProviderHttp {
    client: Client,
    base_url: Url,
    provider: &'static str,
}

impl ProviderHttp {
    /// # Errors
    ///
    /// Returns [`AvailabilityError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        client: Client,
        provider: &'static str,
        base_url: &str,
    ) -> Result<Self, AvailabilityError> {
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
            provider,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, AvailabilityError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AvailabilityError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// `GET {base}{path}?{query}` and decode the JSON body as `T`.
    ///
    /// # Errors
    ///
    /// - [`AvailabilityError::RemoteUnavailable`] on network failure, timeout
    ///   or a non-2xx status.
    /// - [`AvailabilityError::Parse`] if the body is empty or does not decode.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AvailabilityError> {
        self.get_json_with_headers(path, query, &[]).await
    }

    /// Like [`Self::get_json`], with extra request headers (API tokens).
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_json`].
    pub async fn get_json_with_headers<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<T, AvailabilityError> {
        let url = self.url(path)?;
        let mut request = self.client.get(url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.send_json(request, &url).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, AvailabilityError> {
        tracing::debug!(provider = self.provider, %url, "provider request");

        let response = request.send().await.map_err(|e| self.remote(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AvailabilityError::RemoteUnavailable {
                provider: self.provider.to_owned(),
                url: url.to_string(),
                cause: RemoteCause::Status(status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| self.remote(url, e))?;
        if body.trim().is_empty() {
            return Err(AvailabilityError::parse(
                self.provider,
                url.path(),
                "empty response body",
            ));
        }
        serde_json::from_str(&body)
            .map_err(|e| AvailabilityError::parse(self.provider, url.path(), e))
    }

    fn remote(&self, url: &Url, error: reqwest::Error) -> AvailabilityError {
        let cause = if error.is_timeout() {
            RemoteCause::Timeout
        } else {
            RemoteCause::Http(error)
        };
        AvailabilityError::RemoteUnavailable {
            provider: self.provider.to_owned(),
            url: url.to_string(),
            cause,
        }
    }
}
