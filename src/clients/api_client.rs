//! Tencent Cloud API client
//!
//! Sends signed API 3.0 requests and hands back the raw JSON body. Response
//! interpretation lives in [`crate::response`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use reqwest::header::{AUTHORIZATION, CONNECTION, CONTENT_TYPE, HOST};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::signature::{self, SigningInput};
use crate::core::config::{Credential, HttpProfile, ResolvedConfig};
use crate::errors::ScfError;

pub const SCF_SERVICE: &str = "scf";
pub const SCF_API_VERSION: &str = "2018-04-16";
const REQUEST_CLIENT: &str = "SDK_RUST_TENCENTSERVERLESS";

// Shared so that keep-alive connections survive across per-call clients.
static HTTP_CLIENT: std::sync::LazyLock<Client> =
    std::sync::LazyLock::new(|| Client::builder().build().unwrap_or_else(|_| Client::new()));

/// Something that can perform a Tencent Cloud API action and return the raw
/// response body.
#[async_trait]
pub trait CloudApi: Send + Sync {
    async fn call(&self, action: &str, params: &Value) -> Result<String, ScfError>;
}

/// Builds a [`CloudApi`] for one resolved configuration.
pub trait Connector: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the configuration cannot produce a usable client.
    fn connect(&self, config: &ResolvedConfig) -> Result<Arc<dyn CloudApi>, ScfError>;
}

/// Connects to the real SCF API over HTTPS.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn connect(&self, config: &ResolvedConfig) -> Result<Arc<dyn CloudApi>, ScfError> {
        Ok(Arc::new(ScfApiClient::new(
            config.credential.clone(),
            config.region.clone(),
            config.profile.clone(),
        )))
    }
}

/// SCF API client bound to one credential, region and profile.
#[derive(Debug, Clone)]
pub struct ScfApiClient {
    credential: Credential,
    region: String,
    profile: HttpProfile,
}

impl ScfApiClient {
    #[must_use]
    pub fn new(credential: Credential, region: String, profile: HttpProfile) -> Self {
        Self {
            credential,
            region,
            profile,
        }
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn profile(&self) -> &HttpProfile {
        &self.profile
    }

    fn url(&self) -> Result<Url, ScfError> {
        Url::parse(&format!("https://{}/", self.profile.endpoint)).map_err(|e| {
            ScfError::InvalidRequest(format!("invalid endpoint '{}': {e}", self.profile.endpoint))
        })
    }

    fn secrets(&self) -> Result<(&str, &str), ScfError> {
        match (
            self.credential.secret_id.as_deref(),
            self.credential.secret_key.as_deref(),
        ) {
            (Some(id), Some(key)) => Ok((id, key)),
            _ => Err(ScfError::InvalidRequest(
                "missing Tencent Cloud credentials: set secret_id/secret_key or \
                 TENCENTCLOUD_SECRETID/TENCENTCLOUD_SECRETKEY"
                    .to_string(),
            )),
        }
    }

    /// Build the signed `action` request for `params` at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing, the endpoint is invalid,
    /// or the payload cannot be serialized or signed.
    pub fn build_request(
        &self,
        action: &str,
        params: &Value,
        timestamp: i64,
    ) -> Result<RequestBuilder, ScfError> {
        let (secret_id, secret_key) = self.secrets()?;
        let url = self.url()?;
        let payload = serde_json::to_string(params)?;

        let authorization = signature::authorization_header(&SigningInput {
            secret_id,
            secret_key,
            service: SCF_SERVICE,
            host: &self.profile.endpoint,
            payload: &payload,
            timestamp,
        })?;

        let mut request = HTTP_CLIENT
            .post(url)
            .timeout(self.profile.req_timeout)
            .header(HOST, &self.profile.endpoint)
            .header(CONTENT_TYPE, signature::CONTENT_TYPE)
            .header(AUTHORIZATION, authorization)
            .header("X-TC-Action", action)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Version", SCF_API_VERSION)
            .header("X-TC-Region", &self.region)
            .header("X-TC-RequestClient", REQUEST_CLIENT)
            .body(payload);

        if let Some(token) = self.credential.token.as_deref() {
            request = request.header("X-TC-Token", token);
        }
        if !self.profile.keep_alive {
            request = request.header(CONNECTION, "close");
        }

        Ok(request)
    }
}

#[async_trait]
impl CloudApi for ScfApiClient {
    async fn call(&self, action: &str, params: &Value) -> Result<String, ScfError> {
        let request = self.build_request(action, params, chrono::Utc::now().timestamp())?;

        debug!(
            action,
            endpoint = %self.profile.endpoint,
            region = %self.region,
            "Calling Tencent Cloud API"
        );

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(action, %status, "Tencent Cloud API returned HTTP error");
            return Err(ScfError::HttpError(format!(
                "{action} returned HTTP {status}: {body}"
            )));
        }

        Ok(body)
    }
}
