//! HTTP client for the Electrolux OCP appliance API.

use super::ApplianceApi;
use async_trait::async_trait;
use elx_common::{ApiError, Appliance, ApplianceId, ApplianceInfo};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-api-key";

/// Longest error body kept in an `ApiError::Status`.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct OcpConfig {
    pub base_url: String,
    pub api_key: String,
    /// Bearer token. Obtaining and refreshing it happens outside this client.
    pub access_token: String,
    pub timeout: Duration,
}

pub struct OcpClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoRequest<'a> {
    appliance_ids: Vec<&'a str>,
}

impl OcpClient {
    pub fn new(config: OcpConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&config.api_key)
                .map_err(|e| ApiError::Config(format!("invalid API key: {}", e)))?,
        );
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|e| ApiError::Config(format!("invalid access token: {}", e)))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout: config.timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(status_error(status, body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Http(err.to_string())
        }
    }
}

fn status_error(status: StatusCode, mut body: String) -> ApiError {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    ApiError::Status {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl ApplianceApi for OcpClient {
    async fn list_appliances(&self, include_state: bool) -> Result<Vec<Appliance>, ApiError> {
        debug!(include_state, "GET appliances");
        let request = self
            .client
            .get(self.url("/appliance/api/v2/appliances"))
            .query(&[("includeMetadata", include_state)]);
        self.send(request).await
    }

    async fn appliance_info(&self, ids: &[ApplianceId]) -> Result<Vec<ApplianceInfo>, ApiError> {
        debug!(count = ids.len(), "POST appliances/info");
        let body = InfoRequest {
            appliance_ids: ids.iter().map(ApplianceId::as_str).collect(),
        };
        let request = self
            .client
            .post(self.url("/appliance/api/v2/appliances/info"))
            .json(&body);
        self.send(request).await
    }
}
