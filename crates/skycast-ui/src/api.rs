//! HTTP client for the Skycast API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use skycast_core::{Location, LocationPatch, NetworkError, ReqwestErrorExt, WeatherSnapshot};
use skycast_weather::Forecast;
use thiserror::Error;
use url::Url;

const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Non-success response; `message` is the server's `error` field when present.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Invalid server response: {0}")]
    Decode(String),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text for the error banner. Server messages are shown as sent;
    /// transport failures get a short hint instead of the raw cause.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(e) => e.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Client for the `/api/locations` routes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    client: Arc<Client>,
}

impl ApiClient {
    /// Create a client for a server root such as `http://localhost:5000`.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidUrl` if the URL cannot be parsed.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::Network(e.into_network_error()))?;

        Ok(Self {
            base_url,
            client: Arc::new(client),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Check response status and extract the server's error message
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| format!("HTTP {}", status));

        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.without_url().into_network_error()))?;

        Self::check_response(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.without_url().to_string()))
    }

    pub async fn health(&self) -> Result<Health, ApiError> {
        self.send(self.client.get(self.url("health")?)).await
    }

    /// List tracked locations.
    pub async fn list_locations(&self) -> Result<Vec<Location>, ApiError> {
        tracing::debug!("Fetching locations");
        self.send(self.client.get(self.url("api/locations")?)).await
    }

    /// Track a new city.
    pub async fn add_location(&self, city: &str) -> Result<Location, ApiError> {
        tracing::debug!("Adding location: {}", city);
        let body = serde_json::json!({ "city": city });
        self.send(self.client.post(self.url("api/locations")?).json(&body))
            .await
    }

    pub async fn update_location(
        &self,
        id: &str,
        patch: &LocationPatch,
    ) -> Result<Location, ApiError> {
        self.send(
            self.client
                .put(self.url(&format!("api/locations/{}", id))?)
                .json(patch),
        )
        .await
    }

    pub async fn delete_location(&self, id: &str) -> Result<(), ApiError> {
        tracing::debug!("Deleting location: {}", id);
        let _: serde_json::Value = self
            .send(
                self.client
                    .delete(self.url(&format!("api/locations/{}", id))?),
            )
            .await?;
        Ok(())
    }

    /// Fetch current weather for a location and record it.
    pub async fn sync_location(&self, id: &str) -> Result<WeatherSnapshot, ApiError> {
        tracing::debug!("Syncing location: {}", id);
        self.send(
            self.client
                .post(self.url(&format!("api/locations/{}/sync", id))?),
        )
        .await
    }

    pub async fn forecast(&self, id: &str) -> Result<Forecast, ApiError> {
        self.send(
            self.client
                .get(self.url(&format!("api/locations/{}/forecast", id))?),
        )
        .await
    }

    pub async fn snapshots(&self, id: &str) -> Result<Vec<WeatherSnapshot>, ApiError> {
        self.send(
            self.client
                .get(self.url(&format!("api/locations/{}/snapshots", id))?),
        )
        .await
    }
}
