//! Public Series API client (`apis.datos.gob.ar/series`).
//!
//! One blocking GET per series. No retries, no caching: a transport error or a
//! non-2xx status surfaces immediately as a `FetchError`.

use super::normalize::{normalize_payload, parse_payload};
use super::provider::{FetchError, SeriesRequest, SeriesSource};
use crate::domain::TidySeries;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://apis.datos.gob.ar/series/api/series";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking HTTP client for the Series API.
pub struct SeriesApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl SeriesApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("econtrends/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Wrap an already configured `reqwest` client.
    pub fn with_client(client: reqwest::blocking::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Client against the public endpoint with the default timeout.
    pub fn public() -> Result<Self, FetchError> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fully qualified request URL for a series query.
    pub fn series_url(&self, request: &SeriesRequest) -> Result<Url, FetchError> {
        Url::parse_with_params(&self.base_url, request.query_pairs()).map_err(|e| {
            FetchError::Transport {
                series_id: request.series_id.clone(),
                reason: format!("invalid URL '{}': {e}", self.base_url),
            }
        })
    }
}

impl SeriesSource for SeriesApiClient {
    fn name(&self) -> &str {
        "series_api"
    }

    fn fetch(&self, request: &SeriesRequest) -> Result<TidySeries, FetchError> {
        let series_id = request.series_id.as_str();
        let url = self.series_url(request)?;
        debug!(series_id, %url, "requesting series");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport {
                series_id: series_id.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                series_id: series_id.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(|e| FetchError::Transport {
            series_id: series_id.to_string(),
            reason: format!("failed to read response body: {e}"),
        })?;

        let payload = parse_payload(series_id, &body)?;
        let series = normalize_payload(series_id, payload)?;
        info!(series_id, rows = series.len(), "fetched series");
        Ok(series)
    }
}
