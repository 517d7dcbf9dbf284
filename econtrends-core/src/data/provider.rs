//! Series source trait and structured fetch errors.
//!
//! The `SeriesSource` trait abstracts over where series come from (the public
//! Series API, an in-memory fixture) so the pipeline can be driven without a
//! network in tests.

use crate::domain::{Aggregation, Collapse, SeriesSpec, TidySeries};
use thiserror::Error;

/// Parameters for one series request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub series_id: String,
    /// Observations before this date are excluded upstream. Sent verbatim.
    pub start_date: Option<String>,
    pub collapse: Option<Collapse>,
    pub aggregation: Option<Aggregation>,
}

impl SeriesRequest {
    pub fn new(series_id: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            start_date: None,
            collapse: None,
            aggregation: None,
        }
    }

    /// Request for a registry entry starting at `start_date`.
    pub fn for_spec(spec: &SeriesSpec, start_date: Option<&str>) -> Self {
        Self {
            series_id: spec.id.clone(),
            start_date: start_date.map(str::to_string),
            collapse: spec.collapse,
            aggregation: spec.aggregation,
        }
    }

    /// Query parameters in the order the API documents them; absent options are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("ids", self.series_id.as_str())];
        if let Some(start) = self.start_date.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("start_date", start));
        }
        if let Some(collapse) = self.collapse {
            pairs.push(("collapse", collapse.as_token()));
        }
        if let Some(aggregation) = self.aggregation {
            pairs.push(("collapse_aggregation", aggregation.as_token()));
        }
        pairs
    }
}

/// Errors from fetching a single series.
///
/// None of these are retried; they abort the pipeline run that triggered them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request for series '{series_id}' failed: {reason}")]
    Transport { series_id: String, reason: String },

    #[error("series API returned HTTP {status} for series '{series_id}'")]
    Status { series_id: String, status: u16 },

    #[error("unexpected API response for series '{series_id}': {reason}")]
    MalformedResponse { series_id: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// The upstream series id implicated in the failure, if any.
    pub fn series_id(&self) -> Option<&str> {
        match self {
            FetchError::Transport { series_id, .. }
            | FetchError::Status { series_id, .. }
            | FetchError::MalformedResponse { series_id, .. } => Some(series_id),
            FetchError::Client(_) => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, FetchError::MalformedResponse { .. })
    }
}

/// Anything that can produce a normalized tidy series for a request.
pub trait SeriesSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch and normalize one series.
    fn fetch(&self, request: &SeriesRequest) -> Result<TidySeries, FetchError>;
}
