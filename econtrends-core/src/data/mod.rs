//! Series retrieval: source trait, HTTP client, payload normalization.

pub mod normalize;
pub mod provider;
pub mod series_api;

pub use normalize::{normalize_payload, SeriesPayload};
pub use provider::{FetchError, SeriesRequest, SeriesSource};
pub use series_api::{SeriesApiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
