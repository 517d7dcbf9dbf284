//! econtrends core: tidy series, series registry, fetcher, indicator transforms.
//!
//! This crate holds everything that does not touch the filesystem:
//! - Domain types (observations, tidy series, derived rows, registry entries)
//! - The `SeriesSource` trait and the HTTP client for the public Series API
//! - Payload normalization (date/value coercion, row-drop policy, sorting)
//! - Indicator transforms (percentage change, rebasing, real wage)
//! - Summary-table merge primitives (outer/left joins on date)

pub mod data;
pub mod domain;
pub mod transform;

pub use data::{FetchError, SeriesApiClient, SeriesRequest, SeriesSource};
pub use domain::{
    Aggregation, Collapse, Observation, RegistryError, SeriesEntry, SeriesRegistry, SeriesSpec,
    TidySeries,
};
