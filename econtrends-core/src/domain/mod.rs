//! Domain types: observations, tidy series, derived rows, the series registry.

pub mod dates;
pub mod registry;
pub mod series;

pub use dates::parse_date;
pub use registry::{
    Aggregation, Collapse, RegistryError, SeriesEntry, SeriesRegistry, SeriesSpec, IPC_NACIONAL,
    REQUIRED_SERIES, RESERVES_USD, RIPTE, USD_OFFICIAL,
};
pub use series::{Observation, PctChangeRow, RealWageRow, RebasedRow, TidySeries};
