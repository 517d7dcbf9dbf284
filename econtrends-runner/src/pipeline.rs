//! Pipeline orchestration: fetch → persist raw → derive → persist → summarize.
//!
//! Stages run in a fixed order and every failure aborts the run:
//! 1. Resolve the start date (given or configured default)
//! 2. Fetch every registry entry (optionally in parallel, results kept in registry order)
//! 3. Persist raw tables (`raw:<name>`), only after every fetch succeeded
//! 4. Derive indicators and persist them (`processed:<name>`)
//! 5. Assemble and persist the summary (`docs:series_summary`)
//!
//! Files written before a failure stay in place; the summary is only written
//! once every input has been built.

use econtrends_core::data::{FetchError, SeriesApiClient, SeriesRequest, SeriesSource};
use econtrends_core::domain::{
    parse_date, PctChangeRow, RealWageRow, RebasedRow, RegistryError, SeriesRegistry, SeriesSpec,
    TidySeries, IPC_NACIONAL, REQUIRED_SERIES, RESERVES_USD, RIPTE, USD_OFFICIAL,
};
use econtrends_core::transform::{
    compute_pct_change, compute_real_wage, rebase_index, SummaryError, SummaryTable, YOY_PERIODS,
};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use crate::artifacts::{ArtifactMap, ArtifactStore, PersistError, ProcessedTable};
use crate::config::{ConfigError, PipelineConfig, DEFAULT_START};

pub const SUMMARY_KEY: &str = "docs:series_summary";

pub const USD_OFFICIAL_YOY: &str = "usd_official_yoy";
pub const IPC_YOY: &str = "ipc_yoy";
pub const RESERVES_YOY: &str = "reserves_yoy";
pub const USD_OFFICIAL_REBASED: &str = "usd_official_rebased";
pub const IPC_REBASED: &str = "ipc_rebased";
pub const REAL_WAGE: &str = "real_wage";

/// Summary columns, in the order they are joined.
pub const SUMMARY_COLUMNS: [&str; 11] = [
    "usd_official",
    "ipc",
    "reserves_usd",
    "ripte",
    "usd_official_yoy",
    "ipc_yoy",
    "reserves_yoy",
    "usd_official_rebased",
    "ipc_rebased",
    "real_wage",
    "real_wage_yoy",
];

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to set up series client: {0}")]
    Client(#[source] FetchError),

    #[error("invalid start date '{0}' (expected YYYY-MM or YYYY-MM-DD)")]
    InvalidStartDate(String),

    #[error("fetch failed for series '{name}': {source}")]
    Fetch {
        name: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to persist {artifact}: {source}")]
    Persist {
        artifact: String,
        #[source]
        source: PersistError,
    },

    #[error("summary assembly failed: {0}")]
    Summary(#[from] SummaryError),

    #[error("series '{0}' was not fetched")]
    MissingSeries(String),
}

/// A fetched registry entry.
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub name: String,
    pub series: TidySeries,
}

/// The four raw inputs the indicators are derived from.
#[derive(Debug, Clone, Copy)]
pub struct RawInputs<'a> {
    pub usd_official: &'a TidySeries,
    pub reserves_usd: &'a TidySeries,
    pub ipc_nacional: &'a TidySeries,
    pub ripte: &'a TidySeries,
}

impl<'a> RawInputs<'a> {
    /// Pick the required series out of the fetched set by registry name.
    pub fn from_fetched(fetched: &'a [RawSeries]) -> Result<Self, PipelineError> {
        let find = |name: &str| {
            fetched
                .iter()
                .find(|r| r.name == name)
                .map(|r| &r.series)
                .ok_or_else(|| PipelineError::MissingSeries(name.to_string()))
        };
        Ok(Self {
            usd_official: find(USD_OFFICIAL)?,
            reserves_usd: find(RESERVES_USD)?,
            ipc_nacional: find(IPC_NACIONAL)?,
            ripte: find(RIPTE)?,
        })
    }
}

/// Every derived indicator table of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedIndicators {
    pub usd_official_yoy: Vec<PctChangeRow>,
    pub ipc_yoy: Vec<PctChangeRow>,
    pub reserves_yoy: Vec<PctChangeRow>,
    pub usd_official_rebased: Vec<RebasedRow>,
    pub ipc_rebased: Vec<RebasedRow>,
    pub real_wage: Vec<RealWageRow>,
}

impl DerivedIndicators {
    pub fn compute(raw: &RawInputs<'_>) -> Self {
        Self {
            usd_official_yoy: compute_pct_change(raw.usd_official, YOY_PERIODS),
            ipc_yoy: compute_pct_change(raw.ipc_nacional, YOY_PERIODS),
            reserves_yoy: compute_pct_change(raw.reserves_usd, YOY_PERIODS),
            usd_official_rebased: rebase_index(raw.usd_official, None),
            ipc_rebased: rebase_index(raw.ipc_nacional, None),
            real_wage: compute_real_wage(raw.ripte, raw.ipc_nacional),
        }
    }

    /// Tables in persistence order with their artifact names.
    pub fn tables(&self) -> [(&'static str, ProcessedTable<'_>); 6] {
        [
            (USD_OFFICIAL_YOY, ProcessedTable::PctChange(&self.usd_official_yoy)),
            (IPC_YOY, ProcessedTable::PctChange(&self.ipc_yoy)),
            (RESERVES_YOY, ProcessedTable::PctChange(&self.reserves_yoy)),
            (USD_OFFICIAL_REBASED, ProcessedTable::Rebased(&self.usd_official_rebased)),
            (IPC_REBASED, ProcessedTable::Rebased(&self.ipc_rebased)),
            (REAL_WAGE, ProcessedTable::RealWage(&self.real_wage)),
        ]
    }
}

/// Outer-join the raw series, then left-join every derived column.
///
/// Left joins never add dates, so the summary dates are exactly the union of
/// the raw series dates.
pub fn build_summary(
    raw: &RawInputs<'_>,
    derived: &DerivedIndicators,
) -> Result<SummaryTable, SummaryError> {
    let col = |s: &TidySeries| s.iter().map(|o| (o.date, Some(o.value))).collect::<Vec<_>>();
    let pct = |rows: &[PctChangeRow]| rows.iter().map(|r| (r.date, r.pct_change)).collect::<Vec<_>>();
    let rebased = |rows: &[RebasedRow]| rows.iter().map(|r| (r.date, r.rebased_100)).collect::<Vec<_>>();

    SummaryTable::from_column("usd_official", col(raw.usd_official))
        .outer_join("ipc", col(raw.ipc_nacional))?
        .outer_join("reserves_usd", col(raw.reserves_usd))?
        .outer_join("ripte", col(raw.ripte))?
        .left_join("usd_official_yoy", pct(&derived.usd_official_yoy))?
        .left_join("ipc_yoy", pct(&derived.ipc_yoy))?
        .left_join("reserves_yoy", pct(&derived.reserves_yoy))?
        .left_join("usd_official_rebased", rebased(&derived.usd_official_rebased))?
        .left_join("ipc_rebased", rebased(&derived.ipc_rebased))?
        .left_join(
            "real_wage",
            derived.real_wage.iter().map(|r| (r.date, r.real_wage)),
        )?
        .left_join(
            "real_wage_yoy",
            derived.real_wage.iter().map(|r| (r.date, r.real_wage_yoy)),
        )
}

/// The pipeline, bound to a series source and an output store.
pub struct Pipeline<'a> {
    source: &'a dyn SeriesSource,
    registry: SeriesRegistry,
    store: ArtifactStore,
    default_start: String,
    parallel_fetch: bool,
}

impl<'a> Pipeline<'a> {
    /// The registry must contain every series the indicators are derived from.
    pub fn new(
        source: &'a dyn SeriesSource,
        registry: SeriesRegistry,
        store: ArtifactStore,
    ) -> Result<Self, PipelineError> {
        registry.require(&REQUIRED_SERIES)?;
        Ok(Self {
            source,
            registry,
            store,
            default_start: DEFAULT_START.to_string(),
            parallel_fetch: false,
        })
    }

    pub fn from_config(
        source: &'a dyn SeriesSource,
        config: &PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let pipeline = Self::new(source, config.registry()?, ArtifactStore::from_config(config))?
            .with_default_start(config.default_start.clone())
            .with_parallel_fetch(config.parallel_fetch);
        Ok(pipeline)
    }

    pub fn with_default_start(mut self, start: impl Into<String>) -> Self {
        self.default_start = start.into();
        self
    }

    pub fn with_parallel_fetch(mut self, parallel: bool) -> Self {
        self.parallel_fetch = parallel;
        self
    }

    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Run every stage and return the artifact map.
    pub fn run(&self, start: Option<&str>) -> Result<ArtifactMap, PipelineError> {
        let start = self.resolve_start(start)?;
        info!(
            start = %start,
            source = self.source.name(),
            series = self.registry.len(),
            "pipeline started"
        );

        let fetched = self.fetch_all(&start)?;
        let mut outputs = ArtifactMap::new();

        for raw in &fetched {
            let path = self
                .store
                .write_raw(&raw.name, &raw.series)
                .map_err(|source| persist_error(format!("raw:{}", raw.name), source))?;
            outputs.insert(format!("raw:{}", raw.name), path);
        }

        let inputs = RawInputs::from_fetched(&fetched)?;
        let derived = DerivedIndicators::compute(&inputs);
        warn_on_empty_indicators(&derived);

        for (name, table) in derived.tables() {
            let key = format!("processed:{name}");
            let path = self
                .store
                .write_processed(name, table)
                .map_err(|source| persist_error(key.clone(), source))?;
            outputs.insert(key, path);
        }

        let summary = build_summary(&inputs, &derived)?;
        let path = self
            .store
            .write_summary(&summary)
            .map_err(|source| persist_error(SUMMARY_KEY.to_string(), source))?;
        outputs.insert(SUMMARY_KEY, path);

        info!(artifacts = outputs.len(), summary_rows = summary.len(), "pipeline finished");
        Ok(outputs)
    }

    fn resolve_start(&self, start: Option<&str>) -> Result<String, PipelineError> {
        let start = start
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_start);
        if parse_date(start).is_none() {
            return Err(PipelineError::InvalidStartDate(start.to_string()));
        }
        Ok(start.to_string())
    }

    /// Fetch all registry entries. The first failure in registry order wins.
    fn fetch_all(&self, start: &str) -> Result<Vec<RawSeries>, PipelineError> {
        let fetch_one = |spec: &SeriesSpec| -> Result<RawSeries, PipelineError> {
            let request = SeriesRequest::for_spec(spec, Some(start));
            info!(series = %spec.name, id = %spec.id, "fetching series");
            self.source
                .fetch(&request)
                .map(|series| RawSeries {
                    name: spec.name.clone(),
                    series,
                })
                .map_err(|source| PipelineError::Fetch {
                    name: spec.name.clone(),
                    source,
                })
        };

        let results: Vec<Result<RawSeries, PipelineError>> = if self.parallel_fetch {
            self.registry.entries().par_iter().map(fetch_one).collect()
        } else {
            self.registry.iter().map(fetch_one).collect()
        };

        results.into_iter().collect()
    }
}

/// Run the pipeline against the Series API described by `config`.
pub fn run_pipeline(config: &PipelineConfig, start: Option<&str>) -> Result<ArtifactMap, PipelineError> {
    let client =
        SeriesApiClient::new(config.base_url.clone(), config.timeout()).map_err(PipelineError::Client)?;
    Pipeline::from_config(&client, config)?.run(start)
}

fn persist_error(artifact: String, source: PersistError) -> PipelineError {
    PipelineError::Persist { artifact, source }
}

fn warn_on_empty_indicators(derived: &DerivedIndicators) {
    let pct_empty = |rows: &[PctChangeRow]| rows.iter().all(|r| r.pct_change.is_none());
    let rebased_empty = |rows: &[RebasedRow]| rows.iter().all(|r| r.rebased_100.is_none());

    let checks = [
        (USD_OFFICIAL_YOY, pct_empty(&derived.usd_official_yoy)),
        (IPC_YOY, pct_empty(&derived.ipc_yoy)),
        (RESERVES_YOY, pct_empty(&derived.reserves_yoy)),
        (USD_OFFICIAL_REBASED, rebased_empty(&derived.usd_official_rebased)),
        (IPC_REBASED, rebased_empty(&derived.ipc_rebased)),
        (REAL_WAGE, derived.real_wage.iter().all(|r| r.real_wage.is_none())),
    ];
    for (name, empty) in checks {
        if empty {
            warn!(indicator = name, "derived indicator has no values");
        }
    }
}
