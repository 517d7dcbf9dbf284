//! econtrends runner: configuration, artifact persistence, pipeline orchestration.
//!
//! This crate builds on `econtrends-core` to provide:
//! - TOML pipeline configuration with a built-in default registry
//! - CSV artifact store with atomic writes and BLAKE3 digests
//! - The fetch → persist → derive → summarize pipeline

pub mod artifacts;
pub mod config;
pub mod pipeline;

pub use artifacts::{
    digest_artifacts, file_digest, ArtifactDigest, ArtifactMap, ArtifactStore, PersistError,
    ProcessedTable, SUMMARY_FILE,
};
pub use config::{ConfigError, PipelineConfig, DEFAULT_START, DEFAULT_TIMEOUT_SECS};
pub use pipeline::{
    build_summary, run_pipeline, DerivedIndicators, Pipeline, PipelineError, RawInputs, RawSeries,
    SUMMARY_COLUMNS, SUMMARY_KEY,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_is_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
    }

    #[test]
    fn artifact_types_are_send_sync() {
        assert_send::<ArtifactMap>();
        assert_sync::<ArtifactMap>();
        assert_send::<ArtifactStore>();
        assert_sync::<ArtifactStore>();
    }

    #[test]
    fn pipeline_is_send_sync() {
        assert_send::<Pipeline<'static>>();
        assert_sync::<Pipeline<'static>>();
        assert_send::<PipelineError>();
        assert_sync::<PipelineError>();
    }
}
