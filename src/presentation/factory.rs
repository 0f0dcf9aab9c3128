//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};

use crate::application::{BatchManifest, BatchRunner, FillOptions, FillUseCase};
use crate::config::Config;
use crate::domain::ports::RunEventSink;
use crate::error::CasillaResult;
use crate::infrastructure::{FsDocumentRepository, JsonEventSink, LogEventSink};

/// Resolve configuration and report unknown keys through `log`.
pub fn load_config(explicit: Option<&Path>) -> CasillaResult<Config> {
    let (config, warnings) = Config::discover(explicit)?;
    for warning in &warnings {
        warn!("{warning}");
    }
    Ok(config)
}

/// NDJSON on stdout for `--json`, log records otherwise
pub fn create_event_sink(json: bool, command: &'static str) -> Arc<dyn RunEventSink> {
    if json {
        Arc::new(JsonEventSink::stdout(command))
    } else {
        Arc::new(LogEventSink::new())
    }
}

/// Create a fill use case from mapping and structure files
pub fn create_fill_use_case(
    mapping: &Path,
    structure: &Path,
    options: FillOptions,
    events: Arc<dyn RunEventSink>,
) -> CasillaResult<FillUseCase> {
    let repo = FsDocumentRepository::new();
    let mapping = repo.load_mapping(mapping)?;
    let structure = repo.load_structure(structure)?;
    debug!("mapping model has {} field(s)", mapping.len());

    Ok(FillUseCase::new(Arc::new(mapping), Arc::new(structure), options)?.with_events(events))
}

/// Create a batch runner for `manifest`
///
/// Manifest values override configuration; `max_workers` overrides both.
pub fn create_batch_runner(
    manifest: &BatchManifest,
    config: &Config,
    max_workers: Option<usize>,
    events: Arc<dyn RunEventSink>,
) -> CasillaResult<BatchRunner> {
    let mut options = config.fill_options();
    if let Some(model) = &manifest.model {
        options = options.with_model(model.clone());
    }
    if let Some(dir) = &manifest.output_dir {
        options = options.with_output_dir(dir.clone());
    }
    let use_case = create_fill_use_case(&manifest.mapping, &manifest.structure, options, events)?;
    let workers = max_workers.unwrap_or(config.batch.max_workers);
    Ok(BatchRunner::new(Arc::new(use_case), workers))
}
