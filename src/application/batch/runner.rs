//! Batch Runner
//!
//! Runs independent fill jobs on a rayon pool. Results come back in job
//! order and a failing job never aborts the others.

use std::path::PathBuf;
use std::sync::Arc;

use log::info;
use rayon::prelude::*;
use serde::Serialize;

use crate::application::fill::{FillJob, FillReport, FillUseCase};
use crate::error::{CasillaError, CasillaResult};
use crate::infrastructure::repositories::FsDocumentRepository;

/// A job whose data tree is still on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub id: String,
    pub data: PathBuf,
    pub template: PathBuf,
    pub output: Option<PathBuf>,
}

/// Per-job reports plus counters
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub jobs: Vec<FillReport>,
}

impl BatchReport {
    fn from_reports(jobs: Vec<FillReport>) -> Self {
        let succeeded = jobs.iter().filter(|r| r.is_success()).count();
        Self {
            succeeded,
            failed: jobs.len() - succeeded,
            jobs,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

pub struct BatchRunner {
    use_case: Arc<FillUseCase>,
    /// 0 lets rayon decide
    max_workers: usize,
}

impl BatchRunner {
    pub fn new(use_case: Arc<FillUseCase>, max_workers: usize) -> Self {
        Self {
            use_case,
            max_workers,
        }
    }

    pub fn run(&self, jobs: Vec<BatchJob>) -> CasillaResult<BatchReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|err| CasillaError::Io(std::io::Error::other(err.to_string())))?;
        info!(
            "running {} job(s) on {} worker(s)",
            jobs.len(),
            pool.current_num_threads()
        );

        let reports: Vec<FillReport> = pool.install(|| jobs.into_par_iter().map(|job| self.run_one(job)).collect());
        let report = BatchReport::from_reports(reports);
        info!("batch finished: {} ok, {} failed", report.succeeded, report.failed);
        Ok(report)
    }

    fn run_one(&self, job: BatchJob) -> FillReport {
        let data = match FsDocumentRepository::new().load_data(&job.data) {
            Ok(data) => data,
            Err(err) => return FillReport::failed(job.id, &err),
        };
        self.use_case.run(FillJob {
            id: job.id,
            data,
            template: job.template,
            output: job.output,
        })
    }
}
