//! Fill Use Case
//!
//! Orchestrates one run:
//! 1. Validate the data tree against the data structure
//! 2. Normalize reductions (written back in canonical shape)
//! 3. Recalculate totals, bases and dependent boxes
//! 4. Resolve the field table
//! 5. Lay out and encode one overlay per page (in parallel)
//! 6. Merge, assemble and write the document
//!
//! Steps 1-4 are `prepare`, the whole flow without I/O is `fill`, and
//! `run` adds template loading and the atomic output write.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use log::{info, warn};
use serde_json::Value;

use crate::domain::entities::{DataStructure, FieldTable, MappingModel, ReductionShape};
use crate::domain::ports::{
    DocumentMetadata, NoopEventSink, OverlayEncoder, RunEvent, RunEventSink, TemplateDocument,
};
use crate::domain::services::{
    check_page_range, off_page_fields, DataResolver, LayoutPlanner, Recalculation, Recalculator, ReductionNormalizer,
    StructureValidator,
};
use crate::error::{CasillaError, CasillaResult};
use crate::infrastructure::fs::LocalFs;
use crate::infrastructure::pdf::{assemble_document, encode_pages, AssembledDocument, PdfOverlayEncoder, PdfTemplate};

use super::options::{FillOptions, DEFAULT_MODEL};
use super::report::{FillReport, RunStatus};

/// Everything computed before rendering
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub table: FieldTable,
    pub shape: ReductionShape,
    pub reductions: usize,
    pub recalculation: Recalculation,
    pub warnings: Vec<String>,
}

/// One unit of work: a data tree, a template and where to put the result
#[derive(Debug, Clone)]
pub struct FillJob {
    pub id: String,
    pub data: Value,
    pub template: PathBuf,
    /// Explicit output path; otherwise derived from the model and time
    pub output: Option<PathBuf>,
}

/// Default output file name: `mod<model>_<YYYYmmdd_HHMMSS>.pdf`, with the
/// job id inserted before the timestamp when given.
pub fn output_file_name(model: &str, job: Option<&str>, moment: &DateTime<Local>) -> String {
    let stamp = moment.format("%Y%m%d_%H%M%S");
    match job {
        Some(job) => format!("mod{model}_{job}_{stamp}.pdf"),
        None => format!("mod{model}_{stamp}.pdf"),
    }
}

/// Fill use case - shared read-only by every run
pub struct FillUseCase {
    mapping: Arc<MappingModel>,
    structure: Arc<DataStructure>,
    options: FillOptions,
    encoder: Arc<dyn OverlayEncoder>,
    events: Arc<dyn RunEventSink>,
}

impl FillUseCase {
    /// Fails when a mapping reads a path the data structure does not declare.
    pub fn new(
        mapping: Arc<MappingModel>,
        structure: Arc<DataStructure>,
        options: FillOptions,
    ) -> CasillaResult<Self> {
        StructureValidator::new(&structure).check_sources(&mapping)?;
        Ok(Self {
            mapping,
            structure,
            options,
            encoder: Arc::new(PdfOverlayEncoder::new()),
            events: Arc::new(NoopEventSink),
        })
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn OverlayEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn RunEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    pub fn mapping(&self) -> &MappingModel {
        &self.mapping
    }

    /// Model code: explicit option, then mapping model, then data structure.
    pub fn model(&self) -> &str {
        self.options
            .model
            .as_deref()
            .or_else(|| self.mapping.name())
            .or_else(|| self.structure.model())
            .unwrap_or(DEFAULT_MODEL)
    }

    /// Run every stage that does not need the template.
    ///
    /// `tree` ends up with canonical reductions and recalculated boxes.
    pub fn prepare(&self, tree: &mut Value) -> CasillaResult<PreparedRun> {
        let report = StructureValidator::new(&self.structure).validate(tree);
        self.events.on_event(RunEvent::Validated {
            violations: report.len(),
        });
        if !report.is_ok() {
            return Err(CasillaError::InvalidData(report));
        }

        let normalized = ReductionNormalizer::new().apply(tree)?;
        self.events.on_event(RunEvent::Normalized {
            shape: normalized.shape.as_str().to_string(),
            reductions: normalized.reductions.len(),
        });

        let recalculation = Recalculator::new(self.options.recalc).apply(tree, &normalized.reductions)?;
        self.events.on_event(RunEvent::Recalculated {
            base_real: recalculation.base_nueva_real.to_string(),
            base_teorica: recalculation.base_nueva_teorica.to_string(),
            factor: recalculation.factor.map(|f| f.to_string()),
            adjusted_boxes: recalculation.boxes.len(),
        });
        let warnings: Vec<String> = recalculation
            .discrepancies
            .iter()
            .map(|d| {
                format!(
                    "totalesReducciones.{} declared {} differs from computed {} within tolerance",
                    d.total, d.declared, d.computed
                )
            })
            .collect();
        for message in &warnings {
            self.events.on_event(RunEvent::Warning {
                message: message.clone(),
            });
        }

        let table = DataResolver::new(&self.mapping, &self.structure, &self.options.format).resolve(tree)?;
        self.events.on_event(RunEvent::Resolved {
            fields: table.len(),
            filled: table.filled(),
        });

        Ok(PreparedRun {
            table,
            shape: normalized.shape,
            reductions: normalized.reductions.len(),
            recalculation,
            warnings,
        })
    }

    /// Lay out, encode and merge `table` onto `template`.
    pub fn render(
        &self,
        table: &FieldTable,
        template: &mut dyn TemplateDocument,
        metadata: &DocumentMetadata,
    ) -> CasillaResult<AssembledDocument> {
        let page_count = template.page_count();
        check_page_range(&self.mapping, page_count)?;
        for message in off_page_fields(&self.mapping, |page| template.page_size(page)) {
            warn!("{message}");
            self.events.on_event(RunEvent::Warning { message });
        }

        let plans = LayoutPlanner::new(&self.mapping, self.options.layout).plan(table, page_count)?;
        let overlays = encode_pages(self.encoder.as_ref(), &plans)?;
        if self.events.wants_detailed_events() {
            for plan in &plans {
                self.events.on_event(RunEvent::PageRendered {
                    page: plan.page,
                    items: plan.items.len(),
                });
            }
        }
        assemble_document(template, overlays, metadata)
    }

    /// Prepare and render without touching the file system.
    pub fn fill(
        &self,
        job: &str,
        tree: &mut Value,
        template: &mut dyn TemplateDocument,
    ) -> CasillaResult<(PreparedRun, AssembledDocument)> {
        let prepared = self.prepare(tree)?;
        let mut metadata = DocumentMetadata::for_model(self.model(), job, &self.options.author);
        metadata.compress = self.options.compress;
        let document = self.render(&prepared.table, template, &metadata)?;
        Ok((prepared, document))
    }

    /// Validate and resolve only; `fields` adds the table to the report.
    pub fn check(&self, job: &str, mut tree: Value, fields: bool) -> FillReport {
        self.events.on_event(RunEvent::Started {
            job: job.to_string(),
            model: Some(self.model().to_string()),
            field_count: self.mapping.len(),
        });
        match self.prepare(&mut tree) {
            Ok(prepared) => {
                let mut report = self.report_for(job, prepared, fields);
                report.status = RunStatus::Checked;
                self.events.on_event(RunEvent::Completed {
                    job: job.to_string(),
                    pages: 0,
                });
                report
            }
            Err(err) => self.failed(job, &err),
        }
    }

    /// Full run: load the template, fill and write the output atomically.
    pub fn run(&self, job: FillJob) -> FillReport {
        self.events.on_event(RunEvent::Started {
            job: job.id.clone(),
            model: Some(self.model().to_string()),
            field_count: self.mapping.len(),
        });
        let id = job.id.clone();
        match self.run_inner(job) {
            Ok(report) => report,
            Err(err) => self.failed(&id, &err),
        }
    }

    fn run_inner(&self, job: FillJob) -> CasillaResult<FillReport> {
        let FillJob {
            id,
            mut data,
            template,
            output,
        } = job;
        let mut document = PdfTemplate::load(&template)?;
        let (prepared, assembled) = self.fill(&id, &mut data, &mut document)?;

        let output = output.unwrap_or_else(|| self.default_output(&id));
        LocalFs::new().write_atomic(&output, &assembled.bytes)?;
        info!("[{id}] wrote {} ({} pages)", output.display(), assembled.page_count);
        self.events.on_event(RunEvent::Written {
            path: output.clone(),
            sha256: assembled.sha256.to_string(),
            bytes: assembled.bytes.len(),
        });

        let mut report = self.report_for(&id, prepared, false);
        report.status = RunStatus::Success;
        report.output = Some(output);
        report.sha256 = Some(assembled.sha256);
        report.pages = assembled.page_count;
        self.events.on_event(RunEvent::Completed {
            job: id,
            pages: assembled.page_count,
        });
        Ok(report)
    }

    fn default_output(&self, job: &str) -> PathBuf {
        let name = output_file_name(self.model(), Some(job).filter(|j| !j.is_empty()), &Local::now());
        self.options.output_dir.join(name)
    }

    fn report_for(&self, job: &str, prepared: PreparedRun, fields: bool) -> FillReport {
        let mut report = FillReport::new(job);
        report.reductions_shape = Some(prepared.shape);
        report.reductions = prepared.reductions;
        report.recalculation = Some(prepared.recalculation);
        report.warnings = prepared.warnings;
        if fields {
            report.fields = Some(prepared.table);
        }
        report
    }

    fn failed(&self, job: &str, err: &CasillaError) -> FillReport {
        self.events.on_event(RunEvent::Failed {
            job: job.to_string(),
            code: err.code().to_string(),
            message: err.to_string(),
        });
        FillReport::failed(job, err)
    }
}

/// Output path for a single run writing into `dir`
pub fn default_output_path(dir: &Path, model: &str) -> PathBuf {
    dir.join(output_file_name(model, None, &Local::now()))
}
