//! Log Event Sink
//!
//! Maps run events onto `log` records for human-facing runs.

use log::{debug, info, warn};

use crate::domain::ports::{RunEvent, RunEventSink};

/// Event sink that emits `log` records
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl RunEventSink for LogEventSink {
    fn on_event(&self, event: RunEvent) {
        match event {
            RunEvent::Started {
                job,
                model,
                field_count,
            } => info!(
                "[{job}] filling model {} ({field_count} fields)",
                model.as_deref().unwrap_or("-")
            ),
            RunEvent::Validated { violations } => debug!("structure validated ({violations} violations)"),
            RunEvent::Normalized { shape, reductions } => {
                debug!("reductions: {reductions} from {shape} shape")
            }
            RunEvent::Recalculated {
                base_real,
                base_teorica,
                factor,
                adjusted_boxes,
            } => debug!(
                "base real {base_real}, base teorica {base_teorica}, factor {}, {adjusted_boxes} box(es) adjusted",
                factor.as_deref().unwrap_or("n/a")
            ),
            // Raised with warn! at the source.
            RunEvent::Warning { message } => debug!("warning: {message}"),
            RunEvent::Resolved { fields, filled } => debug!("resolved {fields} fields ({filled} filled)"),
            RunEvent::PageRendered { page, items } => debug!("page {page}: {items} item(s)"),
            RunEvent::Written {
                path,
                sha256,
                bytes,
            } => info!("wrote {} ({bytes} bytes, {sha256})", path.display()),
            RunEvent::Failed { job, code, message } => warn!("[{job}] failed ({code}): {message}"),
            RunEvent::Completed { job, pages } => info!("[{job}] done, {pages} page(s)"),
        }
    }

    fn wants_detailed_events(&self) -> bool {
        log::log_enabled!(log::Level::Debug)
    }
}
