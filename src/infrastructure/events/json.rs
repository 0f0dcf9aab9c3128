//! JSON Event Sink
//!
//! Outputs run events as NDJSON for CI/automation consumption.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{RunEvent, RunEventSink};

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    command: &'static str,
    /// Mutex to ensure thread-safe writes from batch workers
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout(command: &'static str) -> Self {
        Self::with_writer(command, io::stdout())
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(command: &'static str, writer: W) -> Self {
        Self {
            command,
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl RunEventSink for JsonEventSink {
    fn on_event(&self, event: RunEvent) {
        let command = self.command;
        let json = match event {
            RunEvent::Started {
                job,
                model,
                field_count,
            } => serde_json::json!({
                "event": "start",
                "command": command,
                "job": job,
                "model": model,
                "field_count": field_count,
            }),

            RunEvent::Validated { violations } => serde_json::json!({
                "event": "validated",
                "command": command,
                "violations": violations,
            }),

            RunEvent::Normalized { shape, reductions } => serde_json::json!({
                "event": "normalized",
                "command": command,
                "shape": shape,
                "reductions": reductions,
            }),

            RunEvent::Recalculated {
                base_real,
                base_teorica,
                factor,
                adjusted_boxes,
            } => serde_json::json!({
                "event": "recalculated",
                "command": command,
                "base_real": base_real,
                "base_teorica": base_teorica,
                "factor": factor,
                "adjusted_boxes": adjusted_boxes,
            }),

            RunEvent::Warning { message } => serde_json::json!({
                "event": "warning",
                "command": command,
                "message": message,
            }),

            RunEvent::Resolved { fields, filled } => serde_json::json!({
                "event": "resolved",
                "command": command,
                "fields": fields,
                "filled": filled,
            }),

            RunEvent::PageRendered { page, items } => serde_json::json!({
                "event": "page_rendered",
                "command": command,
                "page": page,
                "items": items,
            }),

            RunEvent::Written {
                path,
                sha256,
                bytes,
            } => serde_json::json!({
                "event": "written",
                "command": command,
                "path": path.display().to_string(),
                "sha256": sha256,
                "bytes": bytes,
            }),

            RunEvent::Failed { job, code, message } => serde_json::json!({
                "event": "error",
                "command": command,
                "job": job,
                "code": code,
                "message": message,
            }),

            RunEvent::Completed { job, pages } => serde_json::json!({
                "event": "complete",
                "command": command,
                "status": "success",
                "job": job,
                "pages": pages,
            }),
        };

        self.write_event(json);
    }
}
