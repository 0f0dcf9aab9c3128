//! Run Event Port
//!
//! Provides an observable interface for fill runs.
//! Enables log output, JSON event streams, and testing.

use std::path::PathBuf;

/// Event emitted while a run progresses
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Run started
    Started {
        job: String,
        model: Option<String>,
        field_count: usize,
    },

    /// Structure validation finished
    Validated { violations: usize },

    /// Reductions normalized
    Normalized { shape: String, reductions: usize },

    /// Bases and dependent boxes recomputed
    Recalculated {
        base_real: String,
        base_teorica: String,
        factor: Option<String>,
        adjusted_boxes: usize,
    },

    /// A tolerated discrepancy or other non-fatal condition
    Warning { message: String },

    /// Field table built
    Resolved { fields: usize, filled: usize },

    /// One page overlay merged
    PageRendered { page: usize, items: usize },

    /// Output written
    Written {
        path: PathBuf,
        sha256: String,
        bytes: usize,
    },

    /// Run failed
    Failed {
        job: String,
        code: String,
        message: String,
    },

    /// Run completed
    Completed { job: String, pages: usize },
}

/// Trait for receiving run events
///
/// Implementations:
/// - LogEventSink: `log` records
/// - JsonEventSink: NDJSON event stream for automation
/// - NoopEventSink: Silent operation
pub trait RunEventSink: Send + Sync {
    /// Handle a run event
    fn on_event(&self, event: RunEvent);

    /// Check if this sink wants per-page events
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl RunEventSink for NoopEventSink {
    fn on_event(&self, _event: RunEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingEventSink;
    use super::*;

    #[test]
    fn recording_sink_captures_events() {
        let sink = RecordingEventSink::default();
        sink.on_event(RunEvent::Started {
            job: "mod650".to_string(),
            model: Some("650".to_string()),
            field_count: 12,
        });
        sink.on_event(RunEvent::Validated { violations: 0 });
        assert_eq!(sink.recorded().len(), 2);
    }

    #[test]
    fn noop_sink_wants_no_details() {
        let sink = NoopEventSink;
        assert!(!sink.wants_detailed_events());
    }
}
