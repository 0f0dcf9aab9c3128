//! Output Rendering
//!
//! Run reports rendered as a human summary or as one JSON document.

use std::io::{self, Write};

use crate::application::{BatchReport, FillReport, RunStatus};
use crate::domain::entities::FieldValue;

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

/// Icons for output rendering
struct Icons {
    check: &'static str,
    cross: &'static str,
    write: &'static str,
    warn: &'static str,
}

impl Icons {
    fn unicode() -> Self {
        Self {
            check: "✓",
            cross: "✗",
            write: "→",
            warn: "⚠",
        }
    }

    fn ascii() -> Self {
        Self {
            check: "[OK]",
            cross: "[FAIL]",
            write: "->",
            warn: "[!]",
        }
    }
}

/// Trait for rendering run reports
pub trait ReportRenderer {
    fn render_fill(&self, report: &FillReport, out: &mut dyn Write) -> io::Result<()>;

    fn render_batch(&self, report: &BatchReport, out: &mut dyn Write) -> io::Result<()>;
}

/// Text renderer for run reports
pub struct TextRenderer {
    /// Whether to use unicode
    pub unicode: bool,
    /// Verbosity level
    pub verbose: u8,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            unicode: true,
            verbose: 0,
        }
    }
}

impl TextRenderer {
    fn icons(&self) -> Icons {
        if self.unicode {
            Icons::unicode()
        } else {
            Icons::ascii()
        }
    }
}

impl ReportRenderer for TextRenderer {
    fn render_fill(&self, report: &FillReport, out: &mut dyn Write) -> io::Result<()> {
        let icons = self.icons();
        match report.status {
            RunStatus::Success => writeln!(out, "{} Filled {}", icons.check, report.job)?,
            RunStatus::Checked => writeln!(out, "{} Checked {}", icons.check, report.job)?,
            RunStatus::Failed => writeln!(out, "{} Failed {}", icons.cross, report.job)?,
        }

        if let Some(output) = &report.output {
            writeln!(out, "  {} {}", icons.write, output.display())?;
        }
        if let Some(sha256) = &report.sha256 {
            writeln!(out, "  {sha256}")?;
        }
        if report.pages > 0 {
            writeln!(out, "  Pages: {}", report.pages)?;
        }
        if let Some(shape) = report.reductions_shape {
            writeln!(out, "  Reductions: {} ({})", report.reductions, shape.as_str())?;
        }
        if let Some(recalc) = &report.recalculation {
            writeln!(
                out,
                "  Base liquidable: {} real, {} teorica",
                recalc.base_nueva_real, recalc.base_nueva_teorica
            )?;
            if self.verbose > 0 {
                match recalc.factor {
                    Some(factor) => writeln!(out, "  Factor: {factor}")?,
                    None => writeln!(out, "  Factor: none (zero base)")?,
                }
                for change in &recalc.boxes {
                    writeln!(
                        out,
                        "    casilla {}: {} {} {}",
                        change.casilla, change.before, icons.write, change.after
                    )?;
                }
            }
        }

        if !report.warnings.is_empty() {
            writeln!(out, "  Warnings ({}):", report.warnings.len())?;
            for warning in &report.warnings {
                writeln!(out, "    {} {warning}", icons.warn)?;
            }
        }

        if let Some(fields) = &report.fields {
            writeln!(out, "  Fields ({}):", fields.len())?;
            for (id, value) in fields.iter() {
                match value {
                    FieldValue::Text(text) => writeln!(out, "    {id} = {text:?}")?,
                    FieldValue::Check(true) => writeln!(out, "    {id} = [x]")?,
                    FieldValue::Check(false) => writeln!(out, "    {id} = [ ]")?,
                }
            }
        }

        if let Some(error) = &report.error {
            let mut lines = error.message.lines();
            if let Some(first) = lines.next() {
                writeln!(out, "  [{}] {first}", error.code)?;
            }
            for line in lines {
                writeln!(out, "  {line}")?;
            }
        }
        Ok(())
    }

    fn render_batch(&self, report: &BatchReport, out: &mut dyn Write) -> io::Result<()> {
        for job in &report.jobs {
            self.render_fill(job, out)?;
        }
        let icons = self.icons();
        let icon = if report.is_success() {
            icons.check
        } else {
            icons.cross
        };
        writeln!(
            out,
            "{icon} Batch: {} succeeded, {} failed",
            report.succeeded, report.failed
        )
    }
}

/// JSON renderer for run reports
pub struct JsonRenderer;

fn write_json<T: serde::Serialize>(value: &T, out: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)
}

impl ReportRenderer for JsonRenderer {
    fn render_fill(&self, report: &FillReport, out: &mut dyn Write) -> io::Result<()> {
        write_json(report, out)
    }

    fn render_batch(&self, report: &BatchReport, out: &mut dyn Write) -> io::Result<()> {
        write_json(report, out)
    }
}

/// Create a renderer based on format
pub fn create_renderer(format: OutputFormat, verbose: u8) -> Box<dyn ReportRenderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer {
            unicode: true,
            verbose,
        }),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}
