//! Command handlers
//!
//! Each handler returns `Ok(false)` when the run completed but failed, so
//! the process can exit non-zero after printing the report.

mod batch;
mod check;
mod fill;

use std::io;

use anyhow::Result;

use casilla::presentation::{create_renderer, Cli, Commands, OutputFormat, ReportRenderer};

pub fn dispatch(cli: Cli) -> Result<bool> {
    let config = casilla::presentation::load_config(cli.config.as_deref())?;
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let renderer = create_renderer(format, cli.verbose);
    let ctx = Context {
        json: cli.json,
        config,
        renderer,
    };

    match cli.command {
        Commands::Fill {
            data,
            mapping,
            structure,
            template,
            output,
            model,
            no_compress,
        } => fill::cmd_fill(
            &ctx,
            fill::FillArgs {
                data,
                mapping,
                structure,
                template,
                output,
                model,
                no_compress,
            },
        ),
        Commands::Check {
            data,
            mapping,
            structure,
            fields,
        } => check::cmd_check(&ctx, &data, &mapping, &structure, fields),
        Commands::Batch {
            manifest,
            max_workers,
        } => batch::cmd_batch(&ctx, &manifest, max_workers),
    }
}

/// Shared state for one invocation
pub struct Context {
    pub json: bool,
    pub config: casilla::Config,
    pub renderer: Box<dyn ReportRenderer>,
}

impl Context {
    fn print_fill(&self, report: &casilla::FillReport) -> Result<()> {
        let mut out = io::stdout().lock();
        self.renderer.render_fill(report, &mut out)?;
        Ok(())
    }
}

/// Job id derived from the data file name
fn job_id(data: &std::path::Path) -> String {
    data.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
