use std::path::PathBuf;

use anyhow::{Context as _, Result};

use casilla::application::fill::default_output_path;
use casilla::infrastructure::FsDocumentRepository;
use casilla::presentation::{create_event_sink, create_fill_use_case};
use casilla::FillJob;

use super::{job_id, Context};

pub struct FillArgs {
    pub data: PathBuf,
    pub mapping: PathBuf,
    pub structure: PathBuf,
    pub template: PathBuf,
    pub output: Option<PathBuf>,
    pub model: Option<String>,
    pub no_compress: bool,
}

pub fn cmd_fill(ctx: &Context, args: FillArgs) -> Result<bool> {
    let mut options = ctx.config.fill_options();
    if let Some(model) = args.model {
        options = options.with_model(model);
    }
    if args.no_compress {
        options = options.with_compress(false);
    }

    let events = create_event_sink(ctx.json, "fill");
    let use_case = create_fill_use_case(&args.mapping, &args.structure, options, events)
        .context("failed to load the mapping model or data structure")?;
    let data = FsDocumentRepository::new()
        .load_data(&args.data)
        .with_context(|| format!("failed to load data tree {}", args.data.display()))?;

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&use_case.options().output_dir, use_case.model()));
    let report = use_case.run(FillJob {
        id: job_id(&args.data),
        data,
        template: args.template,
        output: Some(output),
    });

    ctx.print_fill(&report)?;
    Ok(report.is_success())
}
