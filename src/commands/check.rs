use std::path::Path;

use anyhow::{Context as _, Result};

use casilla::infrastructure::FsDocumentRepository;
use casilla::presentation::{create_event_sink, create_fill_use_case};

use super::{job_id, Context};

pub fn cmd_check(ctx: &Context, data: &Path, mapping: &Path, structure: &Path, fields: bool) -> Result<bool> {
    let events = create_event_sink(ctx.json, "check");
    let use_case = create_fill_use_case(mapping, structure, ctx.config.fill_options(), events)
        .context("failed to load the mapping model or data structure")?;
    let tree = FsDocumentRepository::new()
        .load_data(data)
        .with_context(|| format!("failed to load data tree {}", data.display()))?;

    let report = use_case.check(&job_id(data), tree, fields);
    ctx.print_fill(&report)?;
    Ok(report.is_success())
}
