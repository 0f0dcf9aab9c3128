use std::io;
use std::path::Path;

use anyhow::{Context as _, Result};

use casilla::presentation::{create_batch_runner, create_event_sink};
use casilla::BatchManifest;

use super::Context;

pub fn cmd_batch(ctx: &Context, manifest: &Path, max_workers: Option<usize>) -> Result<bool> {
    let manifest = BatchManifest::load(manifest)
        .with_context(|| format!("failed to load batch manifest {}", manifest.display()))?;
    let events = create_event_sink(ctx.json, "batch");
    let runner = create_batch_runner(&manifest, &ctx.config, max_workers, events)?;

    let report = runner.run(manifest.batch_jobs())?;
    let mut out = io::stdout().lock();
    ctx.renderer.render_batch(&report, &mut out)?;
    Ok(report.is_success())
}
