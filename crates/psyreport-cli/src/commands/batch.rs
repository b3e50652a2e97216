//! The `psyreport batch` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use psyreport_report::html::{report_path_for, write_html_report};
use psyreport_report::ReportRenderer;
use psyreport_templates::load_config_from;

use super::build_renderer;
use super::render::load_result;

pub async fn execute(
    results_dir: PathBuf,
    output: Option<PathBuf>,
    version: Option<u32>,
    parallelism: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let inputs = collect_result_files(&results_dir)?;
    anyhow::ensure!(
        !inputs.is_empty(),
        "no result files found in {}",
        results_dir.display()
    );

    let renderer = Arc::new(build_renderer(&config));
    let semaphore = Arc::new(Semaphore::new(parallelism));
    let start = Instant::now();
    let total = inputs.len();

    eprintln!("Rendering {total} reports ({parallelism} at a time)");

    let mut futures = FuturesUnordered::new();
    for input in inputs {
        let renderer = Arc::clone(&renderer);
        let semaphore = Arc::clone(&semaphore);
        let output = output.clone();

        futures.push(async move {
            let ctx_input = input.clone();
            let inner = async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                tokio::task::spawn_blocking(move || render_one(&renderer, &input, &output, version))
                    .await
                    .context("render task panicked")?
            };
            (ctx_input, inner.await)
        });
    }

    let mut completed = 0usize;
    let mut failed = 0usize;

    while let Some((input, result)) = futures.next().await {
        match result {
            Ok(path) => {
                eprintln!("  Done: {} -> {}", input.display(), path.display());
                completed += 1;
            }
            Err(e) => {
                tracing::error!("render failed for {}: {e:#}", input.display());
                eprintln!("  ERROR: {}: {e:#}", input.display());
                failed += 1;
            }
        }
    }

    eprintln!(
        "\nComplete: {completed}/{total} rendered, {failed} failed ({:.1}s)",
        start.elapsed().as_secs_f64()
    );

    anyhow::ensure!(failed == 0, "{failed} report(s) failed to render");
    Ok(())
}

fn render_one(
    renderer: &ReportRenderer,
    input: &Path,
    output_dir: &Path,
    version: Option<u32>,
) -> Result<PathBuf> {
    let result = load_result(input)?;
    let version = renderer.resolve_version(version, &result);
    let html = renderer.render(version, &result)?;
    let path = report_path_for(input, output_dir);
    write_html_report(&html, &path)?;
    Ok(path)
}

/// All `.json` files directly inside `dir`, sorted by path.
fn collect_result_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
