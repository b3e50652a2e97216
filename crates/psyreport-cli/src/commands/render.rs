//! The `psyreport render` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use psyreport_core::model::AssessmentResult;
use psyreport_report::html::write_html_report;
use psyreport_templates::load_config_from;

use super::build_renderer;

pub fn execute(
    result_path: PathBuf,
    version: Option<u32>,
    output: Option<PathBuf>,
    view_model: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let renderer = build_renderer(&config);
    let result = load_result(&result_path)?;
    let version = renderer.resolve_version(version, &result);

    let content = if view_model {
        serde_json::to_string_pretty(&renderer.view_model(version, &result)?)?
    } else {
        renderer.render(version, &result)?
    };

    match output {
        Some(path) => {
            write_html_report(&content, &path)?;
            eprintln!("Report written to: {}", path.display());
        }
        None => println!("{content}"),
    }

    Ok(())
}

pub(crate) fn load_result(path: &Path) -> Result<AssessmentResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read result file: {}", path.display()))?;
    AssessmentResult::from_json(&content)
        .with_context(|| format!("failed to parse result JSON: {}", path.display()))
}
