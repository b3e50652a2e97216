//! Writing rendered reports to disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Write a rendered HTML report to a file, creating parent directories.
pub fn write_html_report(html: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

/// Output path for the report rendered from `input` inside `output_dir`.
///
/// `results/alice.json` becomes `<output_dir>/alice.html`.
pub fn report_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    output_dir.join(format!("{stem}.html"))
}
