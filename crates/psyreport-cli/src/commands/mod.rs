//! Subcommand implementations.

pub mod batch;
pub mod init;
pub mod render;
pub mod validate;
pub mod versions;

use psyreport_report::ReportRenderer;
use psyreport_templates::PsyreportConfig;

/// Build a renderer over the configured templates directory.
pub(crate) fn build_renderer(config: &PsyreportConfig) -> ReportRenderer {
    ReportRenderer::new(config.store()).with_default_version(config.default_version)
}
