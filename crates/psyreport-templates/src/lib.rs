//! psyreport-templates — Versioned report template storage.
//!
//! Resolves template versions to template text with a fallback to version 0,
//! and loads the `psyreport.toml` configuration that points at the template
//! directory.

pub mod config;
pub mod store;

pub use config::{load_config, load_config_from, PsyreportConfig};
pub use store::{DirectoryStore, LoadedTemplate, MemoryStore, TemplateStore};

/// The version 0 report template shipped with psyreport.
///
/// `psyreport init` writes this into a fresh templates directory so the
/// fallback version always exists.
pub const BUNDLED_V0: &str = include_str!("../../../templates/report-v0.html");
