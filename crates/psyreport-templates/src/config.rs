//! psyreport configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::DirectoryStore;

/// Environment variable that overrides `templates_dir`.
pub const TEMPLATES_DIR_ENV: &str = "PSYREPORT_TEMPLATES_DIR";

/// Top-level psyreport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsyreportConfig {
    /// Directory holding `report-v{N}.html` templates.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    /// Version to render with when neither the caller nor the result pins one.
    /// `None` means the latest available version.
    #[serde(default)]
    pub default_version: Option<u32>,
    /// Output directory for rendered reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Max concurrent renders in batch mode.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("./templates")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./reports")
}
fn default_parallelism() -> usize {
    4
}

impl Default for PsyreportConfig {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            default_version: None,
            output_dir: default_output_dir(),
            parallelism: default_parallelism(),
        }
    }
}

impl PsyreportConfig {
    /// A store rooted at the configured templates directory.
    pub fn store(&self) -> DirectoryStore {
        DirectoryStore::new(&self.templates_dir)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `psyreport.toml` in the current directory
/// 2. `~/.config/psyreport/config.toml`
///
/// `PSYREPORT_TEMPLATES_DIR` overrides the templates directory.
pub fn load_config() -> Result<PsyreportConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<PsyreportConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("psyreport.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<PsyreportConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => PsyreportConfig::default(),
    };

    if let Ok(dir) = std::env::var(TEMPLATES_DIR_ENV) {
        config.templates_dir = PathBuf::from(dir);
    }

    config.templates_dir = resolve_path(&config.templates_dir);
    config.output_dir = resolve_path(&config.output_dir);

    anyhow::ensure!(config.parallelism >= 1, "parallelism must be at least 1");

    tracing::debug!(
        source = ?config_path,
        templates_dir = %config.templates_dir.display(),
        "loaded configuration"
    );
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("psyreport"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_PSYREPORT_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_PSYREPORT_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_PSYREPORT_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("unterminated ${VAR"), "unterminated ${VAR");
        std::env::remove_var("_PSYREPORT_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = PsyreportConfig::default();
        assert_eq!(config.templates_dir, PathBuf::from("./templates"));
        assert_eq!(config.default_version, None);
        assert_eq!(config.parallelism, 4);
    }

    #[test]
    fn parse_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("psyreport.toml");
        std::fs::write(
            &path,
            r#"
templates_dir = "/srv/report-templates"
default_version = 2
parallelism = 8
"#,
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        if std::env::var(TEMPLATES_DIR_ENV).is_err() {
            assert_eq!(config.templates_dir, PathBuf::from("/srv/report-templates"));
        }
        assert_eq!(config.default_version, Some(2));
        assert_eq!(config.parallelism, 8);
        assert_eq!(config.output_dir, PathBuf::from("./reports"));
    }

    #[test]
    fn zero_parallelism_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("psyreport.toml");
        std::fs::write(&path, "parallelism = 0\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/psyreport.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
