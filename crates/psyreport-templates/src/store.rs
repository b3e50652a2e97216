//! Template stores.
//!
//! A store maps a version number to template text. Every store shares the
//! same resolution policy through [`TemplateStore::load`]: a missing version
//! falls back to version 0, and only a missing version 0 is fatal.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use psyreport_core::TemplateError;

/// The version every store falls back to.
pub const FALLBACK_VERSION: u32 = 0;

/// Template text together with the version it was resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTemplate {
    /// The version the caller asked for.
    pub requested: u32,
    /// The version whose text was returned.
    pub version: u32,
    pub source: String,
}

impl LoadedTemplate {
    pub fn is_fallback(&self) -> bool {
        self.requested != self.version
    }
}

/// Read-only access to versioned report templates.
pub trait TemplateStore: Send + Sync {
    /// Available versions, ascending. Never empty; always contains 0.
    fn list_versions(&self) -> Vec<u32>;

    /// Raw lookup of one version. `Ok(None)` means the version is absent.
    fn fetch(&self, version: u32) -> Result<Option<String>, TemplateError>;

    /// Load a version, falling back to version 0 when it is absent.
    fn load(&self, version: u32) -> Result<LoadedTemplate, TemplateError> {
        if let Some(source) = self.fetch(version)? {
            return Ok(LoadedTemplate {
                requested: version,
                version,
                source,
            });
        }

        if version != FALLBACK_VERSION {
            tracing::warn!(
                requested = version,
                "template version not found, falling back to version {FALLBACK_VERSION}"
            );
            if let Some(source) = self.fetch(FALLBACK_VERSION)? {
                return Ok(LoadedTemplate {
                    requested: version,
                    version: FALLBACK_VERSION,
                    source,
                });
            }
        }

        Err(TemplateError::NotFound { requested: version })
    }

    /// The highest available version.
    fn latest_version(&self) -> u32 {
        self.list_versions()
            .into_iter()
            .max()
            .unwrap_or(FALLBACK_VERSION)
    }
}

fn with_fallback(versions: impl IntoIterator<Item = u32>) -> Vec<u32> {
    let mut set: BTreeSet<u32> = versions.into_iter().collect();
    set.insert(FALLBACK_VERSION);
    set.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Directory store
// ---------------------------------------------------------------------------

/// Templates stored as `report-v{N}.html` files under one root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `version`.
    pub fn template_path(&self, version: u32) -> PathBuf {
        self.root.join(file_name(version))
    }

    /// Publish a template version.
    ///
    /// The text is written to a temporary file in the same directory and then
    /// renamed into place, so readers never observe a partially written version.
    pub fn install(&self, version: u32, source: &str) -> anyhow::Result<PathBuf> {
        use anyhow::Context;

        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        let path = self.template_path(version);

        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)
            .with_context(|| format!("failed to stage template in {}", self.root.display()))?;
        tmp.write_all(source.as_bytes())?;
        // Staged files are created owner-only; published templates are shared.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(TEMPLATE_MODE))
                .with_context(|| format!("failed to set permissions on {}", path.display()))?;
        }
        tmp.persist(&path)
            .with_context(|| format!("failed to publish {}", path.display()))?;

        tracing::info!(version, path = %path.display(), "installed template");
        Ok(path)
    }
}

/// Permission bits for installed template files.
#[cfg(unix)]
const TEMPLATE_MODE: u32 = 0o644;

fn file_name(version: u32) -> String {
    format!("report-v{version}.html")
}

/// Parse `report-v{N}.html` into `N`.
fn parse_file_name(name: &str) -> Option<u32> {
    name.strip_prefix("report-v")?
        .strip_suffix(".html")?
        .parse()
        .ok()
}

impl TemplateStore for DirectoryStore {
    fn list_versions(&self) -> Vec<u32> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    dir = %self.root.display(),
                    "failed to list templates, reporting version 0 only: {e}"
                );
                return vec![FALLBACK_VERSION];
            }
        };

        with_fallback(entries.filter_map(|entry| {
            let entry = entry.ok()?;
            if !entry.path().is_file() {
                return None;
            }
            parse_file_name(entry.file_name().to_str()?)
        }))
    }

    /// Only regular files count as present, matching `list_versions`. Any
    /// other failure to read an existing file is fatal.
    fn fetch(&self, version: u32) -> Result<Option<String>, TemplateError> {
        let path = self.template_path(version);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                tracing::debug!(
                    version,
                    path = %path.display(),
                    "not a regular file, treating as absent"
                );
                return Ok(None);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(TemplateError::Io { path, source }),
        }

        match std::fs::read_to_string(&path) {
            Ok(source) => {
                tracing::debug!(version, path = %path.display(), "loaded template");
                Ok(Some(source))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TemplateError::Io { path, source }),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Templates held in memory. Useful for tests and for embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    templates: BTreeMap<u32, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, version: u32, source: impl Into<String>) -> Self {
        self.templates.insert(version, source.into());
        self
    }
}

impl TemplateStore for MemoryStore {
    fn list_versions(&self) -> Vec<u32> {
        with_fallback(self.templates.keys().copied())
    }

    fn fetch(&self, version: u32) -> Result<Option<String>, TemplateError> {
        Ok(self.templates.get(&version).cloned())
    }
}
