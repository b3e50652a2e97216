//! The render entry point.
//!
//! `ReportRenderer` owns a template store and a clock and is `Send + Sync`,
//! so one instance can serve concurrent render calls. Each call builds its
//! own view model and output buffer; nothing is shared between calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use psyreport_core::engine;
use psyreport_core::model::AssessmentResult;
use psyreport_core::view::{build_view_model, RenderContext, ViewModel};
use psyreport_core::TemplateError;
use psyreport_templates::{LoadedTemplate, TemplateStore};

/// Any failure while producing a report.
///
/// Store, I/O, and template syntax failures all surface as this one type;
/// the originating [`TemplateError`] is kept as the source.
#[derive(Debug, Error)]
#[error("failed to render report with template version {version}")]
pub struct RenderError {
    /// The version the caller asked for.
    pub version: u32,
    #[source]
    pub source: TemplateError,
}

/// Source of the "generated at" timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Makes rendered output reproducible.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Renders assessment results into HTML reports.
#[derive(Clone)]
pub struct ReportRenderer {
    store: Arc<dyn TemplateStore>,
    clock: Arc<dyn Clock>,
    default_version: Option<u32>,
}

impl ReportRenderer {
    pub fn new(store: impl TemplateStore + 'static) -> Self {
        Self::from_store(Arc::new(store))
    }

    pub fn from_store(store: Arc<dyn TemplateStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            default_version: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Version used when neither the caller nor the result pins one.
    /// `None` means the store's latest version.
    pub fn with_default_version(mut self, version: Option<u32>) -> Self {
        self.default_version = version;
        self
    }

    /// Render `result` with template `version`.
    pub fn render(&self, version: u32, result: &AssessmentResult) -> Result<String, RenderError> {
        let (loaded, view) = self.prepare(version, result)?;
        let html = engine::apply(&loaded.source, &view)
            .map_err(|source| RenderError { version, source })?;

        tracing::debug!(
            requested = version,
            resolved = loaded.version,
            sections = view.section_count,
            bytes = html.len(),
            "rendered report"
        );
        Ok(html)
    }

    /// The view model `render` would evaluate, with `templateVersion` set to
    /// the version the store actually resolved.
    pub fn view_model(
        &self,
        version: u32,
        result: &AssessmentResult,
    ) -> Result<ViewModel, RenderError> {
        self.prepare(version, result).map(|(_, view)| view)
    }

    fn prepare(
        &self,
        version: u32,
        result: &AssessmentResult,
    ) -> Result<(LoadedTemplate, ViewModel), RenderError> {
        let loaded = self
            .store
            .load(version)
            .map_err(|source| RenderError { version, source })?;
        let ctx = RenderContext {
            template_version: loaded.version,
            generated_at: self.clock.now(),
        };
        let view = build_view_model(result, &ctx);
        Ok((loaded, view))
    }

    /// Render with the version chosen by [`ReportRenderer::resolve_version`].
    pub fn render_default(&self, result: &AssessmentResult) -> Result<String, RenderError> {
        self.render(self.resolve_version(None, result), result)
    }

    /// Pick a version: explicit request, then the result's pinned version,
    /// then the configured default, then the latest available.
    pub fn resolve_version(&self, explicit: Option<u32>, result: &AssessmentResult) -> u32 {
        explicit
            .or(result.template_version)
            .or(self.default_version)
            .unwrap_or_else(|| self.latest_version())
    }

    pub fn list_versions(&self) -> Vec<u32> {
        self.store.list_versions()
    }

    pub fn latest_version(&self) -> u32 {
        self.store.latest_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use psyreport_templates::{MemoryStore, BUNDLED_V0};

    const RESULT: &str = r#"{
        "testTitle": "T",
        "groupName": "Cohort",
        "totalScore": 18,
        "totalQuestions": 20,
        "timeSpent": 125,
        "completedAt": "2026-03-14T09:05:00Z",
        "sections": [
            {"sectionName": "Verbal", "sectionType": "score", "score": 18, "totalQuestions": 20, "percentage": 90}
        ]
    }"#;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap())
    }

    fn renderer() -> ReportRenderer {
        ReportRenderer::new(MemoryStore::new().with_template(0, BUNDLED_V0)).with_clock(clock())
    }

    fn result() -> AssessmentResult {
        AssessmentResult::from_json(RESULT).unwrap()
    }

    #[test]
    fn end_to_end_score_report() {
        let html = renderer().render(0, &result()).unwrap();

        assert!(html.contains("18/20"));
        assert!(html.contains("score-excellent"));
        assert!(html.contains("badge-excellent"));
        assert!(html.contains("Verbal"));
        assert!(!html.contains("isTagSection"));
        assert!(!html.contains("{{"));
        assert!(html.contains("Report generated October 19, 2026 at 02:05 PM"));
    }

    #[test]
    fn render_is_idempotent_with_fixed_clock() {
        let r = renderer();
        let res = result();
        assert_eq!(r.render(0, &res).unwrap(), r.render(0, &res).unwrap());
    }

    #[test]
    fn missing_version_renders_like_version_zero() {
        let r = renderer();
        let res = result();
        assert_eq!(r.render(7, &res).unwrap(), r.render(0, &res).unwrap());
    }

    #[test]
    fn template_version_reflects_resolved_template() {
        let r = ReportRenderer::new(
            MemoryStore::new()
                .with_template(0, "v{{templateVersion}}")
                .with_template(3, "v{{templateVersion}}"),
        )
        .with_clock(clock());
        let res = result();
        assert_eq!(r.render(3, &res).unwrap(), "v3");
        assert_eq!(r.render(5, &res).unwrap(), "v0");
    }

    #[test]
    fn view_model_uses_resolved_version() {
        let r = ReportRenderer::new(
            MemoryStore::new()
                .with_template(0, "zero")
                .with_template(2, "two"),
        )
        .with_clock(clock());
        let res = result();

        assert_eq!(r.view_model(2, &res).unwrap().template_version, 2);
        assert_eq!(r.view_model(99, &res).unwrap().template_version, 0);

        let empty = ReportRenderer::new(MemoryStore::new()).with_clock(clock());
        assert!(empty.view_model(1, &res).unwrap_err().source.is_not_found());
    }

    #[test]
    fn missing_templates_wrap_not_found() {
        let r = ReportRenderer::new(MemoryStore::new()).with_clock(clock());
        let err = r.render(2, &result()).unwrap_err();
        assert_eq!(err.version, 2);
        assert!(err.source.is_not_found());
        assert!(err.to_string().contains("failed to render report"));
    }

    #[test]
    fn syntax_errors_wrap_into_render_error() {
        let r = ReportRenderer::new(MemoryStore::new().with_template(0, "{{#sections}}"))
            .with_clock(clock());
        let err = r.render(0, &result()).unwrap_err();
        assert!(matches!(err.source, TemplateError::Syntax { .. }));
    }

    #[test]
    fn unknown_placeholder_survives_rendering() {
        let r = ReportRenderer::new(MemoryStore::new().with_template(0, "{{testTitle}} {{percentile}}"))
            .with_clock(clock());
        assert_eq!(r.render(0, &result()).unwrap(), "T {{percentile}}");
    }

    #[test]
    fn version_resolution_order() {
        let store = MemoryStore::new()
            .with_template(0, "zero")
            .with_template(1, "one")
            .with_template(4, "four");
        let r = ReportRenderer::new(store).with_clock(clock());
        let mut res = result();

        assert_eq!(r.resolve_version(None, &res), 4);
        assert_eq!(r.render_default(&res).unwrap(), "four");

        let r = r.with_default_version(Some(1));
        assert_eq!(r.resolve_version(None, &res), 1);

        res.template_version = Some(0);
        assert_eq!(r.resolve_version(None, &res), 0);
        assert_eq!(r.resolve_version(Some(4), &res), 4);
    }

    #[test]
    fn renderer_is_shareable_across_threads() {
        let r = renderer();
        let res = result();
        let expected = r.render(0, &res).unwrap();

        let outputs: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| r.render(0, &res).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(outputs.iter().all(|o| *o == expected));
    }
}
