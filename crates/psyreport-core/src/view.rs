//! Presentation mapping from an [`AssessmentResult`] to a [`ViewModel`].
//!
//! Everything here is pure: the generation timestamp and the resolved
//! template version arrive through [`RenderContext`] instead of being read
//! from the clock or the store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{Scope, Value};
use crate::model::{AssessmentResult, Section, SectionShape, TagCount};

/// Long-form date with time of day, e.g. "March 14, 2026 at 09:05 AM".
pub const DATE_FORMAT: &str = "%B %-d, %Y at %I:%M %p";

/// Inputs to the mapper that do not come from the result itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// Template version actually used for rendering.
    pub template_version: u32,
    /// Timestamp printed as the report generation date.
    pub generated_at: DateTime<Utc>,
}

/// Performance tier derived from a section percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Tier {
    /// `>= 80` is excellent, `>= 60` is good, anything lower needs improvement.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Tier::Excellent
        } else if percentage >= 60.0 {
            Tier::Good
        } else {
            Tier::NeedsImprovement
        }
    }

    /// CSS-friendly slug shared by the score, progress, and badge classes.
    pub fn slug(&self) -> &'static str {
        match self {
            Tier::Excellent => "excellent",
            Tier::Good => "good",
            Tier::NeedsImprovement => "needs-improvement",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent",
            Tier::Good => "Good",
            Tier::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// The presentational projection of a result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub test_title: String,
    pub group_name: String,
    pub overall_percentage: u32,
    pub total_score: u32,
    pub total_questions: u32,
    pub time_spent: String,
    pub section_count: usize,
    pub completed_date: String,
    pub template_version: u32,
    pub generated_date: String,
    pub sections: Vec<ProcessedSection>,
}

/// A section ready for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSection {
    pub section_name: String,
    pub section_type: String,
    pub kind: SectionKind,
}

/// Exactly one of the two section shapes, or neither.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum SectionKind {
    Score(ScoreSummary),
    Tags(TagSummary),
    /// Matched neither shape. Renders the name only.
    Unclassified,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    pub incorrect: u32,
    pub tier: Tier,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    /// Sum of the section's tag counts. Wider than a single count.
    pub total_count: u64,
    pub tags: Vec<TagDisplay>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDisplay {
    pub name: String,
    pub count: u32,
    pub color: String,
    /// Share of this tag within its section, rounded to a whole percent.
    pub percentage: u32,
}

impl ProcessedSection {
    pub fn is_score_section(&self) -> bool {
        matches!(self.kind, SectionKind::Score(_))
    }

    pub fn is_tag_section(&self) -> bool {
        matches!(self.kind, SectionKind::Tags(_))
    }
}

/// Build the view model for one render call.
pub fn build_view_model(result: &AssessmentResult, ctx: &RenderContext) -> ViewModel {
    let sections: Vec<ProcessedSection> = result.sections.iter().map(process_section).collect();

    ViewModel {
        test_title: result.test_title.clone(),
        group_name: result.group_name.clone(),
        overall_percentage: overall_percentage(result.total_score, result.total_questions),
        total_score: result.total_score,
        total_questions: result.total_questions,
        time_spent: format_elapsed(result.time_spent),
        section_count: sections.len(),
        completed_date: format_date(&result.completed_at),
        template_version: ctx.template_version,
        generated_date: format_date(&ctx.generated_at),
        sections,
    }
}

fn process_section(section: &Section) -> ProcessedSection {
    let kind = match section.shape() {
        SectionShape::Score {
            score,
            total_questions,
            percentage,
        } => SectionKind::Score(ScoreSummary {
            score,
            total_questions,
            percentage,
            incorrect: total_questions.saturating_sub(score),
            tier: Tier::from_percentage(percentage),
        }),
        SectionShape::Tags(tags) => SectionKind::Tags(summarize_tags(tags)),
        SectionShape::Malformed => {
            tracing::debug!(
                section = %section.section_name,
                "section matches neither score nor tag shape, rendering inert"
            );
            SectionKind::Unclassified
        }
    };

    ProcessedSection {
        section_name: section.section_name.clone(),
        section_type: section.section_type.clone(),
        kind,
    }
}

fn summarize_tags(tags: &[TagCount]) -> TagSummary {
    let total_count: u64 = tags.iter().map(|t| u64::from(t.count)).sum();
    let tags = tags
        .iter()
        .map(|t| TagDisplay {
            name: t.tag.clone(),
            count: t.count,
            color: t.color.clone(),
            percentage: ratio_percent(u64::from(t.count), total_count),
        })
        .collect();
    TagSummary { total_count, tags }
}

/// `round(score / questions * 100)`, or 0 when there are no questions.
pub fn overall_percentage(total_score: u32, total_questions: u32) -> u32 {
    ratio_percent(u64::from(total_score), u64::from(total_questions))
}

fn ratio_percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

/// Format elapsed seconds as `"{h}h {m}m"` or `"{m}m"`, truncating both parts.
pub fn format_elapsed(seconds: u64) -> String {
    if seconds >= 3600 {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        format!("{hours}h {minutes}m")
    } else {
        format!("{}m", seconds / 60)
    }
}

pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

/// Stringify a number without thousands separators or padded decimals.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

impl ViewModel {
    /// Flatten into the name → value bindings the engine evaluates against.
    pub fn to_scope(&self) -> Scope {
        let mut scope = Scope::new();
        scope.insert("testTitle", Value::text(&self.test_title));
        scope.insert("groupName", Value::text(&self.group_name));
        scope.insert("overallPercentage", Value::text(self.overall_percentage));
        scope.insert("totalScore", Value::text(self.total_score));
        scope.insert("totalQuestions", Value::text(self.total_questions));
        scope.insert("timeSpent", Value::text(&self.time_spent));
        scope.insert("sectionCount", Value::text(self.section_count));
        scope.insert("completedDate", Value::text(&self.completed_date));
        scope.insert("templateVersion", Value::text(self.template_version));
        scope.insert("generatedDate", Value::text(&self.generated_date));
        scope.insert(
            "sections",
            Value::List(self.sections.iter().map(ProcessedSection::to_scope).collect()),
        );
        scope
    }
}

impl ProcessedSection {
    fn to_scope(&self) -> Scope {
        let mut scope = Scope::new();
        scope.insert("sectionName", Value::text(&self.section_name));
        scope.insert("sectionType", Value::text(&self.section_type));
        scope.insert("isScoreSection", Value::Flag(self.is_score_section()));
        scope.insert("isTagSection", Value::Flag(self.is_tag_section()));

        match &self.kind {
            SectionKind::Score(s) => {
                scope.insert("score", Value::text(s.score));
                scope.insert("totalQuestions", Value::text(s.total_questions));
                scope.insert("percentage", Value::text(format_number(s.percentage)));
                scope.insert("incorrect", Value::text(s.incorrect));
                scope.insert("tier", Value::text(s.tier.slug()));
                scope.insert("scoreClass", Value::text(format!("score-{}", s.tier)));
                scope.insert("progressClass", Value::text(format!("progress-{}", s.tier)));
                scope.insert("badgeClass", Value::text(format!("badge-{}", s.tier)));
                scope.insert("statusLabel", Value::text(s.tier.label()));
            }
            SectionKind::Tags(t) => {
                scope.insert("totalTagCount", Value::text(t.total_count));
                let tags = t
                    .tags
                    .iter()
                    .map(|tag| {
                        let mut item = Scope::new();
                        item.insert("tagName", Value::text(&tag.name));
                        item.insert("tagCount", Value::text(tag.count));
                        item.insert("tagColor", Value::text(&tag.color));
                        item.insert("tagPercentage", Value::text(tag.percentage));
                        item
                    })
                    .collect();
                scope.insert("tags", Value::List(tags));
            }
            SectionKind::Unclassified => {}
        }
        scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ctx() -> RenderContext {
        RenderContext {
            template_version: 0,
            generated_at: Utc.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap(),
        }
    }

    fn result_with(sections: Vec<Section>) -> AssessmentResult {
        AssessmentResult {
            test_title: "T".into(),
            group_name: "G".into(),
            total_score: 18,
            total_questions: 20,
            time_spent: 125,
            completed_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 5, 0).unwrap(),
            template_version: None,
            sections,
        }
    }

    fn score_section(name: &str, percentage: f64) -> Section {
        Section {
            section_name: name.into(),
            section_type: "score".into(),
            score: Some(18),
            total_questions: Some(20),
            percentage: Some(percentage),
            tags: None,
        }
    }

    fn tag_section(name: &str) -> Section {
        Section {
            section_name: name.into(),
            section_type: "tag".into(),
            tags: Some(vec![
                TagCount {
                    tag: "Analytical".into(),
                    count: 3,
                    color: "#2563eb".into(),
                },
                TagCount {
                    tag: "Creative".into(),
                    count: 1,
                    color: "#db2777".into(),
                },
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn tier_boundaries_are_exact() {
        assert_eq!(Tier::from_percentage(79.0), Tier::Good);
        assert_eq!(Tier::from_percentage(80.0), Tier::Excellent);
        assert_eq!(Tier::from_percentage(59.0), Tier::NeedsImprovement);
        assert_eq!(Tier::from_percentage(60.0), Tier::Good);
        assert_eq!(Tier::from_percentage(59.9), Tier::NeedsImprovement);
        assert_eq!(Tier::NeedsImprovement.to_string(), "needs-improvement");
    }

    #[test]
    fn elapsed_time_formatting() {
        assert_eq!(format_elapsed(125), "2m");
        assert_eq!(format_elapsed(3661), "1h 1m");
        assert_eq!(format_elapsed(59), "0m");
        assert_eq!(format_elapsed(3600), "1h 0m");
        assert_eq!(format_elapsed(7199), "1h 59m");
    }

    #[test]
    fn overall_percentage_rounds_and_handles_zero_questions() {
        assert_eq!(overall_percentage(18, 20), 90);
        assert_eq!(overall_percentage(2, 3), 67);
        assert_eq!(overall_percentage(1, 8), 13);
        assert_eq!(overall_percentage(5, 0), 0);
    }

    #[test]
    fn date_formatting_long_form() {
        let at = Utc.with_ymd_and_hms(2026, 3, 4, 21, 7, 0).unwrap();
        assert_eq!(format_date(&at), "March 4, 2026 at 09:07 PM");
    }

    #[test]
    fn number_formatting_keeps_only_carried_decimals() {
        assert_eq!(format_number(90.0), "90");
        assert_eq!(format_number(87.5), "87.5");
        assert_eq!(format_number(1234567.0), "1234567");
    }

    #[test]
    fn shape_flags_are_mutually_exclusive() {
        let malformed = Section {
            section_name: "Broken".into(),
            ..Default::default()
        };
        let vm = build_view_model(
            &result_with(vec![score_section("Verbal", 90.0), tag_section("Style"), malformed]),
            &ctx(),
        );

        let flags: Vec<(bool, bool)> = vm
            .sections
            .iter()
            .map(|s| (s.is_score_section(), s.is_tag_section()))
            .collect();
        assert_eq!(flags, vec![(true, false), (false, true), (false, false)]);
        assert_eq!(vm.section_count, 3);
    }

    #[test]
    fn score_section_derives_incorrect_and_tier() {
        let vm = build_view_model(&result_with(vec![score_section("Verbal", 90.0)]), &ctx());
        let SectionKind::Score(summary) = &vm.sections[0].kind else {
            panic!("expected score section");
        };
        assert_eq!(summary.incorrect, 2);
        assert_eq!(summary.tier, Tier::Excellent);
    }

    #[test]
    fn tag_section_keeps_order_and_computes_share() {
        let vm = build_view_model(&result_with(vec![tag_section("Style")]), &ctx());
        let SectionKind::Tags(summary) = &vm.sections[0].kind else {
            panic!("expected tag section");
        };
        assert_eq!(summary.total_count, 4);
        let names: Vec<&str> = summary.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Analytical", "Creative"]);
        assert_eq!(summary.tags[0].percentage, 75);
        assert_eq!(summary.tags[1].color, "#db2777");
    }

    #[test]
    fn tag_total_beyond_u32_range() {
        let huge = Section {
            section_name: "Volume".into(),
            section_type: "tag".into(),
            tags: Some(vec![
                TagCount {
                    tag: "A".into(),
                    count: 3_000_000_000,
                    color: "#000".into(),
                },
                TagCount {
                    tag: "B".into(),
                    count: 3_000_000_000,
                    color: "#fff".into(),
                },
            ]),
            ..Default::default()
        };
        let vm = build_view_model(&result_with(vec![huge]), &ctx());
        let SectionKind::Tags(summary) = &vm.sections[0].kind else {
            panic!("expected tag section");
        };
        assert_eq!(summary.total_count, 6_000_000_000);
        assert_eq!(summary.tags[0].percentage, 50);
        assert_eq!(summary.tags[1].percentage, 50);

        let scope = vm.sections[0].to_scope();
        assert_eq!(scope.get("totalTagCount"), Some(&Value::text("6000000000")));
    }

    #[test]
    fn top_level_fields() {
        let vm = build_view_model(&result_with(vec![]), &ctx());
        assert_eq!(vm.overall_percentage, 90);
        assert_eq!(vm.time_spent, "2m");
        assert_eq!(vm.completed_date, "March 14, 2026 at 09:05 AM");
        assert_eq!(vm.generated_date, "October 19, 2026 at 02:05 PM");
        assert_eq!(vm.section_count, 0);
    }

    #[test]
    fn unclassified_scope_has_no_shape_fields() {
        let malformed = Section {
            section_name: "Broken".into(),
            section_type: "score".into(),
            score: Some(3),
            ..Default::default()
        };
        let vm = build_view_model(&result_with(vec![malformed]), &ctx());
        let scope = vm.sections[0].to_scope();
        assert!(scope.get("sectionName").is_some());
        assert!(scope.get("score").is_none());
        assert!(scope.get("tags").is_none());
    }

    #[test]
    fn view_model_serializes_for_inspection() {
        let vm = build_view_model(&result_with(vec![score_section("Verbal", 72.0)]), &ctx());
        let json = serde_json::to_value(&vm).unwrap();
        assert_eq!(json["sections"][0]["kind"]["shape"], "score");
        assert_eq!(json["sections"][0]["kind"]["tier"], "good");
    }
}
