//! Core data model types for psyreport.
//!
//! These types mirror the JSON result object produced by the assessment
//! platform's scoring step. The renderer treats them as already-validated
//! input and never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed assessment, as handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    /// Title of the test that was taken.
    pub test_title: String,
    /// Name of the group the test belongs to.
    #[serde(default)]
    pub group_name: String,
    /// Number of correctly answered questions across all score sections.
    pub total_score: u32,
    /// Number of questions across all score sections.
    pub total_questions: u32,
    /// Elapsed time in seconds.
    #[serde(default)]
    pub time_spent: u64,
    /// When the test was submitted.
    pub completed_at: DateTime<Utc>,
    /// Template version the report should be rendered with, if pinned.
    #[serde(default)]
    pub template_version: Option<u32>,
    /// Report sections in document order.
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// One report subsection.
///
/// Well-formed input carries either the three score fields or a non-empty
/// `tags` list. Use [`Section::shape`] to classify.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_name: String,
    #[serde(default)]
    pub section_type: String,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub total_questions: Option<u32>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub tags: Option<Vec<TagCount>>,
}

/// A tag with the number of answers that mapped to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCount {
    #[serde(alias = "name")]
    pub tag: String,
    pub count: u32,
    #[serde(default = "default_tag_color")]
    pub color: String,
}

fn default_tag_color() -> String {
    "#6b7280".to_string()
}

/// Borrowed view of a section's shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionShape<'a> {
    Score {
        score: u32,
        total_questions: u32,
        percentage: f64,
    },
    Tags(&'a [TagCount]),
    /// Neither shape matched; the section renders inert.
    Malformed,
}

impl Section {
    /// Classify this section. Score fields take priority if both are present.
    pub fn shape(&self) -> SectionShape<'_> {
        if let (Some(score), Some(total_questions), Some(percentage)) =
            (self.score, self.total_questions, self.percentage)
        {
            return SectionShape::Score {
                score,
                total_questions,
                percentage,
            };
        }
        match &self.tags {
            Some(tags) if !tags.is_empty() => SectionShape::Tags(tags),
            _ => SectionShape::Malformed,
        }
    }
}

impl AssessmentResult {
    /// Parse a result from its JSON representation.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}
