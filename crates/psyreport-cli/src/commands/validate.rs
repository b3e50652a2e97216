//! The `psyreport validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use psyreport_core::template::Template;

/// Names the renderer binds at report, section, and tag level.
const KNOWN_NAMES: &[&str] = &[
    // report
    "testTitle",
    "groupName",
    "overallPercentage",
    "totalScore",
    "totalQuestions",
    "timeSpent",
    "sectionCount",
    "completedDate",
    "templateVersion",
    "generatedDate",
    "sections",
    // section
    "sectionName",
    "sectionType",
    "isScoreSection",
    "isTagSection",
    "score",
    "percentage",
    "incorrect",
    "tier",
    "scoreClass",
    "progressClass",
    "badgeClass",
    "statusLabel",
    "totalTagCount",
    "tags",
    // tag
    "tagName",
    "tagCount",
    "tagColor",
    "tagPercentage",
];

pub fn execute(template_path: PathBuf) -> Result<()> {
    let source = std::fs::read_to_string(&template_path)
        .with_context(|| format!("failed to read template: {}", template_path.display()))?;
    let template = Template::parse(&source)
        .with_context(|| format!("invalid template: {}", template_path.display()))?;

    let names = template.referenced_names();
    println!(
        "Template: {} ({} names referenced)",
        template_path.display(),
        names.len()
    );

    let unknown: Vec<&String> = names
        .iter()
        .filter(|n| !KNOWN_NAMES.contains(&n.as_str()))
        .collect();

    for name in &unknown {
        println!("  WARNING: unknown name `{name}` will be left verbatim");
    }

    if unknown.is_empty() {
        println!("Template valid.");
    } else {
        println!("\n{} warning(s) found.", unknown.len());
    }

    Ok(())
}
