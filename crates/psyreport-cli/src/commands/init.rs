//! The `psyreport init` command.

use anyhow::Result;

use psyreport_templates::{DirectoryStore, TemplateStore, BUNDLED_V0};

pub fn execute() -> Result<()> {
    if std::path::Path::new("psyreport.toml").exists() {
        println!("psyreport.toml already exists, skipping.");
    } else {
        std::fs::write("psyreport.toml", SAMPLE_CONFIG)?;
        println!("Created psyreport.toml");
    }

    let store = DirectoryStore::new("templates");
    if store.fetch(0)?.is_some() {
        println!("templates/report-v0.html already exists, skipping.");
    } else {
        store.install(0, BUNDLED_V0)?;
        println!("Created templates/report-v0.html");
    }

    println!("\nNext steps:");
    println!("  1. Copy templates/report-v0.html to report-v1.html and customise it");
    println!("  2. Run: psyreport validate --template templates/report-v1.html");
    println!("  3. Run: psyreport render --result result.json --output report.html");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# psyreport configuration

templates_dir = "./templates"
output_dir = "./reports"
parallelism = 4
# default_version = 1
"#;
