//! The `psyreport versions` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use psyreport_templates::{load_config_from, TemplateStore};

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = config.store();

    let versions = store.list_versions();
    let latest = store.latest_version();

    let mut table = Table::new();
    table.set_header(vec!["Version", "File", "Status"]);

    for version in &versions {
        let path = store.template_path(*version);
        let status = if !path.is_file() {
            "missing"
        } else if *version == latest {
            "latest"
        } else {
            "available"
        };
        table.add_row(vec![
            Cell::new(format!("v{version}")),
            Cell::new(path.display()),
            Cell::new(status),
        ]);
    }

    println!("Templates in {}", store.root().display());
    println!("{table}");
    println!("Latest version: {latest}");

    Ok(())
}
