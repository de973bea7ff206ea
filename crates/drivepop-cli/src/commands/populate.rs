//! Populate command - Mirror the source tree without touching unmanaged items

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use drivepop_sync::engine::PopulateSummary;

use crate::output::{plural, OutputFormat, Printer};

/// Mirror matching files under the base folder
#[derive(Debug, Args)]
pub struct PopulateCommand {}

impl PopulateCommand {
    pub async fn execute(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let out = Printer::new(format);

        let config = super::load_config(config_path)?;
        let provider = super::connect(&config).await?;
        let (_, summary) = super::populate(provider, &config).await?;

        if format.is_json() {
            let json = serde_json::to_value(&summary)
                .context("Failed to serialize populate summary")?;
            out.document(&json);
        } else {
            print_populate_summary(&out, &config.base_name, &summary);
        }
        Ok(())
    }
}

pub(crate) fn print_populate_summary(
    out: &Printer,
    base_name: &str,
    summary: &PopulateSummary,
) {
    out.done(&format!("Mirrored into '{base_name}'"));
    out.detail(&format!(
        "Scanned:   {} ({} matched, {} filtered out)",
        plural(summary.scanned, "file"),
        summary.matched,
        summary.skipped
    ));
    out.detail(&format!("Created:   {}", plural(summary.created, "file")));
    out.detail(&format!("Updated:   {}", plural(summary.updated, "file")));
    out.detail(&format!("Unchanged: {}", plural(summary.unchanged, "file")));
    if summary.folders_created > 0 {
        out.detail(&format!(
            "New folders: {}",
            plural(summary.folders_created, "folder")
        ));
    }
}
