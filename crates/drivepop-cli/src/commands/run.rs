//! Run command - Full mirror pass using the configured deletion policy

use std::path::Path;

use anyhow::Result;
use clap::Args;
use tracing::info;

use drivepop_core::config::{Config, DeletionPolicy};

use super::populate::print_populate_summary;
use super::purge::{apply_policy, print_purge_summary, purge_json};
use crate::output::{OutputFormat, Printer};

/// Mirror the source tree and apply `deletion` from the configuration
#[derive(Debug, Args)]
pub struct RunCommand {}

impl RunCommand {
    pub async fn execute(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let config = super::load_config(config_path)?;
        let policy = config.deletion;
        mirror_and_purge(&config, policy, format).await
    }
}

/// Populates, then reconciles against the run index with `policy`
///
/// Exits with an error when any unmanaged item failed to be trashed.
pub(crate) async fn mirror_and_purge(
    config: &Config,
    policy: DeletionPolicy,
    format: OutputFormat,
) -> Result<()> {
    let out = Printer::new(format);

    let provider = super::connect(config).await?;
    let (engine, populated) = super::populate(provider.clone(), config).await?;

    info!(policy = %policy, "Reconciling");
    let purged = apply_policy(provider, &engine, policy).await?;

    if format.is_json() {
        out.document(&serde_json::json!({
            "populate": serde_json::to_value(&populated)?,
            "purge": purge_json(&purged)?,
        }));
    } else {
        print_populate_summary(&out, &config.base_name, &populated);
        print_purge_summary(&out, &purged);
    }

    if !purged.failures.is_empty() {
        anyhow::bail!(
            "{} of {} unmanaged items could not be trashed",
            purged.failures.len(),
            purged.candidates.len()
        );
    }
    Ok(())
}
