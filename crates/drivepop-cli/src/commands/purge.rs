//! Purge command - Mirror, then apply a deletion policy to unmanaged items

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use drivepop_core::config::DeletionPolicy;
use drivepop_core::ports::ICloudProvider;
use drivepop_sync::engine::SyncEngine;
use drivepop_sync::purge::{purge, PurgeSummary};
use drivepop_sync::reconcile::Reconciler;

use crate::output::{plural, OutputFormat, Printer};

/// Deletion policy as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Move unmanaged items to the trash
    Trash,
    /// Only list unmanaged items
    #[value(alias = "dry-run")]
    Dry,
    /// Leave unmanaged items alone
    Skip,
}

impl From<PolicyArg> for DeletionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Trash => DeletionPolicy::Trash,
            PolicyArg::Dry => DeletionPolicy::Dry,
            PolicyArg::Skip => DeletionPolicy::Skip,
        }
    }
}

/// Mirror the source tree, then handle unmanaged remote items
#[derive(Debug, Args)]
pub struct PurgeCommand {
    /// Deletion policy (overrides `deletion` from the configuration)
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

impl PurgeCommand {
    pub async fn execute(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let config = super::load_config(config_path)?;
        let policy = self.policy.map(DeletionPolicy::from).unwrap_or(config.deletion);
        super::run::mirror_and_purge(&config, policy, format).await
    }
}

pub(crate) fn print_purge_summary(out: &Printer, summary: &PurgeSummary) {
    match summary.policy {
        DeletionPolicy::Skip => {
            out.detail("Deletion policy: skip (unmanaged items not checked)");
        }
        DeletionPolicy::Dry => {
            if summary.candidates.is_empty() {
                out.done("No unmanaged items");
                return;
            }
            out.warning(&format!(
                "{} would be trashed (dry run)",
                plural(summary.candidates.len(), "unmanaged item")
            ));
            for item in &summary.candidates {
                let kind = if item.is_folder { "folder" } else { "file" };
                out.detail(&format!("{} ({kind}, {})", item.path, item.id));
            }
        }
        DeletionPolicy::Trash => {
            if summary.candidates.is_empty() {
                out.done("No unmanaged items");
                return;
            }
            out.done(&format!(
                "Trashed {}",
                plural(summary.trashed, "unmanaged item")
            ));
            for failure in &summary.failures {
                out.failure(&format!("{} ({}): {}", failure.path, failure.id, failure.error));
            }
        }
    }
}

pub(crate) fn purge_json(summary: &PurgeSummary) -> Result<serde_json::Value> {
    serde_json::to_value(summary).context("Failed to serialize purge summary")
}

/// Applies `policy` to whatever `engine` left unmanaged
pub(crate) async fn apply_policy(
    provider: Arc<dyn ICloudProvider>,
    engine: &SyncEngine,
    policy: DeletionPolicy,
) -> Result<PurgeSummary> {
    let reconciler = Reconciler::new(provider.clone(), engine.base_name());
    purge(&*provider, reconciler.unmanaged(engine.index()), policy).await
}
