//! Deletion policy for unmanaged items
//!
//! - `trash`: every unmanaged item goes into a single
//!   [`ICloudProvider::trash_items`] call; failures are logged per item.
//! - `dry`: candidates are only logged.
//! - `skip`: the unmanaged items are not even enumerated.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{error, info, warn};

use drivepop_core::config::DeletionPolicy;
use drivepop_core::domain::RemoteId;
use drivepop_core::ports::ICloudProvider;

use crate::reconcile::{UnmanagedItem, UnmanagedItems};

/// A candidate that could not be trashed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeFailure {
    pub id: RemoteId,
    pub path: String,
    pub error: String,
}

/// Result of applying a deletion policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    pub policy: DeletionPolicy,
    /// Unmanaged items found (empty for `skip`)
    pub candidates: Vec<UnmanagedItem>,
    /// Items successfully moved to the trash
    pub trashed: usize,
    pub failures: Vec<PurgeFailure>,
}

impl PurgeSummary {
    fn new(policy: DeletionPolicy) -> Self {
        Self {
            policy,
            candidates: Vec::new(),
            trashed: 0,
            failures: Vec::new(),
        }
    }
}

/// Applies `policy` to the items produced by `unmanaged`
///
/// # Errors
/// Fails if enumeration fails or no trash request could be delivered.
/// Individual trash failures, including candidates the provider returned
/// no outcome for, are reported in [`PurgeSummary::failures`].
pub async fn purge(
    cloud_provider: &dyn ICloudProvider,
    mut unmanaged: UnmanagedItems<'_>,
    policy: DeletionPolicy,
) -> Result<PurgeSummary> {
    let mut summary = PurgeSummary::new(policy);

    match policy {
        DeletionPolicy::Skip => {
            info!("Deletion policy is skip, not looking for unmanaged items");
        }
        DeletionPolicy::Dry => {
            while let Some(item) = unmanaged.next().await? {
                warn!(path = %item.path, id = %item.id, "Dry run: would trash unmanaged item");
                summary.candidates.push(item);
            }
            info!(
                candidates = summary.candidates.len(),
                "Dry run complete, nothing trashed"
            );
        }
        DeletionPolicy::Trash => {
            summary.candidates = unmanaged.collect_all().await?;
            if summary.candidates.is_empty() {
                info!("No unmanaged items to trash");
                return Ok(summary);
            }

            for item in &summary.candidates {
                info!(path = %item.path, id = %item.id, "Trashing unmanaged item");
            }
            let ids: Vec<RemoteId> = summary.candidates.iter().map(|i| i.id.clone()).collect();
            let outcomes = cloud_provider
                .trash_items(&ids)
                .await
                .context("Batch trash request failed")?;

            let mut results: HashMap<RemoteId, Result<(), String>> = outcomes
                .into_iter()
                .map(|outcome| (outcome.id, outcome.result))
                .collect();
            for item in &summary.candidates {
                let result = results
                    .remove(&item.id)
                    .unwrap_or_else(|| Err("no outcome reported for item".to_string()));
                match result {
                    Ok(()) => summary.trashed += 1,
                    Err(message) => {
                        error!(path = %item.path, id = %item.id, error = %message, "Failed to trash item");
                        summary.failures.push(PurgeFailure {
                            id: item.id.clone(),
                            path: item.path.clone(),
                            error: message,
                        });
                    }
                }
            }
            info!(
                trashed = summary.trashed,
                failed = summary.failures.len(),
                "Trash complete"
            );
        }
    }

    Ok(summary)
}
