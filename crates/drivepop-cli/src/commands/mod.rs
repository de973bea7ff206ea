//! CLI command implementations
//!
//! Each subcommand lives in its own module; the helpers below load the
//! configuration and connect to Drive the same way for all of them.

pub mod config;
pub mod populate;
pub mod purge;
pub mod run;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info};

use drivepop_core::config::Config;
use drivepop_core::domain::RemoteId;
use drivepop_core::ports::ICloudProvider;
use drivepop_gdrive::client::DriveClient;
use drivepop_gdrive::provider::DriveCloudProvider;
use drivepop_sync::engine::{PopulateSummary, SyncEngine};
use drivepop_sync::filesystem::LocalFileSystemAdapter;

/// Environment variable holding a Drive access token
pub const ACCESS_TOKEN_ENV: &str = "DRIVEPOP_ACCESS_TOKEN";

/// Loads the configuration, failing with every validation error joined
pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    let errors = config.validate();
    if !errors.is_empty() {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        bail!("Invalid configuration: {joined}");
    }
    Ok(config)
}

/// Resolves the access token: environment first, then the configured token file
pub fn access_token(config: &Config) -> Result<String> {
    token_from(std::env::var(ACCESS_TOKEN_ENV).ok(), config)
}

fn token_from(env_token: Option<String>, config: &Config) -> Result<String> {
    if let Some(token) = env_token.map(|t| t.trim().to_string()) {
        if !token.is_empty() {
            debug!("Using access token from {ACCESS_TOKEN_ENV}");
            return Ok(token);
        }
    }

    let path = config.token_file().ok_or_else(|| {
        anyhow!("No access token: set {ACCESS_TOKEN_ENV} or credentials.token_file")
    })?;
    let token = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read token file {}", path.display()))?;
    let token = token.trim();
    if token.is_empty() {
        bail!("Token file {} is empty", path.display());
    }
    Ok(token.to_string())
}

/// Builds the Drive provider, resolving a shared drive by name if needed
///
/// A shared drive that cannot be found is fatal before any mutation.
pub async fn connect(config: &Config) -> Result<Arc<dyn ICloudProvider>> {
    let client = DriveClient::new(access_token(config)?);
    let provider = DriveCloudProvider::new(client);

    let provider = match &config.drive {
        None => {
            info!("Using My Drive");
            provider
        }
        Some(drive) => match (&drive.id, &drive.name) {
            (Some(id), _) => {
                let id = RemoteId::new(id.clone()).context("Invalid drive.id")?;
                info!(drive_id = %id, "Using shared drive");
                provider.with_shared_drive(id)
            }
            (None, Some(name)) => {
                let id = provider
                    .find_drive(name)
                    .await
                    .with_context(|| format!("Failed to look up shared drive '{name}'"))?
                    .ok_or_else(|| anyhow!("Shared drive '{name}' not found"))?;
                info!(drive = %name, drive_id = %id, "Using shared drive");
                provider.with_shared_drive(id)
            }
            (None, None) => bail!("drive needs an id or a name"),
        },
    };

    Ok(Arc::new(provider))
}

/// Creates an engine over the real filesystem and runs one populate pass
pub async fn populate(
    cloud_provider: Arc<dyn ICloudProvider>,
    config: &Config,
) -> Result<(SyncEngine, PopulateSummary)> {
    let mut engine = SyncEngine::new(
        cloud_provider,
        Arc::new(LocalFileSystemAdapter::new()),
        config,
    )?;
    let summary = engine.populate().await?;
    Ok((engine, summary))
}
