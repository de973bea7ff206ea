//! Config command - Inspect and validate the drivepop configuration

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use drivepop_core::config::Config;

use crate::output::{OutputFormat, Printer};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the current configuration
    Show,
    /// Validate the configuration file
    Validate,
}

impl ConfigCommand {
    pub async fn execute(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(config_path, format),
            ConfigCommand::Validate => self.execute_validate(config_path, format),
        }
    }

    fn execute_show(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let out = Printer::new(format);
        let config = Config::load(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        info!(config_path = %config_path.display(), "Showing configuration");

        if format.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            out.document(&json);
        } else {
            out.done(&format!("Configuration ({})", config_path.display()));
            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                out.detail(line);
            }
        }
        Ok(())
    }

    fn execute_validate(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let out = Printer::new(format);

        let errors: Vec<(String, String)> = match Config::load(config_path) {
            Ok(config) => config
                .validate()
                .into_iter()
                .map(|e| (e.field, e.message))
                .collect(),
            Err(e) => vec![("file".to_string(), format!("{e:#}"))],
        };

        if format.is_json() {
            let errors_json: Vec<serde_json::Value> = errors
                .iter()
                .map(|(field, message)| serde_json::json!({"field": field, "message": message}))
                .collect();
            out.document(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": errors_json,
            }));
        } else if errors.is_empty() {
            out.done(&format!(
                "Configuration is valid ({})",
                config_path.display()
            ));
        } else {
            out.failure(&format!(
                "Configuration has {} error(s) ({})",
                errors.len(),
                config_path.display()
            ));
            for (field, message) in &errors {
                out.detail(&format!("{field} - {message}"));
            }
        }
        Ok(())
    }
}
