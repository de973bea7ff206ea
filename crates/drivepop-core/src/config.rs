//! Configuration module for drivepop.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = ".drivepop.yaml";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for drivepop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name of the managed top-level folder on the drive.
    pub base_name: String,
    /// Local directory whose files are mirrored.
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// Shared drive to mirror into. `None` targets the user's My Drive.
    #[serde(default)]
    pub drive: Option<DriveConfig>,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Glob patterns; a file is mirrored only if it matches at least one.
    pub matchers: Vec<String>,
    /// Glob patterns; a file matching any of them is never mirrored.
    #[serde(default)]
    pub excludes: Vec<String>,
    /// What to do with unmanaged remote items after mirroring.
    #[serde(default)]
    pub deletion: DeletionPolicy,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Shared drive selection: exactly one of `id` or `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Where the bearer token comes from.
///
/// The `DRIVEPOP_ACCESS_TOKEN` environment variable takes precedence over
/// `token_file`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// File holding an OAuth2 access token for the Drive API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

/// Handling of remote items that the run did not create or reuse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionPolicy {
    /// Move unmanaged items to the trash in one batched request.
    Trash,
    /// Only report unmanaged items.
    #[default]
    #[serde(alias = "dry-run")]
    Dry,
    /// Do not look for unmanaged items at all.
    Skip,
}

impl fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeletionPolicy::Trash => "trash",
            DeletionPolicy::Dry => "dry",
            DeletionPolicy::Skip => "skip",
        };
        write!(f, "{s}")
    }
}

fn default_source() -> PathBuf {
    PathBuf::from(".")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Default configuration path: `.drivepop.yaml` in the working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// The token file with a leading `~` expanded.
    pub fn token_file(&self) -> Option<PathBuf> {
        self.credentials.token_file.as_deref().map(expand_home)
    }
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"drive.name"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- base_name ---
        if self.base_name.trim().is_empty() {
            errors.push(ValidationError {
                field: "base_name".into(),
                message: "must not be empty".into(),
            });
        } else if self.base_name.contains('/') || self.base_name == "." || self.base_name == ".."
        {
            errors.push(ValidationError {
                field: "base_name".into(),
                message: format!("must be a single folder name: {}", self.base_name),
            });
        }

        // --- source ---
        let source = expand_home(&self.source);
        if !source.is_dir() {
            errors.push(ValidationError {
                field: "source".into(),
                message: format!("directory does not exist: {}", self.source.display()),
            });
        }

        // --- drive ---
        if let Some(drive) = &self.drive {
            match (&drive.id, &drive.name) {
                (Some(_), Some(_)) => errors.push(ValidationError {
                    field: "drive".into(),
                    message: "set either id or name, not both".into(),
                }),
                (None, None) => errors.push(ValidationError {
                    field: "drive".into(),
                    message: "one of id or name is required".into(),
                }),
                (Some(id), None) if id.trim().is_empty() => errors.push(ValidationError {
                    field: "drive.id".into(),
                    message: "must not be empty".into(),
                }),
                (None, Some(name)) if name.trim().is_empty() => errors.push(ValidationError {
                    field: "drive.name".into(),
                    message: "must not be empty".into(),
                }),
                _ => {}
            }
        }

        // --- matchers / excludes ---
        if self.matchers.is_empty() {
            errors.push(ValidationError {
                field: "matchers".into(),
                message: "at least one pattern is required".into(),
            });
        }
        for (field, patterns) in [("matchers", &self.matchers), ("excludes", &self.excludes)] {
            for (i, pattern) in patterns.iter().enumerate() {
                if let Err(e) = glob::Pattern::new(pattern) {
                    errors.push(ValidationError {
                        field: format!("{field}[{i}]"),
                        message: format!("invalid glob pattern '{pattern}': {e}"),
                    });
                }
            }
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// # Example
///
/// ```rust,no_run
/// use drivepop_core::config::{ConfigBuilder, DeletionPolicy};
///
/// let config = ConfigBuilder::new("Backups")
///     .source("/home/user/notes")
///     .matcher("*.md")
///     .exclude("drafts/*")
///     .deletion(DeletionPolicy::Trash)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from defaults with the given base folder name and no matchers.
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            config: Config {
                base_name: base_name.into(),
                source: default_source(),
                drive: None,
                credentials: CredentialsConfig::default(),
                matchers: Vec::new(),
                excludes: Vec::new(),
                deletion: DeletionPolicy::default(),
                logging: LoggingConfig::default(),
            },
        }
    }

    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.config.source = source.into();
        self
    }

    pub fn drive_id(mut self, id: impl Into<String>) -> Self {
        self.config.drive = Some(DriveConfig {
            id: Some(id.into()),
            name: None,
        });
        self
    }

    pub fn drive_name(mut self, name: impl Into<String>) -> Self {
        self.config.drive = Some(DriveConfig {
            id: None,
            name: Some(name.into()),
        });
        self
    }

    pub fn matcher(mut self, pattern: impl Into<String>) -> Self {
        self.config.matchers.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.config.excludes.push(pattern.into());
        self
    }

    pub fn deletion(mut self, policy: DeletionPolicy) -> Self {
        self.config.deletion = policy;
        self
    }

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
