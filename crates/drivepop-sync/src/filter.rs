//! Include/exclude filtering of source files
//!
//! Patterns are shell-style globs matched against the source-relative path
//! written with `/` separators. As with `fnmatch`, `*` also matches `/`, so
//! `*.txt` selects text files at any depth.

use std::path::{Component, Path};

use glob::{MatchOptions, Pattern};

use drivepop_core::config::Config;

use crate::SyncError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compiled include and exclude patterns
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl FileFilter {
    /// Compiles the two pattern lists
    ///
    /// # Errors
    /// Returns [`SyncError::InvalidPattern`] for the first pattern that does
    /// not parse.
    pub fn new<I, E, S>(include: I, exclude: E) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Builds the filter from the `matchers` and `excludes` settings
    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        Self::new(&config.matchers, &config.excludes)
    }

    /// Returns true if `relative` matches an include pattern and no exclude pattern
    #[must_use]
    pub fn matches(&self, relative: &Path) -> bool {
        let candidate = slash_path(relative);
        self.include
            .iter()
            .any(|p| p.matches_with(&candidate, MATCH_OPTIONS))
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_with(&candidate, MATCH_OPTIONS))
    }
}

fn compile<I, S>(patterns: I) -> Result<Vec<Pattern>, SyncError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|p| {
            Pattern::new(p.as_ref()).map_err(|source| SyncError::InvalidPattern {
                pattern: p.as_ref().to_string(),
                source,
            })
        })
        .collect()
}

/// Joins the normal components of `path` with `/`
fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
