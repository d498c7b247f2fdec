//! Engine configuration.
//!
//! Hosts usually embed this as a `[filter]` table in their own config file:
//!
//! ```toml
//! week_start = "sunday"
//! suggestion_limit = 8
//! parallel_threshold = 1024
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of completions returned by `suggest`.
const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Default batch size above which evaluation is spread across threads.
const DEFAULT_PARALLEL_THRESHOLD: usize = 512;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML could not be parsed or had the wrong shape.
    #[error("invalid filter configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// First day of the week for `sow` / `eow`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

/// Tunables for the filter engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Day `sow` resolves to.
    #[serde(default)]
    pub week_start: WeekStart,

    /// Maximum number of completions from `suggest`.
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    /// Task count above which `filter_tasks` evaluates in parallel.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_suggestion_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

fn default_parallel_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            week_start: WeekStart::default(),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl FilterConfig {
    /// Parses configuration from TOML; missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}
