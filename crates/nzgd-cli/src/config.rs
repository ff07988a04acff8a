//! Layered settings: optional TOML file, then `NZGD_*` environment variables.
//! Command-line flags override both.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Deserialize;

/// Shape of `nzgd.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
  /// Database used when `--db-path` is not given.
  #[serde(default)]
  pub db_path:              Option<PathBuf>,
  /// Fallbacks for omitted `all-vs30s` arguments.
  #[serde(default)]
  pub default_correlations: CorrelationDefaults,
}

#[derive(Debug, Default, Deserialize)]
pub struct CorrelationDefaults {
  pub vs30_correlation:      Option<String>,
  pub cpt_to_vs_correlation: Option<String>,
  pub spt_to_vs_correlation: Option<String>,
  pub hammer_type:           Option<String>,
}

impl Settings {
  /// Load `path` (if it exists) and overlay the environment.
  ///
  /// Nested keys use a double underscore, e.g.
  /// `NZGD_DEFAULT_CORRELATIONS__HAMMER_TYPE=Standard`.
  pub fn load(path: &Path) -> Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("NZGD").prefix_separator("_").separator("__"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}
