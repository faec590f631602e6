use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use taskboard_core::DEFAULT_ACTIVITY_CAPACITY;
use taskboard_core::OrderingPolicy;

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Board configuration loaded from `<data-dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Number of activity log entries kept.
    pub activity_capacity: usize,
    /// Order key tunables.
    pub ordering: OrderingPolicy,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            activity_capacity: DEFAULT_ACTIVITY_CAPACITY,
            ordering: OrderingPolicy::default(),
        }
    }
}

impl BoardConfig {
    /// Load `config.toml` from `data_dir`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// holds out-of-range values.
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self> {
        let config_path = data_dir.as_ref().join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        Self::parse(&contents).with_context(|| format!("failed to load {}", config_path.display()))
    }

    /// Parse and validate configuration text.
    ///
    /// # Errors
    /// Returns an error if the text is not valid TOML or holds out-of-range
    /// values.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.activity_capacity == 0 {
            bail!("activity_capacity must be greater than 0");
        }
        let OrderingPolicy { gap, min_gap } = self.ordering;
        if !gap.is_finite() || gap <= 0.0 {
            bail!("ordering.gap must be a positive number, got {gap}");
        }
        if !min_gap.is_finite() || min_gap < 0.0 {
            bail!("ordering.min_gap must not be negative, got {min_gap}");
        }
        if min_gap >= gap {
            bail!("ordering.min_gap ({min_gap}) must be smaller than ordering.gap ({gap})");
        }
        Ok(())
    }
}
