//! Diff settings loaded from an optional TOML file.
//!
//! Every key is optional; stock defaults reproduce the historical behaviour
//! (`threshold = 0.1`, anti-aliased pixels counted, no fetch timeout). A user
//! file is merged on top of the defaults, unknown keys are rejected, and the
//! result is validated.
//!
//! ```toml
//! [compare]
//! threshold = 0.1               # 0.0 = exact match, 1.0 = tolerate anything
//! include_anti_aliased = true   # count anti-aliasing pixels as differences
//! alpha = 0.1                   # fade of unchanged pixels in diff images
//! aa_color = [255, 255, 0]      # anti-aliased pixels in diff images
//! diff_color = [255, 0, 0]      # differing pixels in diff images
//!
//! [fetch]
//! timeout_secs = 30             # per-request timeout (omit to wait forever)
//! ```

use crate::imaging::CompareOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level diff configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// Pixel comparison tolerance and diff-image colours.
    pub compare: CompareConfig,
    /// Network settings for image downloads.
    pub fetch: FetchConfig,
}

impl DiffConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.compare.threshold) {
            return Err(ConfigError::Validation(
                "compare.threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.compare.alpha) {
            return Err(ConfigError::Validation(
                "compare.alpha must be between 0.0 and 1.0".into(),
            ));
        }
        if self.fetch.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    pub threshold: f64,
    pub include_anti_aliased: bool,
    pub alpha: f64,
    pub aa_color: [u8; 3],
    pub diff_color: [u8; 3],
}

impl Default for CompareConfig {
    fn default() -> Self {
        let stock = CompareOptions::default();
        Self {
            threshold: stock.threshold,
            include_anti_aliased: stock.include_anti_aliased,
            alpha: stock.alpha,
            aa_color: stock.aa_color,
            diff_color: stock.diff_color,
        }
    }
}

impl CompareConfig {
    pub fn options(&self) -> CompareOptions {
        CompareOptions {
            threshold: self.threshold,
            include_anti_aliased: self.include_anti_aliased,
            alpha: self.alpha,
            aa_color: self.aa_color,
            diff_color: self.diff_color,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Per-request timeout in seconds. Absent means no timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl FetchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(DiffConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<DiffConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: DiffConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file, or return validated defaults when no path
/// is given. A path that does not exist is an error, not a silent default.
pub fn load_config(path: Option<&Path>) -> Result<DiffConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock config file. Printed by `--gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# imagegallery-diff configuration
# ===============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Pixel comparison
# ---------------------------------------------------------------------------
[compare]
# Matching threshold, 0.0 to 1.0. Smaller values make the comparison more
# sensitive: 0.0 flags any change at all, 1.0 tolerates every change.
threshold = 0.1

# Count pixels that look like anti-aliasing as differences.
include_anti_aliased = true

# Opacity of unchanged pixels in --diff-dir images, 0.0 to 1.0.
alpha = 0.1

# Colour of anti-aliased pixels in --diff-dir images (only drawn when
# include_anti_aliased = false).
aa_color = [255, 255, 0]

# Colour of differing pixels in --diff-dir images.
diff_color = [255, 0, 0]

# ---------------------------------------------------------------------------
# Image downloads
# ---------------------------------------------------------------------------
[fetch]
# Per-request timeout in seconds. Omit to wait indefinitely.
# timeout_secs = 30
"##
}
