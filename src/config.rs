//! Run configuration.
//!
//! Settings come from three layers, each overriding the one before:
//!
//! 1. stock defaults ([`NormalizeConfig::default`])
//! 2. an optional TOML file passed with `--config`
//! 3. command-line flags
//!
//! Layers are merged as TOML tables with [`merge_toml`], then deserialized and
//! validated once. Nothing is written back; every run starts from the same
//! defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [collect]
//! extensions = ["png", "jpg", "jpeg", "bmp", "gif"]  # matched case-insensitively
//! order = "folder"          # folder | file | random
//! # seed = 42               # makes "random" reproducible
//!
//! [resize]
//! # width = 512             # target width in pixels
//! # height = 512            # target height in pixels
//! # max_side = 1024         # cap on the longest side (never enlarges)
//! square = false            # pad onto a square canvas
//! filter = "lanczos3"       # nearest | triangle | catmull-rom | gaussian | lanczos3
//!
//! [output]
//! background = [255, 255, 255]  # square canvas fill colour
//! caption_extension = "txt"     # sidecar caption extension
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::collect::OrderingPolicy;
use crate::imaging::{ResampleFilter, ResizeSpec, is_decodable_extension};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
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

/// Complete settings for one normalization run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeConfig {
    /// Which files to pick up and in what order.
    pub collect: CollectConfig,
    /// Output geometry.
    pub resize: ResizeConfig,
    /// Output file details.
    pub output: OutputConfig,
}

/// Input discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectConfig {
    /// Recognized image extensions, without the dot.
    pub extensions: Vec<String>,
    pub order: OrderingPolicy,
    /// Seed for [`OrderingPolicy::Random`]. Absent means a fresh shuffle each run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            extensions: ["png", "jpg", "jpeg", "bmp", "gif"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            order: OrderingPolicy::Folder,
            seed: None,
        }
    }
}

/// Output geometry settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_side: Option<u32>,
    pub square: bool,
    pub filter: ResampleFilter,
}

impl ResizeConfig {
    pub fn spec(&self) -> ResizeSpec {
        ResizeSpec {
            width: self.width,
            height: self.height,
            max_side: self.max_side,
            square: self.square,
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Square canvas fill as `[r, g, b]`.
    pub background: [u8; 3],
    /// Extension of caption sidecars, both read and written.
    pub caption_extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            background: [255, 255, 255],
            caption_extension: "txt".to_string(),
        }
    }
}

impl NormalizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("resize.width", self.resize.width),
            ("resize.height", self.resize.height),
            ("resize.max_side", self.resize.max_side),
        ] {
            if value == Some(0) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        if self.collect.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "collect.extensions must not be empty".into(),
            ));
        }
        if let Some(ext) = self
            .collect
            .extensions
            .iter()
            .find(|e| !is_decodable_extension(e))
        {
            return Err(ConfigError::Validation(format!(
                "collect.extensions: no decoder available for '{ext}'"
            )));
        }
        let caption = &self.output.caption_extension;
        if caption.is_empty() {
            return Err(ConfigError::Validation(
                "output.caption_extension must not be empty".into(),
            ));
        }
        if self
            .collect
            .extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(caption))
        {
            return Err(ConfigError::Validation(format!(
                "output.caption_extension '{caption}' is also an image extension"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that file and command-line overrides merge onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(NormalizeConfig::default()).expect("default config must serialize")
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

/// Load a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge the overlays onto the stock defaults in order, then deserialize and validate.
pub fn resolve_config(overlays: Vec<toml::Value>) -> Result<NormalizeConfig, ConfigError> {
    let merged = overlays
        .into_iter()
        .fold(stock_defaults_value(), merge_toml);
    let config: NormalizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config: stock defaults, then `file` if given, then `cli`.
///
/// `cli` is a sparse table holding only the flags the user actually passed.
pub fn load_config(file: Option<&Path>, cli: toml::Value) -> Result<NormalizeConfig, ConfigError> {
    let mut overlays = Vec::new();
    if let Some(path) = file {
        overlays.push(load_raw_config(path)?);
    }
    overlays.push(cli);
    resolve_config(overlays)
}
