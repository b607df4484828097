//! JSON configuration and report helpers.

use std::{fs, path::Path};

use hexid_core::{ColorRule, RegionParams};
use hexid_decode::{ExpandParams, ExtractParams, RankParams};
use hexid_preprocess::VariantParams;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, RecoveryParams, RecoveryReport};

#[derive(thiserror::Error, Debug)]
pub enum RecoveryIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// On-disk configuration. Absent fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    #[serde(default)]
    pub color: Option<ColorRule>,
    #[serde(default)]
    pub region: Option<RegionParams>,
    #[serde(default)]
    pub variants: Option<VariantParams>,
    #[serde(default)]
    pub extract: Option<ExtractParams>,
    #[serde(default)]
    pub expand: Option<ExpandParams>,
    #[serde(default)]
    pub rank: Option<RankParams>,
    #[serde(default)]
    pub max_width: Option<u32>,
    #[serde(default)]
    pub cooldown_ms: Option<u64>,
    #[serde(default)]
    pub validate: Option<bool>,
    #[serde(default)]
    pub best_effort: Option<bool>,
    #[serde(default)]
    pub min_hex_purity: Option<f32>,
    #[serde(default)]
    pub max_validation_calls: Option<usize>,
}

impl RecoveryConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, RecoveryIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), RecoveryIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// A config that spells out every value of `params`.
    pub fn from_params(params: &RecoveryParams) -> Self {
        Self {
            color: Some(params.color),
            region: Some(params.region),
            variants: Some(params.variants.clone()),
            extract: Some(params.extract),
            expand: Some(params.expand),
            rank: Some(params.rank),
            max_width: Some(params.max_width),
            cooldown_ms: Some(params.cooldown_ms),
            validate: Some(params.validate),
            best_effort: Some(params.best_effort),
            min_hex_purity: Some(params.min_hex_purity),
            max_validation_calls: Some(params.max_validation_calls),
        }
    }

    /// Apply the overrides to the defaults and validate the result.
    pub fn build_params(&self) -> Result<RecoveryParams, ConfigError> {
        let mut params = RecoveryParams::default();
        if let Some(color) = self.color {
            params.color = color;
        }
        if let Some(region) = self.region {
            params.region = region;
        }
        if let Some(variants) = self.variants.clone() {
            params.variants = variants;
        }
        if let Some(extract) = self.extract {
            params.extract = extract;
        }
        if let Some(expand) = self.expand {
            params.expand = expand;
        }
        if let Some(rank) = self.rank {
            params.rank = rank;
        }
        if let Some(max_width) = self.max_width {
            params.max_width = max_width;
        }
        if let Some(cooldown_ms) = self.cooldown_ms {
            params.cooldown_ms = cooldown_ms;
        }
        if let Some(validate) = self.validate {
            params.validate = validate;
        }
        if let Some(best_effort) = self.best_effort {
            params.best_effort = best_effort;
        }
        if let Some(min_hex_purity) = self.min_hex_purity {
            params.min_hex_purity = min_hex_purity;
        }
        if let Some(max_validation_calls) = self.max_validation_calls {
            params.max_validation_calls = max_validation_calls;
        }
        params.validate_params()?;
        Ok(params)
    }
}

impl RecoveryReport {
    /// Write the report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), RecoveryIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
