use std::time::Duration;

use hexid_core::{ColorRule, RegionParams};
use hexid_decode::{ExpandParams, ExtractParams, RankParams};
use hexid_preprocess::{VariantParams, MAX_UPSCALE, MAX_UPSCALE_SIDE};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Every tunable of one recovery run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryParams {
    pub color: ColorRule,
    pub region: RegionParams,
    pub variants: VariantParams,
    pub extract: ExtractParams,
    pub expand: ExpandParams,
    pub rank: RankParams,
    /// Wider inputs are downscaled to this width before masking.
    pub max_width: u32,
    pub cooldown_ms: u64,
    /// Consult the validator when one is attached.
    pub validate: bool,
    /// Accept the top unconfirmed candidate when validation confirms nothing.
    pub best_effort: bool,
    /// Candidates need strictly more hex than this to be id-shaped.
    pub min_hex_purity: f32,
    /// Upper bound on validator calls per invocation.
    pub max_validation_calls: usize,
}

impl Default for RecoveryParams {
    fn default() -> Self {
        Self {
            color: ColorRule::default(),
            region: RegionParams::default(),
            variants: VariantParams::default(),
            extract: ExtractParams::default(),
            expand: ExpandParams::default(),
            rank: RankParams::default(),
            max_width: 1400,
            cooldown_ms: 8000,
            validate: true,
            best_effort: true,
            min_hex_purity: 0.5,
            max_validation_calls: 1024,
        }
    }
}

impl RecoveryParams {
    #[inline]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Reject values that make the pipeline meaningless.
    pub fn validate_params(&self) -> Result<(), ConfigError> {
        if self.max_width == 0 {
            return Err(ConfigError::invalid("max_width", "must be positive"));
        }
        if self.extract.id_len == 0 {
            return Err(ConfigError::invalid("extract.id_len", "must be positive"));
        }
        if self.extract.min_hex_run == 0 {
            return Err(ConfigError::invalid("extract.min_hex_run", "must be positive"));
        }
        let v = &self.variants;
        for (field, value) in [
            ("variants.thicken_scale", v.thicken_scale),
            ("variants.smooth_scale", v.smooth_scale),
            ("variants.smooth_sigma", v.smooth_sigma),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(field, format!("must be positive, got {value}")));
            }
        }
        for (field, value) in [
            ("variants.thicken_scale", v.thicken_scale),
            ("variants.smooth_scale", v.smooth_scale),
        ] {
            if value > MAX_UPSCALE {
                return Err(ConfigError::invalid(
                    field,
                    format!("must not exceed {MAX_UPSCALE}, got {value}"),
                ));
            }
        }
        if v.min_upscale_width > MAX_UPSCALE_SIDE {
            return Err(ConfigError::invalid(
                "variants.min_upscale_width",
                format!("must not exceed {MAX_UPSCALE_SIDE}, got {}", v.min_upscale_width),
            ));
        }
        if !(0.0..1.0).contains(&self.min_hex_purity) {
            return Err(ConfigError::invalid(
                "min_hex_purity",
                format!("must lie in [0, 1), got {}", self.min_hex_purity),
            ));
        }
        if self.validate && self.max_validation_calls == 0 {
            return Err(ConfigError::invalid(
                "max_validation_calls",
                "must be positive when validation is enabled",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = RecoveryParams::default();
        assert!(params.validate_params().is_ok());
        assert_eq!(params.cooldown(), Duration::from_secs(8));
        assert_eq!(params.color.delta_threshold, 24);
        assert_eq!(params.color.min_channel_value, 110);
    }

    #[test]
    fn rejects_nonsense() {
        let params = RecoveryParams {
            max_width: 0,
            ..RecoveryParams::default()
        };
        assert!(matches!(
            params.validate_params(),
            Err(ConfigError::Invalid { field: "max_width", .. })
        ));

        let mut params = RecoveryParams::default();
        params.variants.smooth_sigma = 0.0;
        assert!(matches!(
            params.validate_params(),
            Err(ConfigError::Invalid { field: "variants.smooth_sigma", .. })
        ));

        let params = RecoveryParams {
            min_hex_purity: 1.0,
            ..RecoveryParams::default()
        };
        assert!(params.validate_params().is_err());
    }

    #[test]
    fn rejects_oversized_upscale() {
        let mut params = RecoveryParams::default();
        params.variants.thicken_scale = 1.0e6;
        assert!(matches!(
            params.validate_params(),
            Err(ConfigError::Invalid { field: "variants.thicken_scale", .. })
        ));

        let mut params = RecoveryParams::default();
        params.variants.smooth_scale = MAX_UPSCALE;
        assert!(params.validate_params().is_ok());

        params.variants.min_upscale_width = MAX_UPSCALE_SIDE + 1;
        assert!(matches!(
            params.validate_params(),
            Err(ConfigError::Invalid { field: "variants.min_upscale_width", .. })
        ));
    }

    #[test]
    fn zero_budget_is_fine_without_validation() {
        let params = RecoveryParams {
            validate: false,
            max_validation_calls: 0,
            ..RecoveryParams::default()
        };
        assert!(params.validate_params().is_ok());
    }
}
