//! Ordered, independently denoised renderings of the cropped mask.

use std::fmt;

use hexid_core::CropRegion;
use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::ops::{blur, encode_png, median, normalize, sharpen, thicken, threshold, upscale_nearest};

/// Errors raised by a single variant strategy.
#[derive(thiserror::Error, Debug)]
pub enum VariantError {
    #[error("degenerate image size {width}x{height}")]
    Degenerate { width: u32, height: u32 },
    #[error("upscale to {width}x{height} exceeds the upscale limit")]
    TooLarge { width: u64, height: u64 },
    #[error("blur sigma must be positive (got {0})")]
    InvalidSigma(f32),
    #[error("crop region {region:?} exceeds mask extent {width}x{height}")]
    RegionOutOfBounds {
        region: CropRegion,
        width: usize,
        height: usize,
    },
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Strategy that produced a variant. Order of the generated list reflects
/// preference only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "level")]
pub enum Strategy {
    /// Normalize, then binarize at a fixed level.
    Threshold(u8),
    /// Nearest upscale, stroke thickening, binarize.
    UpscaleThicken,
    /// Sharpen, normalize, binarize.
    SharpenNormalize,
    /// Median denoise, sharpen, binarize.
    MedianSharpen,
    /// Mild nearest upscale, slight blur, normalize, binarize.
    UpscaleSmooth,
    /// The unmodified crop.
    Baseline,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Threshold(level) => write!(f, "threshold@{level}"),
            Strategy::UpscaleThicken => f.write_str("upscale+thicken"),
            Strategy::SharpenNormalize => f.write_str("sharpen+normalize"),
            Strategy::MedianSharpen => f.write_str("median+sharpen"),
            Strategy::UpscaleSmooth => f.write_str("upscale+smooth"),
            Strategy::Baseline => f.write_str("baseline"),
        }
    }
}

/// One encoded rendering handed to the recognizer.
#[derive(Clone, Debug)]
pub struct PreprocessedVariant {
    pub strategy: Strategy,
    pub width: u32,
    pub height: u32,
    /// PNG-encoded pixels.
    pub png: Vec<u8>,
}

/// Largest accepted `thicken_scale` / `smooth_scale`.
pub const MAX_UPSCALE: f32 = 8.0;
/// Largest side of any upscaled variant.
pub const MAX_UPSCALE_SIDE: u32 = 16_384;

/// Tuning of the variant strategies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantParams {
    /// Fixed binarization levels, coarse to fine.
    pub thresholds: Vec<u8>,
    pub thicken_scale: f32,
    pub thicken_threshold: u8,
    pub sharpen_threshold: u8,
    pub median_radius: u32,
    pub median_threshold: u8,
    pub smooth_scale: f32,
    pub smooth_sigma: f32,
    pub smooth_threshold: u8,
    /// Lower bound on the width of upscaled variants.
    pub min_upscale_width: u32,
}

impl Default for VariantParams {
    fn default() -> Self {
        Self {
            thresholds: vec![180, 160, 140, 130],
            thicken_scale: 3.0,
            thicken_threshold: 140,
            sharpen_threshold: 150,
            median_radius: 1,
            median_threshold: 150,
            smooth_scale: 2.0,
            smooth_sigma: 0.3,
            smooth_threshold: 140,
            min_upscale_width: 100,
        }
    }
}

impl VariantParams {
    /// Strategies in generation order; the baseline is always last.
    pub fn plan(&self) -> Vec<Strategy> {
        let mut plan: Vec<Strategy> = self
            .thresholds
            .iter()
            .map(|&t| Strategy::Threshold(t))
            .collect();
        plan.extend([
            Strategy::UpscaleThicken,
            Strategy::SharpenNormalize,
            Strategy::MedianSharpen,
            Strategy::UpscaleSmooth,
            Strategy::Baseline,
        ]);
        plan
    }
}

/// Produces the ordered variant list for one crop.
#[derive(Clone, Debug, Default)]
pub struct VariantGenerator {
    params: VariantParams,
}

impl VariantGenerator {
    pub fn new(params: VariantParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &VariantParams {
        &self.params
    }

    /// Render `crop` with one strategy.
    pub fn render(&self, strategy: Strategy, crop: &GrayImage) -> Result<GrayImage, VariantError> {
        let p = &self.params;
        let out = match strategy {
            Strategy::Threshold(level) => threshold(&normalize(crop), level),
            Strategy::UpscaleThicken => {
                let up = upscale_nearest(crop, p.thicken_scale, p.min_upscale_width)?;
                threshold(&thicken(&up), p.thicken_threshold)
            }
            Strategy::SharpenNormalize => {
                threshold(&normalize(&sharpen(crop)), p.sharpen_threshold)
            }
            Strategy::MedianSharpen => {
                threshold(&sharpen(&median(crop, p.median_radius)), p.median_threshold)
            }
            Strategy::UpscaleSmooth => {
                let up = upscale_nearest(crop, p.smooth_scale, p.min_upscale_width)?;
                threshold(&normalize(&blur(&up, p.smooth_sigma)?), p.smooth_threshold)
            }
            Strategy::Baseline => crop.clone(),
        };
        if out.width() == 0 || out.height() == 0 {
            return Err(VariantError::Degenerate {
                width: out.width(),
                height: out.height(),
            });
        }
        Ok(out)
    }

    /// Generate every variant of `crop`.
    ///
    /// A strategy that fails is logged and left out. The baseline is always
    /// present in a successful result, so the list is never empty; only a
    /// failure to encode the baseline itself is returned as an error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self, crop), fields(width = crop.width(), height = crop.height()))
    )]
    pub fn generate(&self, crop: &GrayImage) -> Result<Vec<PreprocessedVariant>, VariantError> {
        let plan = self.params.plan();
        let mut out = Vec::with_capacity(plan.len());
        for strategy in plan {
            if strategy == Strategy::Baseline {
                continue;
            }
            match self.render(strategy, crop).and_then(|img| encode(strategy, &img)) {
                Ok(variant) => out.push(variant),
                Err(err) => log::warn!("variant {strategy} skipped: {err}"),
            }
        }
        out.push(encode(Strategy::Baseline, crop)?);
        log::debug!("generated {} variant(s)", out.len());
        Ok(out)
    }
}

fn encode(strategy: Strategy, img: &GrayImage) -> Result<PreprocessedVariant, VariantError> {
    Ok(PreprocessedVariant {
        strategy,
        width: img.width(),
        height: img.height(),
        png: encode_png(img)?,
    })
}
