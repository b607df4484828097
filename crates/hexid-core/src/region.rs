//! Bounding region of mask-positive pixels.

use serde::{Deserialize, Serialize};

use crate::Mask;

/// Inclusive pixel bounds inside the masked image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl CropRegion {
    #[inline]
    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    /// Grow the region by `padding` on every side, clamped to `width × height`.
    pub fn padded(&self, padding: usize, width: usize, height: usize) -> Self {
        Self {
            min_x: self.min_x.saturating_sub(padding),
            min_y: self.min_y.saturating_sub(padding),
            max_x: (self.max_x + padding).min(width.saturating_sub(1)),
            max_y: (self.max_y + padding).min(height.saturating_sub(1)),
        }
    }

    /// Whether the bounds are ordered and fit inside `width × height`.
    pub fn is_within(&self, width: usize, height: usize) -> bool {
        self.min_x <= self.max_x
            && self.min_y <= self.max_y
            && self.max_x < width
            && self.max_y < height
    }
}

/// Region locator settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionParams {
    /// Pixels added around the tight bounding box.
    pub padding: usize,
}

impl Default for RegionParams {
    fn default() -> Self {
        Self { padding: 8 }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionError {
    #[error("no pixel matched the color rule")]
    NoRegionFound,
}

/// Tight axis-aligned box around all positive pixels, if any.
pub fn bounding_box(mask: &Mask) -> Option<CropRegion> {
    let mut found: Option<CropRegion> = None;
    for y in 0..mask.height {
        let row = &mask.data[y * mask.width..(y + 1) * mask.width];
        let Some(first) = row.iter().position(|&v| v != Mask::OFF) else {
            continue;
        };
        let last = row.iter().rposition(|&v| v != Mask::OFF).unwrap_or(first);
        found = Some(match found {
            None => CropRegion {
                min_x: first,
                min_y: y,
                max_x: last,
                max_y: y,
            },
            Some(r) => CropRegion {
                min_x: r.min_x.min(first),
                min_y: r.min_y,
                max_x: r.max_x.max(last),
                max_y: y,
            },
        });
    }
    found
}

/// Locate the padded crop region of `mask`.
///
/// Fails with [`RegionError::NoRegionFound`] when the mask has no positive
/// pixel, so callers never run recognition on an empty crop.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(mask), fields(width = mask.width, height = mask.height))
)]
pub fn locate_region(mask: &Mask, params: &RegionParams) -> Result<CropRegion, RegionError> {
    let tight = bounding_box(mask).ok_or(RegionError::NoRegionFound)?;
    let region = tight.padded(params.padding, mask.width, mask.height);
    log::debug!(
        "region x={}..={} y={}..={} ({}x{})",
        region.min_x,
        region.max_x,
        region.min_y,
        region.max_y,
        region.width(),
        region.height()
    );
    Ok(region)
}
