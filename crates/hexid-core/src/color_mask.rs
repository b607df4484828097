//! Channel-dominance color classification.

use serde::{Deserialize, Serialize};

use crate::{Mask, RasterImage};

/// Color channel the overlay text is expected to be drawn in.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    #[default]
    Green,
    Blue,
}

impl Channel {
    #[inline]
    fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// Per-pixel rule isolating highlight-colored text.
///
/// A pixel is positive when the target channel exceeds both other channels
/// by more than `delta_threshold` and is at least `min_channel_value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRule {
    pub channel: Channel,
    pub delta_threshold: u8,
    pub min_channel_value: u8,
}

impl Default for ColorRule {
    fn default() -> Self {
        Self {
            channel: Channel::Green,
            delta_threshold: 24,
            min_channel_value: 110,
        }
    }
}

impl ColorRule {
    /// Classify one RGB(A) pixel. Fewer than three channels never match.
    #[inline]
    pub fn matches(&self, px: &[u8]) -> bool {
        if px.len() < 3 {
            return false;
        }
        let target = self.channel.index();
        let t = px[target] as i32;
        if t < self.min_channel_value as i32 {
            return false;
        }
        let delta = self.delta_threshold as i32;
        (0..3)
            .filter(|&c| c != target)
            .all(|c| t > px[c] as i32 + delta)
    }
}

/// Build the binary mask of `image` under `rule`. No smoothing is applied.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(image, rule), fields(width = image.width(), height = image.height()))
)]
pub fn color_mask(image: &RasterImage, rule: &ColorRule) -> Mask {
    let mut mask = Mask::new(image.width(), image.height());
    if image.channels() < 3 {
        log::debug!("raster has {} channel(s); mask is empty", image.channels());
        return mask;
    }
    for y in 0..image.height() {
        for x in 0..image.width() {
            if rule.matches(image.pixel(x, y)) {
                mask.set(x, y, true);
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster_from_pixels(width: usize, height: usize, px: &[[u8; 3]]) -> RasterImage {
        let data = px.iter().flat_map(|p| p.iter().copied()).collect();
        RasterImage::new(width, height, 3, data).expect("raster")
    }

    #[test]
    fn green_dominance_with_floor() {
        let rule = ColorRule::default();
        assert!(rule.matches(&[20, 200, 30]));
        // green dominates but is too dark
        assert!(!rule.matches(&[10, 100, 10]));
        // margin over red is exactly the delta, which is not enough
        assert!(!rule.matches(&[176, 200, 30]));
        assert!(rule.matches(&[175, 200, 30]));
        // floor is inclusive
        assert!(rule.matches(&[0, 110, 0]));
        // white text is not green
        assert!(!rule.matches(&[255, 255, 255]));
    }

    #[test]
    fn alpha_is_ignored_and_gray_never_matches() {
        let rule = ColorRule::default();
        assert!(rule.matches(&[0, 200, 0, 0]));
        assert!(!rule.matches(&[200]));
    }

    #[test]
    fn other_channels_can_be_targeted() {
        let rule = ColorRule {
            channel: Channel::Red,
            ..ColorRule::default()
        };
        assert!(rule.matches(&[220, 20, 40]));
        assert!(!rule.matches(&[20, 220, 40]));
    }

    #[test]
    fn mask_marks_only_matching_pixels() {
        let img = raster_from_pixels(
            3,
            2,
            &[
                [0, 0, 0],
                [30, 210, 40],
                [0, 0, 0],
                [250, 250, 250],
                [0, 0, 0],
                [10, 180, 10],
            ],
        );
        let mask = color_mask(&img, &ColorRule::default());
        assert_eq!(mask.data, vec![0, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn single_channel_raster_gives_empty_mask() {
        let img = RasterImage::new(4, 4, 1, vec![255; 16]).expect("raster");
        let mask = color_mask(&img, &ColorRule::default());
        assert_eq!(mask.count_positive(), 0);
    }

    #[test]
    fn rule_deserializes_with_defaults() {
        let rule: ColorRule = serde_json::from_str(r#"{"channel":"blue"}"#).expect("json");
        assert_eq!(rule.channel, Channel::Blue);
        assert_eq!(rule.delta_threshold, 24);
        assert_eq!(rule.min_channel_value, 110);
    }
}
