//! Grayscale transforms shared by the variant strategies.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageFormat};
use imageproc::distance_transform::Norm;
use imageproc::{filter, morphology};

use crate::variants::{MAX_UPSCALE, MAX_UPSCALE_SIDE};
use crate::VariantError;

/// Fraction of pixels clipped at each end by [`normalize`].
const NORMALIZE_CLIP: f64 = 0.01;

/// Stretch intensities so the 1st/99th percentiles map to 0/255.
///
/// Images whose percentiles coincide (flat or nearly flat) are returned as-is.
pub fn normalize(img: &GrayImage) -> GrayImage {
    let total = img.as_raw().len();
    if total == 0 {
        return img.clone();
    }

    let mut hist = [0u64; 256];
    for &v in img.as_raw() {
        hist[v as usize] += 1;
    }

    let clip = (total as f64 * NORMALIZE_CLIP).floor() as u64;
    let mut acc = 0u64;
    let mut low = 0u8;
    for (v, &h) in hist.iter().enumerate() {
        acc += h;
        if acc > clip {
            low = v as u8;
            break;
        }
    }
    acc = 0;
    let mut high = 255u8;
    for (v, &h) in hist.iter().enumerate().rev() {
        acc += h;
        if acc > clip {
            high = v as u8;
            break;
        }
    }
    if low >= high {
        return img.clone();
    }

    let span = (high - low) as f32;
    let mut out = img.clone();
    for p in out.pixels_mut() {
        let v = (p[0].saturating_sub(low)) as f32 * 255.0 / span;
        p[0] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Binarize: values `>= level` become white, everything else black.
pub fn threshold(img: &GrayImage, level: u8) -> GrayImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        p[0] = if p[0] >= level { 255 } else { 0 };
    }
    out
}

/// Nearest-neighbor upscale to `scale × width` (at least `min_width`),
/// preserving aspect ratio.
pub(crate) fn upscale_nearest(
    img: &GrayImage,
    scale: f32,
    min_width: u32,
) -> Result<GrayImage, VariantError> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || !scale.is_finite() || scale <= 0.0 {
        return Err(VariantError::Degenerate {
            width: w,
            height: h,
        });
    }
    let new_w = ((w as f64 * scale as f64).round() as u64).max(u64::from(min_width));
    let new_h = (h as f64 * new_w as f64 / w as f64).round() as u64;
    if scale > MAX_UPSCALE
        || new_w > u64::from(MAX_UPSCALE_SIDE)
        || new_h > u64::from(MAX_UPSCALE_SIDE)
    {
        return Err(VariantError::TooLarge {
            width: new_w,
            height: new_h,
        });
    }
    // both sides now fit in u32
    let (new_w, new_h) = (new_w as u32, new_h as u32);
    if new_w == 0 || new_h == 0 {
        return Err(VariantError::Degenerate {
            width: new_w,
            height: new_h,
        });
    }
    Ok(imageops::resize(img, new_w, new_h, FilterType::Nearest))
}

/// Grow dark strokes by one pixel in every direction (3×3 square element).
pub(crate) fn thicken(img: &GrayImage) -> GrayImage {
    // Text is dark, so eroding the white background thickens it.
    morphology::erode(img, Norm::LInf, 1)
}

pub(crate) fn sharpen(img: &GrayImage) -> GrayImage {
    filter::sharpen3x3(img)
}

pub(crate) fn median(img: &GrayImage, radius: u32) -> GrayImage {
    filter::median_filter(img, radius, radius)
}

pub(crate) fn blur(img: &GrayImage, sigma: f32) -> Result<GrayImage, VariantError> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(VariantError::InvalidSigma(sigma));
    }
    Ok(filter::gaussian_blur_f32(img, sigma))
}

/// Encode a grayscale image as PNG bytes.
pub fn encode_png(img: &GrayImage) -> Result<Vec<u8>, VariantError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
