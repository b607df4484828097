use hexid_core::{RasterError, RasterImage};
use image::imageops::FilterType;

/// Errors produced while turning encoded bytes into a raster.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("max width must be positive")]
    InvalidMaxWidth,
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Decode `bytes` (any format the `image` crate recognizes) into an RGB raster.
///
/// Inputs wider than `max_width` are resized to exactly that width with the
/// aspect ratio preserved.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(bytes), fields(len = bytes.len()))
)]
pub fn decode_raster(bytes: &[u8], max_width: u32) -> Result<RasterImage, DecodeError> {
    if max_width == 0 {
        return Err(DecodeError::InvalidMaxWidth);
    }
    let mut img = image::load_from_memory(bytes)?;
    if img.width() > max_width {
        let scale = max_width as f64 / img.width() as f64;
        let height = ((img.height() as f64 * scale).round() as u32).max(1);
        log::debug!(
            "downscaling {}x{} -> {}x{}",
            img.width(),
            img.height(),
            max_width,
            height
        );
        img = img.resize_exact(max_width, height, FilterType::Lanczos3);
    }
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(RasterImage::new(
        width as usize,
        height as usize,
        3,
        rgb.into_raw(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        buf
    }

    #[test]
    fn keeps_small_images_untouched() {
        let img = RgbImage::from_pixel(64, 32, Rgb([10, 200, 10]));
        let raster = decode_raster(&encode(&img), 1400).expect("decode");
        assert_eq!((raster.width(), raster.height()), (64, 32));
        assert_eq!(raster.channels(), 3);
        assert_eq!(raster.pixel(5, 5), &[10, 200, 10]);
    }

    #[test]
    fn downscales_wide_images_preserving_aspect() {
        let img = RgbImage::from_pixel(2000, 1000, Rgb([0, 0, 0]));
        let raster = decode_raster(&encode(&img), 1400).expect("decode");
        assert_eq!((raster.width(), raster.height()), (1400, 700));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_raster(b"definitely not an image", 1400).unwrap_err();
        assert!(matches!(err, DecodeError::Image(_)));
    }

    #[test]
    fn zero_max_width_is_rejected() {
        let img = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        assert!(matches!(
            decode_raster(&encode(&img), 0),
            Err(DecodeError::InvalidMaxWidth)
        ));
    }
}
