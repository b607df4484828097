use hexid_core::{CropRegion, Mask};
use image::{GrayImage, Luma};

use crate::VariantError;

/// Cut `region` out of `mask` and invert it: positive pixels become black
/// text on a white background.
pub fn render_crop(mask: &Mask, region: &CropRegion) -> Result<GrayImage, VariantError> {
    if !region.is_within(mask.width, mask.height) {
        return Err(VariantError::RegionOutOfBounds {
            region: *region,
            width: mask.width,
            height: mask.height,
        });
    }
    let (w, h) = (region.width() as u32, region.height() as u32);
    Ok(GrayImage::from_fn(w, h, |x, y| {
        let v = mask.data[(region.min_y + y as usize) * mask.width + region.min_x + x as usize];
        Luma([255 - v])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_is_inverted() {
        let mut mask = Mask::new(6, 4);
        mask.set(2, 1, true);
        mask.set(3, 2, true);
        let region = CropRegion {
            min_x: 1,
            min_y: 1,
            max_x: 4,
            max_y: 2,
        };
        let crop = render_crop(&mask, &region).expect("crop");
        assert_eq!(crop.dimensions(), (4, 2));
        assert_eq!(crop.get_pixel(1, 0)[0], 0);
        assert_eq!(crop.get_pixel(2, 1)[0], 0);
        assert_eq!(crop.get_pixel(0, 0)[0], 255);
        assert_eq!(crop.get_pixel(3, 1)[0], 255);
    }

    #[test]
    fn out_of_bounds_region_is_an_error() {
        let mask = Mask::new(4, 4);
        let region = CropRegion {
            min_x: 2,
            min_y: 0,
            max_x: 4,
            max_y: 3,
        };
        assert!(matches!(
            render_crop(&mask, &region),
            Err(VariantError::RegionOutOfBounds { .. })
        ));
    }
}
