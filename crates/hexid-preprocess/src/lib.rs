//! Image-side stages of the ID recovery pipeline.
//!
//! This crate covers:
//! - decoding an encoded screenshot into a [`hexid_core::RasterImage`],
//!   downscaling wide inputs,
//! - rendering the located crop of a color mask as dark text on white,
//! - generating an ordered set of independently denoised renderings
//!   ([`PreprocessedVariant`]) for a recognizer to read.
//!
//! Every variant strategy is isolated: a failing transform drops only its own
//! variant, and the unmodified crop is always emitted last as a baseline.

mod decode;
mod ops;
mod render;
mod variants;

pub use decode::{decode_raster, DecodeError};
pub use ops::{encode_png, normalize, threshold};
pub use render::render_crop;
pub use variants::{
    PreprocessedVariant, Strategy, VariantError, VariantGenerator, VariantParams, MAX_UPSCALE,
    MAX_UPSCALE_SIDE,
};

/// Grayscale image type used by every variant strategy.
pub use image::GrayImage;
