//! Core types for recovering a colored-overlay identifier from a screenshot.
//!
//! This crate is intentionally small. It holds the decoded raster, the
//! binary mask produced by the color rule, and the crop region located on
//! that mask. It does *not* decode image files or run any recognizer; those
//! live in `hexid-preprocess` and `hexid-pipeline`.

mod color_mask;
mod logger;
mod raster;
mod region;

pub use color_mask::{color_mask, Channel, ColorRule};
pub use raster::{Mask, RasterError, RasterImage};
pub use region::{bounding_box, locate_region, CropRegion, RegionError, RegionParams};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
