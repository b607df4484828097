//! End-to-end recovery of a colored-overlay hexadecimal identifier.
//!
//! [`IdRecoverer`] sequences the stages of the sibling crates:
//!
//! 1. decode and downscale the input ([`hexid_preprocess::decode_raster`]),
//! 2. build the color mask and locate the padded text region,
//! 3. render the ordered variant list,
//! 4. read every variant with the injected [`Recognizer`],
//! 5. vote, rank and expand candidates ([`hexid_decode`]),
//! 6. confirm candidates with the optional [`Validator`].
//!
//! Each run yields a [`RecoveryReport`] whose `result` is one
//! [`PipelineResult`]. Failures are values, not errors. Per-source rate
//! limiting lives in [`CooldownState`], which callers own and pass in.
//!
//! ```
//! use hexid_pipeline::{IdRecoverer, RecognitionError, RecoveryParams};
//!
//! let recoverer = IdRecoverer::new(RecoveryParams::default(), |_: &[u8]| {
//!     Ok::<_, RecognitionError>(String::new())
//! });
//! let report = recoverer.run(b"not an image");
//! assert!(report.result.is_failed());
//! ```

mod adapter;
mod cooldown;
mod error;
mod io;
mod params;
mod pipeline;
mod result;

pub use adapter::{RecognitionError, Recognizer, Validator, ValidatorError};
pub use cooldown::CooldownState;
pub use error::{ConfigError, FailureReason};
pub use io::{RecoveryConfig, RecoveryIoError};
pub use params::RecoveryParams;
pub use pipeline::IdRecoverer;
pub use result::{Dispatch, PipelineResult, RecoveryReport, Stage, VariantReport};
