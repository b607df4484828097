//! High-level facade for the `hexid-*` workspace.
//!
//! This crate provides:
//! - re-exports of the stage crates under short module names,
//! - concrete adapters for the pipeline boundaries: an external-process
//!   [`TesseractRecognizer`] and a set-backed [`AllowListValidator`],
//! - (feature `cli`) the `hexid` command-line tool.
//!
//! ## Quickstart
//!
//! ```no_run
//! use hexid::{AllowListValidator, CooldownState, IdRecoverer, RecoveryParams, TesseractRecognizer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let recoverer = IdRecoverer::new(RecoveryParams::default(), TesseractRecognizer::default())
//!     .with_validator(AllowListValidator::from_file("ids.txt")?);
//! let cooldown = recoverer.cooldown_state();
//! let bytes = std::fs::read("screenshot.png")?;
//! if let Some(result) = recoverer.recover(&bytes, "channel-42", &cooldown).result() {
//!     println!("{result}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `hexid::core`: raster, color mask, crop region, logger.
//! - `hexid::preprocess`: decoding, crop rendering, variant strategies.
//! - `hexid::decode`: confusion tables, candidate voting, expansion, ranking.
//! - `hexid::pipeline`: the orchestrator, cooldown state, config and reports.

pub use hexid_core as core;
pub use hexid_decode as decode;
pub use hexid_pipeline as pipeline;
pub use hexid_preprocess as preprocess;

pub use hexid_pipeline::{
    CooldownState, Dispatch, FailureReason, IdRecoverer, PipelineResult, RecognitionError,
    Recognizer, RecoveryConfig, RecoveryIoError, RecoveryParams, RecoveryReport, Validator,
    ValidatorError,
};

mod recognize;
mod validate;

pub use recognize::TesseractRecognizer;
pub use validate::AllowListValidator;

use std::path::Path;

/// Params from an optional JSON config file, defaults otherwise.
pub fn load_params(config: Option<&Path>) -> Result<RecoveryParams, RecoveryIoError> {
    match config {
        Some(path) => Ok(RecoveryConfig::load_json(path)?.build_params()?),
        None => Ok(RecoveryParams::default()),
    }
}
