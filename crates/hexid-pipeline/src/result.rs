//! Terminal results and per-run diagnostics.

use std::fmt;
use std::time::Duration;

use hexid_core::CropRegion;
use hexid_decode::RankedCandidate;
use hexid_preprocess::Strategy;
use serde::{Deserialize, Serialize};

use crate::FailureReason;

/// Exactly one per invocation that ran the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum PipelineResult {
    /// Confirmed by the validator.
    Recovered(String),
    /// Accepted without confirmation.
    UnverifiedBestEffort(String),
    Failed(FailureReason),
}

impl PipelineResult {
    /// The identifier, confirmed or not.
    pub fn id(&self) -> Option<&str> {
        match self {
            PipelineResult::Recovered(id) | PipelineResult::UnverifiedBestEffort(id) => Some(id),
            PipelineResult::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PipelineResult::Failed(_))
    }
}

impl fmt::Display for PipelineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineResult::Recovered(id) => write!(f, "recovered {id}"),
            PipelineResult::UnverifiedBestEffort(id) => write!(f, "unverified {id}"),
            PipelineResult::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Furthest state a run reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Idle,
    MaskBuilt,
    RegionFound,
    VariantsBuilt,
    Recognized,
    CandidatesRanked,
    Validated,
}

/// What the recognizer made of one variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantReport {
    pub strategy: Strategy,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Everything one run observed, ending in its result.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecoveryReport {
    pub stage: Stage,
    /// Raster size after any downscale.
    #[serde(default)]
    pub image_size: Option<[usize; 2]>,
    pub mask_pixels: usize,
    #[serde(default)]
    pub region: Option<CropRegion>,
    pub variants: Vec<VariantReport>,
    /// Distinct recognizer calls after deduplicating identical renderings.
    pub recognizer_calls: usize,
    pub candidates: Vec<RankedCandidate>,
    pub validator_calls: usize,
    pub result: PipelineResult,
}

impl RecoveryReport {
    pub(crate) fn new() -> Self {
        Self {
            stage: Stage::Idle,
            image_size: None,
            mask_pixels: 0,
            region: None,
            variants: Vec::new(),
            recognizer_calls: 0,
            candidates: Vec::new(),
            validator_calls: 0,
            result: PipelineResult::Failed(FailureReason::NoRegionFound),
        }
    }

    pub(crate) fn fail(mut self, reason: FailureReason) -> Self {
        log::info!("recovery failed at {:?}: {reason}", self.stage);
        self.result = PipelineResult::Failed(reason);
        self
    }

    /// Non-empty texts in variant order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.variants
            .iter()
            .filter_map(|v| v.text.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Outcome of a cooldown-aware invocation.
#[derive(Clone, Debug)]
pub enum Dispatch {
    Ran(Box<RecoveryReport>),
    /// Dropped without side effects; `remaining` is left on the window.
    CoolingDown { remaining: Duration },
}

impl Dispatch {
    pub fn result(&self) -> Option<&PipelineResult> {
        match self {
            Dispatch::Ran(report) => Some(&report.result),
            Dispatch::CoolingDown { .. } => None,
        }
    }

    pub fn report(&self) -> Option<&RecoveryReport> {
        match self {
            Dispatch::Ran(report) => Some(&**report),
            Dispatch::CoolingDown { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Dispatch::CoolingDown { .. })
    }
}
