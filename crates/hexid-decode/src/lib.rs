//! Text-side stages of the ID recovery pipeline.
//!
//! This crate focuses on:
//! - correcting systematic OCR glyph confusions (`O`→`0`, `l`→`1`, ...),
//! - extracting 16-character candidate windows and hex runs from raw
//!   recognizer output, with weighted votes across variants,
//! - expanding a candidate into its bounded set of ambiguity substitutions,
//! - ranking candidates by votes and hexadecimal purity.
//!
//! It does **not** look at pixels; recognizer output strings are its input.

mod confusion;
mod expand;
mod extract;
mod rank;

pub use confusion::{ambiguity_pool, confusion_digit, hex_purity, is_hex_id, normalize_text};
pub use expand::{AmbiguityExpander, ExpandParams};
pub use extract::{Candidate, CandidateExtractor, ExtractParams, VoteTable, VoteWeights};
pub use rank::{RankParams, RankedCandidate, Ranker};

/// Length of a recoverable identifier.
pub const ID_LEN: usize = 16;
