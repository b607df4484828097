use serde::{Deserialize, Serialize};

/// Why an invocation ended without an identifier.
///
/// These are terminal values carried by [`crate::PipelineResult::Failed`],
/// never propagated as `Err`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("input could not be decoded: {0}")]
    InvalidImage(String),
    #[error("no pixel matched the target color")]
    NoRegionFound,
    #[error("no variant produced any text")]
    NoTextRecognized,
    #[error("recognized text never formed an id-shaped candidate")]
    NoCandidateFormed,
    #[error("no candidate was confirmed ({calls} validator call(s))")]
    ValidationExhausted { calls: usize },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
