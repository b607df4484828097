//! Boundaries to the recognizer and validator capabilities.
//!
//! Both are injected into [`crate::IdRecoverer`]; the pipeline never knows
//! which engine or lookup service sits behind them. Any closure with the
//! matching signature implements either trait.

#[derive(thiserror::Error, Debug)]
pub enum RecognitionError {
    #[error("recognizer unavailable: {0}")]
    Unavailable(String),
    #[error("recognizer failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ValidatorError {
    #[error("validator unavailable: {0}")]
    Unavailable(String),
    #[error("lookup failed: {0}")]
    Lookup(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reads text from one encoded (PNG) rendering.
///
/// An empty string is a normal outcome. Errors are absorbed per variant by
/// the pipeline.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, png: &[u8]) -> Result<String, RecognitionError>;
}

impl<F> Recognizer for F
where
    F: Fn(&[u8]) -> Result<String, RecognitionError> + Send + Sync,
{
    fn recognize(&self, png: &[u8]) -> Result<String, RecognitionError> {
        self(png)
    }
}

/// Authoritatively confirms or rejects an uppercase hex candidate.
pub trait Validator: Send + Sync {
    fn validate(&self, candidate: &str) -> Result<bool, ValidatorError>;
}

impl<F> Validator for F
where
    F: Fn(&str) -> Result<bool, ValidatorError> + Send + Sync,
{
    fn validate(&self, candidate: &str) -> Result<bool, ValidatorError> {
        self(candidate)
    }
}
