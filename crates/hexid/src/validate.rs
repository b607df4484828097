//! Validator confirming candidates against a fixed set of known ids.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use hexid_pipeline::{Validator, ValidatorError};

#[derive(Clone, Debug, Default)]
pub struct AllowListValidator {
    ids: HashSet<String>,
}

impl AllowListValidator {
    /// Ids are trimmed and uppercased; blank entries are ignored.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = ids
            .into_iter()
            .map(|s| s.as_ref().trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { ids }
    }

    /// One id per line; `#` starts a comment.
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(|line| line.split('#').next().unwrap_or_default()),
        )
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ValidatorError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Validator for AllowListValidator {
    fn validate(&self, candidate: &str) -> Result<bool, ValidatorError> {
        Ok(self.contains(candidate))
    }
}
