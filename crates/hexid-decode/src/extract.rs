//! Candidate extraction and vote accumulation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::confusion::{hex_purity, is_upper_hex, normalize_text};
use crate::ID_LEN;

/// Vote weight per kind of evidence. Pure-hex evidence weighs more than
/// generic alphanumeric windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteWeights {
    /// Hex run of exactly the id length.
    pub exact_run: u32,
    /// Each id-length window of a longer hex run.
    pub long_run: u32,
    /// Hex run shorter than the id (at least `min_hex_run`).
    pub short_run: u32,
    /// Each id-length window over the alphanumeric content.
    pub window: u32,
    /// Run following an `ID:` / `ID-` label.
    pub labeled: u32,
}

impl Default for VoteWeights {
    fn default() -> Self {
        Self {
            exact_run: 3,
            long_run: 2,
            short_run: 1,
            window: 1,
            labeled: 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractParams {
    pub id_len: usize,
    /// Shortest hex run counted as evidence.
    pub min_hex_run: usize,
    pub weights: VoteWeights,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            id_len: ID_LEN,
            min_hex_run: 12,
            weights: VoteWeights::default(),
        }
    }
}

/// Accumulated evidence for one distinct normalized string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub value: String,
    pub votes: u32,
}

impl Candidate {
    #[inline]
    pub fn hex_purity(&self) -> f32 {
        hex_purity(&self.value)
    }
}

/// Vote counts keyed by candidate value, in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct VoteTable {
    entries: Vec<Candidate>,
    index: HashMap<String, usize>,
}

impl VoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` votes to `value`, inserting it on first sight.
    pub fn add(&mut self, value: &str, weight: u32) {
        if value.is_empty() || weight == 0 {
            return;
        }
        match self.index.get(value) {
            Some(&i) => {
                let votes = &mut self.entries[i].votes;
                *votes = votes.saturating_add(weight);
            }
            None => {
                self.index.insert(value.to_string(), self.entries.len());
                self.entries.push(Candidate {
                    value: value.to_string(),
                    votes: weight,
                });
            }
        }
    }

    pub fn get(&self, value: &str) -> Option<&Candidate> {
        self.index.get(value).map(|&i| &self.entries[i])
    }

    /// Candidates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turns raw recognizer text into weighted candidate votes.
#[derive(Clone, Copy, Debug, Default)]
pub struct CandidateExtractor {
    params: ExtractParams,
}

impl CandidateExtractor {
    pub fn new(params: ExtractParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &ExtractParams {
        &self.params
    }

    /// Extract candidates from every text into a fresh table.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    pub fn extract_all<'a, I>(&self, texts: I) -> VoteTable
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut table = VoteTable::new();
        for text in texts {
            self.extract(text, &mut table);
        }
        log::debug!("{} distinct candidate(s)", table.len());
        table
    }

    /// Add the evidence found in one raw text to `table`.
    pub fn extract(&self, raw: &str, table: &mut VoteTable) {
        let normalized: Vec<char> = normalize_text(raw).chars().collect();
        if normalized.is_empty() {
            return;
        }
        let n = self.params.id_len.max(1);
        let w = &self.params.weights;

        for run in hex_runs(&normalized, self.params.min_hex_run) {
            if run.len() == n {
                table.add(&collect(run), w.exact_run);
            } else if run.len() > n {
                for win in run.windows(n) {
                    table.add(&collect(win), w.long_run);
                }
            } else {
                table.add(&collect(run), w.short_run);
            }
        }

        if normalized.len() >= n {
            let alnum: Vec<char> = normalized
                .iter()
                .copied()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect();
            for win in alnum.windows(n) {
                table.add(&collect(win), w.window);
            }
        }

        if let Some(run) = labeled_run(raw) {
            table.add(&normalize_text(run), w.labeled);
        }
    }
}

/// Maximal runs of uppercase hex characters at least `min_len` long.
fn hex_runs(chars: &[char], min_len: usize) -> impl Iterator<Item = &[char]> {
    chars
        .split(|&c| !is_upper_hex(c))
        .filter(move |run| !run.is_empty() && run.len() >= min_len)
}

/// Alphanumeric run after the first `ID`, `ID:` or `ID-` label
/// (case-insensitive, whitespace ignored).
fn labeled_run(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i].eq_ignore_ascii_case(&b'I') && bytes[i + 1].eq_ignore_ascii_case(&b'D') {
            let mut j = i + 2;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < bytes.len() && (bytes[j] == b':' || bytes[j] == b'-') {
                j += 1;
            }
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            let start = j;
            while j < bytes.len() && bytes[j].is_ascii_alphanumeric() {
                j += 1;
            }
            if j > start {
                return Some(&raw[start..j]);
            }
        }
        i += 1;
    }
    None
}

#[inline]
fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}
