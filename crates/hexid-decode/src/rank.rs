//! Candidate ordering.

use serde::{Deserialize, Serialize};

use crate::confusion::is_upper_hex;
use crate::extract::VoteTable;

/// Score = `votes * vote_scale + round(purity * purity_scale)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankParams {
    pub vote_scale: u64,
    pub purity_scale: u64,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            vote_scale: 100,
            purity_scale: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub value: String,
    pub votes: u32,
    pub hex_purity: f32,
    pub score: u64,
}

impl RankedCandidate {
    /// `len` characters and strictly more than `min_purity` of them hex.
    pub fn is_id_shaped(&self, len: usize, min_purity: f32) -> bool {
        self.value.chars().count() == len && self.hex_purity > min_purity
    }

    /// `len` characters, all uppercase hex.
    pub fn is_pure_hex(&self, len: usize) -> bool {
        self.value.len() == len && self.value.chars().all(is_upper_hex)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Ranker {
    params: RankParams,
}

impl Ranker {
    pub fn new(params: RankParams) -> Self {
        Self { params }
    }

    pub fn score(&self, votes: u32, hex_purity: f32) -> u64 {
        let purity = (hex_purity.clamp(0.0, 1.0) * self.params.purity_scale as f32).round() as u64;
        u64::from(votes)
            .saturating_mul(self.params.vote_scale)
            .saturating_add(purity)
    }

    /// All candidates, best first. Equal scores keep table order.
    pub fn rank(&self, table: &VoteTable) -> Vec<RankedCandidate> {
        let mut ranked: Vec<RankedCandidate> = table
            .iter()
            .map(|c| {
                let hex_purity = c.hex_purity();
                RankedCandidate {
                    value: c.value.clone(),
                    votes: c.votes,
                    hex_purity,
                    score: self.score(c.votes, hex_purity),
                }
            })
            .collect();
        // stable: ties stay in insertion order
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        if let Some(top) = ranked.first() {
            log::debug!("top candidate {} (score {})", top.value, top.score);
        }
        ranked
    }
}
