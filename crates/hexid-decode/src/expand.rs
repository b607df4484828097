//! Bounded ambiguity expansion of a candidate string.

use serde::{Deserialize, Serialize};

use crate::confusion::ambiguity_pool;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandParams {
    /// Upper bound on generated strings, the original included.
    pub max_variants: usize,
}

impl Default for ExpandParams {
    fn default() -> Self {
        Self { max_variants: 256 }
    }
}

/// Generates look-alike substitutions of a candidate.
///
/// Output order: the unmodified string, then every single substitution,
/// then every pair, and so on; positions are visited left to right and
/// alternatives in pool order. Generation stops once `max_variants` strings
/// exist, so high substitution counts on long ambiguous strings are not
/// reached.
#[derive(Clone, Copy, Debug, Default)]
pub struct AmbiguityExpander {
    params: ExpandParams,
}

/// One ambiguous position and its alternatives (the original glyph excluded).
struct Slot {
    pos: usize,
    alts: &'static [char],
}

impl AmbiguityExpander {
    pub fn new(params: ExpandParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn max_variants(&self) -> usize {
        self.params.max_variants.max(1)
    }

    /// Expand `s`. The first element is always `s` itself.
    pub fn expand(&self, s: &str) -> Vec<String> {
        let cap = self.max_variants();
        let base: Vec<char> = s.chars().collect();
        let slots: Vec<Slot> = base
            .iter()
            .enumerate()
            .filter_map(|(pos, &c)| {
                let pool = ambiguity_pool(c)?;
                (pool.len() > 1).then(|| Slot {
                    pos,
                    alts: &pool[1..],
                })
            })
            .collect();

        let mut out = Vec::with_capacity(cap.min(64));
        out.push(s.to_string());
        let mut work = base.clone();
        for k in 1..=slots.len() {
            if !substitute(&base, &slots, k, 0, &mut work, &mut out, cap) {
                break;
            }
        }
        log::trace!("expanded {s} into {} variant(s)", out.len());
        out
    }
}

/// Emit every string with exactly `remaining` more substitutions taken from
/// `slots[start..]`. Returns `false` once the cap is hit.
fn substitute(
    base: &[char],
    slots: &[Slot],
    remaining: usize,
    start: usize,
    work: &mut Vec<char>,
    out: &mut Vec<String>,
    cap: usize,
) -> bool {
    if out.len() >= cap {
        return false;
    }
    if remaining == 0 {
        out.push(work.iter().collect());
        return out.len() < cap;
    }
    for si in start..slots.len() {
        if slots.len() - si < remaining {
            break;
        }
        let slot = &slots[si];
        for &alt in slot.alts {
            work[slot.pos] = alt;
            if !substitute(base, slots, remaining - 1, si + 1, work, out, cap) {
                work[slot.pos] = base[slot.pos];
                return false;
            }
        }
        work[slot.pos] = base[slot.pos];
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn unambiguous_string_expands_to_itself() {
        let exp = AmbiguityExpander::default();
        assert_eq!(exp.expand("ACE"), vec!["ACE".to_string()]);
    }

    #[test]
    fn full_product_when_under_cap() {
        let exp = AmbiguityExpander::default();
        let out = exp.expand("8E0");
        // '8' -> {8,B}, '0' -> {0,O,D}: 2 * 3 combinations
        assert_eq!(
            out,
            vec!["8E0", "BE0", "8EO", "8ED", "BEO", "BED"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn never_exceeds_cap_and_keeps_original_first() {
        let s = "0180018001800180";
        for cap in [1usize, 2, 17, 256, 512] {
            let exp = AmbiguityExpander::new(ExpandParams { max_variants: cap });
            let out = exp.expand(s);
            assert!(out.len() <= cap, "cap {cap} produced {}", out.len());
            assert_eq!(out[0], s);
            assert!(out.iter().all(|v| v.chars().count() == s.chars().count()));
        }
    }

    #[test]
    fn outputs_are_distinct() {
        let exp = AmbiguityExpander::new(ExpandParams { max_variants: 512 });
        let out = exp.expand("D0B8D0B8");
        let unique: HashSet<&String> = out.iter().collect();
        assert_eq!(unique.len(), out.len());
    }

    #[test]
    fn single_substitutions_come_before_pairs() {
        let exp = AmbiguityExpander::default();
        let out = exp.expand("3F2A9800C1D4E5F6");
        // the expected hex id differs by one substitution (8 -> B)
        let pos = out
            .iter()
            .position(|v| v == "3F2A9B00C1D4E5F6")
            .expect("single substitution present");
        let first_pair = out
            .iter()
            .position(|v| {
                v.chars()
                    .zip("3F2A9800C1D4E5F6".chars())
                    .filter(|(a, b)| a != b)
                    .count()
                    == 2
            })
            .expect("pairs present");
        assert!(pos < first_pair);
    }

    #[test]
    fn zero_cap_still_returns_original() {
        let exp = AmbiguityExpander::new(ExpandParams { max_variants: 0 });
        assert_eq!(exp.expand("80"), vec!["80".to_string()]);
    }
}
