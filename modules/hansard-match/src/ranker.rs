//! Candidate ranking — shrink an arbitrary pool to a bounded shortlist
//! before paying for an oracle call, biased toward contextually plausible
//! candidates.

use std::collections::HashSet;

use crate::candidate::{Candidate, RankedCandidate};
use crate::rules::{extract_bracketed, strip_leading_symbols};

pub const DEFAULT_SHORTLIST_CAP: usize = 10;

/// Affiliation is the dominant signal: it outweighs every other score
/// combined short of all of them stacking.
const AFFILIATION_BONUS: i32 = 10;

/// Score and sort the pool, returning at most `cap` candidates.
///
/// If nothing scores above zero the first `cap` candidates of the original
/// pool are returned unranked, so the oracle still receives a non-trivial
/// prompt whenever the pool is non-empty.
pub fn rank_candidates(
    raw_name: &str,
    pool: &[Candidate],
    affiliated_ids: Option<&HashSet<i64>>,
    cap: usize,
) -> Vec<RankedCandidate> {
    let bracketed = extract_bracketed(raw_name);
    let stripped = strip_leading_symbols(raw_name);

    let mut ranked: Vec<RankedCandidate> = pool
        .iter()
        .map(|c| {
            let mut score = 0;

            if contains_either(raw_name, &c.name) {
                score += 3;
            }
            if bracketed.as_deref() == Some(c.name.as_str()) {
                score += 5;
            }
            if stripped != raw_name && contains_either(stripped, &c.name) {
                score += 2;
            }
            if c.name.chars().count().abs_diff(raw_name.chars().count()) <= 3 {
                score += 1;
            }

            let affiliated = affiliated_ids.is_some_and(|ids| ids.contains(&c.id));
            if affiliated {
                score += AFFILIATION_BONUS;
            }

            RankedCandidate {
                candidate: c.clone(),
                score,
                affiliated,
            }
        })
        .collect();

    if ranked.iter().all(|r| r.score == 0) {
        ranked.truncate(cap);
        return ranked;
    }

    // Stable sort: ties keep pool order.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(cap);
    ranked
}

fn contains_either(input: &str, name: &str) -> bool {
    !name.is_empty() && (input.contains(name) || name.contains(input))
}
