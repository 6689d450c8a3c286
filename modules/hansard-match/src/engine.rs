//! Matching orchestrator: rule cascade fast path, then ranked shortlist
//! through the oracle tiers with early exit on the first confident answer.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use hansard_common::{HansardError, MatchResult};

use crate::candidate::Candidate;
use crate::oracle::MatchOracle;
use crate::ranker::{rank_candidates, DEFAULT_SHORTLIST_CAP};
use crate::rules::RuleBasedMatcher;

/// Rule-based results at or above this confidence skip the oracle entirely.
pub const FAST_ACCEPT_THRESHOLD: f64 = 0.9;

/// Oracle results below this confidence are downgraded to no-match (the
/// confidence and reason are preserved for audit).
pub const ORACLE_ACCEPT_THRESHOLD: f64 = 0.8;

/// Hybrid matcher over a pool of `{id, name}` candidates.
///
/// Oracle tiers are an ordered list behind one interface: primary, then an
/// optional agent tier, then a last-resort fallback. A tier error logs and
/// falls through; only when every configured tier has failed does the engine
/// raise a typed external-service error instead of degrading to no-match.
pub struct MatchingEngine {
    tiers: Vec<Arc<dyn MatchOracle>>,
    shortlist_cap: usize,
}

impl MatchingEngine {
    pub fn new(primary: Arc<dyn MatchOracle>) -> Self {
        Self {
            tiers: vec![primary],
            shortlist_cap: DEFAULT_SHORTLIST_CAP,
        }
    }

    /// Append a fallback tier. Called once for the agent tier, once for the
    /// last-resort structured tier; order of calls is invocation order.
    pub fn with_fallback(mut self, oracle: Arc<dyn MatchOracle>) -> Self {
        self.tiers.push(oracle);
        self
    }

    pub fn with_shortlist_cap(mut self, cap: usize) -> Self {
        self.shortlist_cap = cap.max(1);
        self
    }

    /// Resolve a raw speaker string to the best pool candidate.
    ///
    /// `affiliated_ids` marks contextually plausible candidates (e.g. known
    /// attendees of the meeting the string came from); they dominate ranking
    /// and are flagged to the oracle.
    pub async fn find_best_match(
        &self,
        raw_name: &str,
        pool: &[Candidate],
        affiliated_ids: Option<&HashSet<i64>>,
    ) -> Result<MatchResult> {
        if pool.is_empty() {
            return Ok(MatchResult::no_match("candidate pool is empty"));
        }

        let rule_result = RuleBasedMatcher::find_match(raw_name, pool);
        if rule_result.matched && rule_result.confidence >= FAST_ACCEPT_THRESHOLD {
            debug!(
                raw_name,
                confidence = rule_result.confidence,
                reason = %rule_result.reason,
                "Rule-based fast accept"
            );
            return Ok(rule_result);
        }

        let shortlist = rank_candidates(raw_name, pool, affiliated_ids, self.shortlist_cap);

        let mut last_result: Option<MatchResult> = None;
        let mut errors: Vec<String> = Vec::new();

        for oracle in &self.tiers {
            match oracle.classify(raw_name, &shortlist).await {
                Ok(result) => {
                    if result.confidence >= ORACLE_ACCEPT_THRESHOLD {
                        info!(
                            raw_name,
                            oracle = oracle.name(),
                            entity_id = result.entity_id,
                            confidence = result.confidence,
                            "Oracle match accepted"
                        );
                        return Ok(result);
                    }
                    debug!(
                        raw_name,
                        oracle = oracle.name(),
                        confidence = result.confidence,
                        "Oracle result below acceptance threshold, trying next tier"
                    );
                    last_result = Some(result);
                }
                Err(e) => {
                    warn!(raw_name, oracle = oracle.name(), error = %e, "Oracle tier failed");
                    errors.push(format!("{}: {e}", oracle.name()));
                }
            }
        }

        // No tier was confident. A low-confidence judgement from the deepest
        // successful tier is still a valid no-match answer for audit; zero
        // successful tiers is an infrastructure failure, not an absence of a
        // match.
        match last_result {
            Some(result) => Ok(result.downgraded()),
            None => Err(HansardError::external(
                "match_oracle",
                "find_best_match",
                errors.join("; "),
            )
            .into()),
        }
    }
}
