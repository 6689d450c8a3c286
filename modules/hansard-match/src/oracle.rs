//! Oracle tiers — external classification services behind one trait.
//!
//! The engine walks an ordered list of these; each gets the raw name and the
//! ranked shortlist and answers with the common MatchResult shape.

use anyhow::{bail, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, warn};

use hansard_common::MatchResult;
use llm_client::Claude;

use crate::candidate::RankedCandidate;

#[async_trait]
pub trait MatchOracle: Send + Sync {
    /// Tier name for logs and external-service errors.
    fn name(&self) -> &str;

    async fn classify(&self, raw_name: &str, shortlist: &[RankedCandidate])
        -> Result<MatchResult>;
}

// ---------------------------------------------------------------------------
// LLM response schema
// ---------------------------------------------------------------------------

/// Response schema for the classification LLM call.
#[derive(Debug, Deserialize, JsonSchema)]
struct OracleResponse {
    /// Whether one of the listed candidates is the person the raw name refers to
    matched: bool,
    /// The id of the matching candidate, or null if none match
    entity_id: Option<i64>,
    /// The matching candidate's name exactly as listed, or null
    entity_name: Option<String>,
    /// Confidence in this judgement, 0.0 to 1.0
    confidence: f64,
    /// One-sentence justification for the judgement
    reason: String,
}

const SYSTEM_PROMPT: &str = r#"You are a speaker-name classifier for assembly minutes. Given a raw speaker string as it appears in a transcript and a numbered list of known people, decide which listed person (if any) the string refers to.

Raw strings may carry titles (委員長, 議長), honorifics (君, さん), transcript bullets (○, ◆), or contain the real name in brackets. Candidates marked as affiliated are known attendees of the meeting in question and should be preferred when the text is ambiguous.

Answer with the candidate id from the list, never an id you invented. If no listed person fits, return matched=false with a null entity_id and explain why."#;

fn format_shortlist(shortlist: &[RankedCandidate]) -> String {
    let mut out = String::new();
    for ranked in shortlist {
        out.push_str(&format!(
            "- id {}: {}{}\n",
            ranked.candidate.id,
            ranked.candidate.name,
            if ranked.affiliated {
                " (affiliated: known attendee of this meeting)"
            } else {
                ""
            }
        ));
    }
    out
}

fn user_prompt(raw_name: &str, shortlist: &[RankedCandidate]) -> String {
    format!(
        "Raw speaker string: {raw_name}\n\nCandidates:\n{}",
        format_shortlist(shortlist)
    )
}

fn into_match_result(
    response: OracleResponse,
    shortlist: &[RankedCandidate],
) -> Result<MatchResult> {
    if let Some(id) = response.entity_id {
        if !shortlist.iter().any(|r| r.candidate.id == id) {
            bail!("oracle returned candidate id {id} not present in the shortlist");
        }
    }
    Ok(MatchResult {
        matched: response.matched && response.entity_id.is_some(),
        entity_id: response.entity_id,
        entity_name: response.entity_name,
        confidence: response.confidence,
        reason: response.reason,
    })
}

// ---------------------------------------------------------------------------
// StructuredOracle — single schema-constrained call
// ---------------------------------------------------------------------------

/// One structured-output classification call. Used as the primary tier and,
/// with a cheaper model, as the tertiary last-resort tier.
pub struct StructuredOracle {
    claude: Claude,
    name: String,
}

impl StructuredOracle {
    pub fn new(claude: Claude, name: impl Into<String>) -> Self {
        Self {
            claude,
            name: name.into(),
        }
    }
}

#[async_trait]
impl MatchOracle for StructuredOracle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(
        &self,
        raw_name: &str,
        shortlist: &[RankedCandidate],
    ) -> Result<MatchResult> {
        debug!(oracle = %self.name, model = %self.claude.model(), raw_name, "Oracle classification call");
        let response: OracleResponse = self
            .claude
            .extract(SYSTEM_PROMPT, &user_prompt(raw_name, shortlist))
            .await?;
        into_match_result(response, shortlist)
    }
}

// ---------------------------------------------------------------------------
// AgentOracle — bounded self-review loop
// ---------------------------------------------------------------------------

/// Secondary tier: asks for a classification, then lets the model reconsider
/// its own low-confidence answers for a bounded number of passes. The loop is
/// opaque to the engine; only the final result leaves this type.
pub struct AgentOracle {
    claude: Claude,
    name: String,
    max_passes: usize,
    review_threshold: f64,
}

impl AgentOracle {
    pub fn new(claude: Claude, name: impl Into<String>) -> Self {
        Self {
            claude,
            name: name.into(),
            max_passes: 3,
            review_threshold: 0.8,
        }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }
}

#[async_trait]
impl MatchOracle for AgentOracle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(
        &self,
        raw_name: &str,
        shortlist: &[RankedCandidate],
    ) -> Result<MatchResult> {
        let base_prompt = user_prompt(raw_name, shortlist);
        let mut prompt = base_prompt.clone();
        let mut last: Option<MatchResult> = None;

        for pass in 1..=self.max_passes {
            let response: OracleResponse =
                self.claude.extract(SYSTEM_PROMPT, &prompt).await?;
            let result = into_match_result(response, shortlist)?;
            debug!(
                oracle = %self.name,
                pass,
                confidence = result.confidence,
                "Agent oracle pass complete"
            );

            if result.confidence >= self.review_threshold {
                return Ok(result);
            }

            prompt = format!(
                "{base_prompt}\n\nYour previous answer was: {} (confidence {:.2}, reason: {}).\n\
                 Re-examine the candidates for title, bracket, and honorific variants you may \
                 have missed, then answer again. Keep the confidence honest.",
                result
                    .entity_name
                    .as_deref()
                    .unwrap_or("no match"),
                result.confidence,
                result.reason,
            );
            last = Some(result);
        }

        // All passes stayed under the threshold; surface the last judgement.
        let result = last.expect("max_passes >= 1 guarantees at least one pass");
        warn!(
            oracle = %self.name,
            confidence = result.confidence,
            "Agent oracle exhausted review passes without a confident answer"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;

    fn shortlist() -> Vec<RankedCandidate> {
        vec![
            RankedCandidate {
                candidate: Candidate::new(1, "山田太郎"),
                score: 4,
                affiliated: true,
            },
            RankedCandidate {
                candidate: Candidate::new(2, "佐藤花子"),
                score: 1,
                affiliated: false,
            },
        ]
    }

    #[test]
    fn shortlist_formatting_includes_affiliation_marker() {
        let text = format_shortlist(&shortlist());
        assert!(text.contains("id 1: 山田太郎 (affiliated"));
        assert!(text.contains("id 2: 佐藤花子\n"));
    }

    #[test]
    fn unknown_candidate_id_is_rejected() {
        let response = OracleResponse {
            matched: true,
            entity_id: Some(99),
            entity_name: Some("誰か".to_string()),
            confidence: 0.9,
            reason: "hallucinated".to_string(),
        };
        assert!(into_match_result(response, &shortlist()).is_err());
    }

    #[test]
    fn matched_without_id_is_normalized_to_unmatched() {
        let response = OracleResponse {
            matched: true,
            entity_id: None,
            entity_name: None,
            confidence: 0.4,
            reason: "unsure".to_string(),
        };
        let result = into_match_result(response, &shortlist()).unwrap();
        assert!(!result.matched);
        assert_eq!(result.confidence, 0.4);
    }
}
