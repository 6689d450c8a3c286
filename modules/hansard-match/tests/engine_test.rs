//! Engine tests with scripted oracle tiers: fast path never pays for an
//! oracle call, low confidence downgrades, tier errors fall through, and
//! all-tiers-down surfaces a typed external-service error.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use hansard_common::{HansardError, MatchResult};
use hansard_match::{Candidate, MatchOracle, MatchingEngine, RankedCandidate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("hansard_match=debug")
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Scripted oracle
// ---------------------------------------------------------------------------

enum Script {
    Result(MatchResult),
    Error(&'static str),
}

/// Returns a fixed result (or error) and counts invocations.
struct ScriptedOracle {
    name: &'static str,
    script: Script,
    calls: AtomicUsize,
    seen_shortlist_len: AtomicUsize,
}

impl ScriptedOracle {
    fn returning(name: &'static str, result: MatchResult) -> Arc<Self> {
        Arc::new(Self {
            name,
            script: Script::Result(result),
            calls: AtomicUsize::new(0),
            seen_shortlist_len: AtomicUsize::new(0),
        })
    }

    fn failing(name: &'static str, message: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            script: Script::Error(message),
            calls: AtomicUsize::new(0),
            seen_shortlist_len: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchOracle for ScriptedOracle {
    fn name(&self) -> &str {
        self.name
    }

    async fn classify(
        &self,
        _raw_name: &str,
        shortlist: &[RankedCandidate],
    ) -> Result<MatchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_shortlist_len
            .store(shortlist.len(), Ordering::SeqCst);
        match &self.script {
            Script::Result(r) => Ok(r.clone()),
            Script::Error(message) => bail!("{message}"),
        }
    }
}

fn pool() -> Vec<Candidate> {
    vec![
        Candidate::new(1, "山田太郎"),
        Candidate::new(2, "佐藤花子"),
        Candidate::new(3, "鈴木一"),
    ]
}

// ---------------------------------------------------------------------------
// Fast path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exact_name_never_invokes_the_oracle() {
    init_tracing();
    let oracle = ScriptedOracle::returning("primary", MatchResult::no_match("should not run"));
    let engine = MatchingEngine::new(oracle.clone());

    let result = engine
        .find_best_match("山田太郎", &pool(), None)
        .await
        .unwrap();

    assert!(result.matched);
    assert_eq!(result.entity_id, Some(1));
    assert_eq!(result.confidence, 1.0);
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn bracketed_name_fast_accepts_at_095() {
    let oracle = ScriptedOracle::returning("primary", MatchResult::no_match("should not run"));
    let engine = MatchingEngine::new(oracle.clone());

    let result = engine
        .find_best_match("委員長(山田太郎)", &pool(), None)
        .await
        .unwrap();

    assert!(result.matched);
    assert_eq!(result.entity_id, Some(1));
    assert_eq!(result.confidence, 0.95);
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn empty_pool_short_circuits() {
    let oracle = ScriptedOracle::returning("primary", MatchResult::no_match("should not run"));
    let engine = MatchingEngine::new(oracle.clone());

    let result = engine.find_best_match("山田太郎", &[], None).await.unwrap();

    assert!(!result.matched);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.reason, "candidate pool is empty");
    assert_eq!(oracle.calls(), 0);
}

// ---------------------------------------------------------------------------
// Tier cascade
// ---------------------------------------------------------------------------

#[tokio::test]
async fn partial_rule_match_falls_through_to_oracle() {
    // 0.8 rule confidence is below the 0.9 fast-accept bar.
    let oracle = ScriptedOracle::returning(
        "primary",
        MatchResult::hit(2, "佐藤花子", 0.85, "title variant of listed name"),
    );
    let engine = MatchingEngine::new(oracle.clone());

    let result = engine
        .find_best_match("佐藤花子議員", &pool(), None)
        .await
        .unwrap();

    assert_eq!(oracle.calls(), 1);
    assert!(result.matched);
    assert_eq!(result.entity_id, Some(2));
    assert_eq!(result.confidence, 0.85);
}

#[tokio::test]
async fn low_confidence_oracle_result_is_downgraded() {
    let oracle = ScriptedOracle::returning(
        "primary",
        MatchResult::hit(1, "山田太郎", 0.6, "weak surname overlap"),
    );
    let engine = MatchingEngine::new(oracle.clone());

    let result = engine
        .find_best_match("やまだ", &pool(), None)
        .await
        .unwrap();

    assert!(!result.matched);
    assert_eq!(result.entity_id, None);
    assert_eq!(result.entity_name, None);
    // Confidence and reason survive the downgrade untouched.
    assert_eq!(result.confidence, 0.6);
    assert_eq!(result.reason, "weak surname overlap");
}

#[tokio::test]
async fn secondary_tier_rescues_a_hesitant_primary() {
    let primary = ScriptedOracle::returning(
        "primary",
        MatchResult::hit(1, "山田太郎", 0.5, "unsure"),
    );
    let secondary = ScriptedOracle::returning(
        "agent",
        MatchResult::hit(1, "山田太郎", 0.9, "bracket variant confirmed"),
    );
    let tertiary = ScriptedOracle::returning("fallback", MatchResult::no_match("should not run"));
    let engine = MatchingEngine::new(primary.clone())
        .with_fallback(secondary.clone())
        .with_fallback(tertiary.clone());

    let result = engine
        .find_best_match("やまだ", &pool(), None)
        .await
        .unwrap();

    assert!(result.matched);
    assert_eq!(result.confidence, 0.9);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
    assert_eq!(tertiary.calls(), 0);
}

#[tokio::test]
async fn failed_primary_falls_through_to_fallback() {
    let primary = ScriptedOracle::failing("primary", "upstream timeout");
    let fallback = ScriptedOracle::returning(
        "fallback",
        MatchResult::hit(3, "鈴木一", 0.85, "only plausible candidate"),
    );
    let engine = MatchingEngine::new(primary.clone()).with_fallback(fallback.clone());

    let result = engine
        .find_best_match("すずき", &pool(), None)
        .await
        .unwrap();

    assert!(result.matched);
    assert_eq!(result.entity_id, Some(3));
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 1);
}

#[tokio::test]
async fn deepest_successful_tier_is_the_one_downgraded() {
    let primary = ScriptedOracle::returning(
        "primary",
        MatchResult::hit(1, "山田太郎", 0.7, "primary hunch"),
    );
    let fallback = ScriptedOracle::failing("fallback", "rate limited");
    let engine = MatchingEngine::new(primary.clone()).with_fallback(fallback.clone());

    let result = engine
        .find_best_match("やまだ", &pool(), None)
        .await
        .unwrap();

    // Fallback errored, so the primary's low-confidence judgement survives,
    // downgraded.
    assert!(!result.matched);
    assert_eq!(result.confidence, 0.7);
    assert_eq!(result.reason, "primary hunch");
}

#[tokio::test]
async fn all_tiers_failing_raises_external_service_error() {
    let primary = ScriptedOracle::failing("primary", "connection refused");
    let fallback = ScriptedOracle::failing("fallback", "connection refused");
    let engine = MatchingEngine::new(primary).with_fallback(fallback);

    let err = engine
        .find_best_match("やまだ", &pool(), None)
        .await
        .unwrap_err();

    match err.downcast_ref::<HansardError>() {
        Some(HansardError::ExternalService { service, reason, .. }) => {
            assert_eq!(service, "match_oracle");
            assert!(reason.contains("primary"));
            assert!(reason.contains("fallback"));
        }
        other => panic!("expected ExternalService, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Shortlist handoff
// ---------------------------------------------------------------------------

#[tokio::test]
async fn oracle_receives_a_capped_shortlist() {
    let oracle = ScriptedOracle::returning("primary", MatchResult::no_match("nothing fits"));
    let engine = MatchingEngine::new(oracle.clone()).with_shortlist_cap(5);

    let big_pool: Vec<Candidate> = (0..40)
        .map(|i| Candidate::new(i, format!("山田{i}")))
        .collect();
    let _ = engine.find_best_match("山田", &big_pool, None).await.unwrap();

    assert_eq!(oracle.calls(), 1);
    assert_eq!(oracle.seen_shortlist_len.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn affiliated_ids_reach_the_shortlist() {
    let oracle = ScriptedOracle::returning("primary", MatchResult::no_match("nothing fits"));
    let engine = MatchingEngine::new(oracle.clone()).with_shortlist_cap(1);

    // No textual overlap anywhere; affiliation alone promotes candidate 2.
    let pool = vec![
        Candidate::new(1, "completely different one"),
        Candidate::new(2, "completely different two"),
    ];
    let affiliated: HashSet<i64> = [2].into_iter().collect();
    let _ = engine
        .find_best_match("やまだ", &pool, Some(&affiliated))
        .await
        .unwrap();

    assert_eq!(oracle.seen_shortlist_len.load(Ordering::SeqCst), 1);
}
