//! Hybrid speaker-name matching: a deterministic rule cascade for the common
//! case, a ranked shortlist plus up-to-three LLM oracle tiers for the rest.

pub mod candidate;
pub mod engine;
pub mod oracle;
pub mod ranker;
pub mod rules;

pub use candidate::{Candidate, RankedCandidate};
pub use engine::{MatchingEngine, FAST_ACCEPT_THRESHOLD, ORACLE_ACCEPT_THRESHOLD};
pub use oracle::{AgentOracle, MatchOracle, StructuredOracle};
pub use ranker::{rank_candidates, DEFAULT_SHORTLIST_CAP};
pub use rules::RuleBasedMatcher;
