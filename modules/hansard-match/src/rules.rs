//! Deterministic name-normalization cascade. First hit wins, fixed
//! confidence per rule, no I/O — this runs in microseconds and never touches
//! an oracle.

use hansard_common::MatchResult;

use crate::candidate::Candidate;

/// Bullet/honorific symbols that minutes transcripts prefix speaker names
/// with (e.g. "○山田太郎").
const LEADING_SYMBOLS: &[char] = &[
    '◆', '◎', '○', '●', '■', '□', '▼', '▽', '△', '▲', '☆', '★',
];

pub struct RuleBasedMatcher;

impl RuleBasedMatcher {
    /// Resolve `name` against the pool. Cascade order:
    /// exact → bracket-extracted exact → symbol-stripped exact → substring.
    pub fn find_match(name: &str, pool: &[Candidate]) -> MatchResult {
        // Rule 1: exact equality.
        if let Some(c) = find_exact(name, pool) {
            return MatchResult::hit(c.id, &c.name, 1.0, "exact match");
        }

        // Rule 2: a bracketed sub-string, e.g. "委員長(山田太郎)".
        if let Some(inner) = extract_bracketed(name) {
            if let Some(c) = find_exact(&inner, pool) {
                return MatchResult::hit(c.id, &c.name, 0.95, format!("bracket match: {inner}"));
            }
        }

        // Rule 3: strip leading transcript symbols, then re-run the exact
        // rule on the cleaned string. Single cleaning pass.
        if name.starts_with(LEADING_SYMBOLS) {
            let cleaned = name.trim_start_matches(LEADING_SYMBOLS);
            if let Some(c) = find_exact(cleaned, pool) {
                return MatchResult::hit(
                    c.id,
                    &c.name,
                    1.0,
                    format!("exact match after symbol strip: {cleaned}"),
                );
            }
        }

        // Rule 4: substring containment in either direction.
        if let Some(c) = pool
            .iter()
            .filter(|c| !c.name.is_empty())
            .find(|c| name.contains(c.name.as_str()) || c.name.contains(name))
        {
            return MatchResult::hit(c.id, &c.name, 0.8, format!("partial match: {}", c.name));
        }

        MatchResult::no_match("no match in rule-based matching")
    }
}

fn find_exact<'a>(name: &str, pool: &'a [Candidate]) -> Option<&'a Candidate> {
    pool.iter().find(|c| c.name == name)
}

/// Extract the content of the first parenthesized sub-string, accepting both
/// ASCII and fullwidth brackets.
pub(crate) fn extract_bracketed(name: &str) -> Option<String> {
    let open = name.find(['(', '（'])?;
    let after_open = open + name[open..].chars().next().map_or(1, char::len_utf8);
    let rest = &name[after_open..];
    let close = rest.find([')', '）'])?;
    let inner = rest[..close].trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

/// Strip any leading transcript symbols from a raw name. Used by the
/// candidate ranker to score against the cleaned form.
pub(crate) fn strip_leading_symbols(name: &str) -> &str {
    name.trim_start_matches(LEADING_SYMBOLS)
}
