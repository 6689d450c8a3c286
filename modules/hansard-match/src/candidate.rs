use serde::{Deserialize, Serialize};

/// A pool entry the matcher can resolve against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
}

impl Candidate {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A candidate after ranking, carrying its score and whether it belongs to
/// the contextual-affiliation set (e.g. known attendees of the meeting).
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    pub score: i32,
    pub affiliated: bool,
}
