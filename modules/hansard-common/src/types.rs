use serde::{Deserialize, Serialize};

// --- Entity kinds ---

/// The closed set of entity kinds an extraction attempt can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Statement,
    Politician,
    Speaker,
    ConferenceMember,
    ParliamentaryGroupMember,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Statement => write!(f, "statement"),
            EntityType::Politician => write!(f, "politician"),
            EntityType::Speaker => write!(f, "speaker"),
            EntityType::ConferenceMember => write!(f, "conference_member"),
            EntityType::ParliamentaryGroupMember => write!(f, "parliamentary_group_member"),
        }
    }
}

impl EntityType {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "statement" => Some(Self::Statement),
            "politician" => Some(Self::Politician),
            "speaker" => Some(Self::Speaker),
            "conference_member" => Some(Self::ConferenceMember),
            "parliamentary_group_member" => Some(Self::ParliamentaryGroupMember),
            _ => None,
        }
    }
}

// --- Match result ---

/// Outcome of resolving a raw speaker string to a canonical entity.
/// Ephemeral — callers decide whether to persist it via an update workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: bool,
    pub entity_id: Option<i64>,
    pub entity_name: Option<String>,
    /// 0.0–1.0 by convention; oracle output is carried verbatim, so values
    /// outside that range can appear before threshold checks.
    pub confidence: f64,
    /// Human-readable justification. Always populated.
    pub reason: String,
}

impl MatchResult {
    pub fn hit(
        entity_id: i64,
        entity_name: impl Into<String>,
        confidence: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            matched: true,
            entity_id: Some(entity_id),
            entity_name: Some(entity_name.into()),
            confidence,
            reason: reason.into(),
        }
    }

    pub fn no_match(reason: impl Into<String>) -> Self {
        Self {
            matched: false,
            entity_id: None,
            entity_name: None,
            confidence: 0.0,
            reason: reason.into(),
        }
    }

    /// Strip the identification while keeping confidence and reason for audit.
    /// Applied to oracle results that fall below the acceptance threshold.
    pub fn downgraded(self) -> Self {
        Self {
            matched: false,
            entity_id: None,
            entity_name: None,
            confidence: self.confidence,
            reason: self.reason,
        }
    }
}

// --- Update result ---

/// Why an extraction attempt did not update its target entity.
/// These are expected outcomes, reported as data rather than errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EntityNotFound,
    ManuallyVerified,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EntityNotFound => write!(f, "entity_not_found"),
            SkipReason::ManuallyVerified => write!(f, "manually_verified"),
        }
    }
}

/// Outcome of one guarded-update attempt. The audit log id is present in
/// every case — the log row is written before anything else happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResult {
    pub updated: bool,
    pub reason: Option<SkipReason>,
    pub extraction_log_id: i64,
}

impl UpdateResult {
    pub fn applied(extraction_log_id: i64) -> Self {
        Self {
            updated: true,
            reason: None,
            extraction_log_id,
        }
    }

    pub fn skipped(reason: SkipReason, extraction_log_id: i64) -> Self {
        Self {
            updated: false,
            reason: Some(reason),
            extraction_log_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_roundtrips_through_display() {
        for et in [
            EntityType::Statement,
            EntityType::Politician,
            EntityType::Speaker,
            EntityType::ConferenceMember,
            EntityType::ParliamentaryGroupMember,
        ] {
            assert_eq!(EntityType::from_str_loose(&et.to_string()), Some(et));
        }
        assert_eq!(EntityType::from_str_loose("mayor"), None);
    }

    #[test]
    fn entity_type_serializes_snake_case() {
        let json = serde_json::to_string(&EntityType::ParliamentaryGroupMember).unwrap();
        assert_eq!(json, "\"parliamentary_group_member\"");
    }

    #[test]
    fn downgrade_preserves_confidence_and_reason() {
        let r = MatchResult::hit(7, "山田太郎", 0.6, "uncertain partial").downgraded();
        assert!(!r.matched);
        assert_eq!(r.entity_id, None);
        assert_eq!(r.entity_name, None);
        assert_eq!(r.confidence, 0.6);
        assert_eq!(r.reason, "uncertain partial");
    }

    #[test]
    fn skip_reason_display_matches_wire_strings() {
        assert_eq!(SkipReason::EntityNotFound.to_string(), "entity_not_found");
        assert_eq!(SkipReason::ManuallyVerified.to_string(), "manually_verified");
    }
}
