//! Extraction log types — the append-only Bronze layer.
//!
//! Every extraction attempt becomes exactly one row, whether or not it ends
//! up touching an entity. `confidence_score` is stored verbatim, including
//! values outside [0, 1]; acceptance thresholds are business rules applied
//! downstream, never storage-layer clamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::EntityType;

/// An extraction log as stored. The store assigns `id` and both timestamps;
/// rows are never mutated or deleted by this system after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionLog {
    pub id: i64,
    pub entity_type: EntityType,
    /// Target entity id. Not foreign-key enforced — the entity may not exist
    /// yet, or may have been deleted since.
    pub entity_id: i64,
    /// Free-text tag for the pipeline/model run (e.g. "gemini-2.0-flash-v1").
    pub pipeline_version: String,
    /// Raw fields the pipeline produced, stored verbatim.
    pub extracted_data: serde_json::Value,
    pub confidence_score: Option<f64>,
    /// Model name, token counts, match reasons, timings — shape varies per
    /// entity kind and pipeline version.
    pub extraction_metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An extraction log to be appended. The caller builds this; the store
/// assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewExtractionLog {
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub pipeline_version: String,
    pub extracted_data: serde_json::Value,
    pub confidence_score: Option<f64>,
    pub extraction_metadata: Option<serde_json::Value>,
}

impl NewExtractionLog {
    pub fn new(
        entity_type: EntityType,
        entity_id: i64,
        pipeline_version: impl Into<String>,
        extracted_data: serde_json::Value,
    ) -> Self {
        Self {
            entity_type,
            entity_id,
            pipeline_version: pipeline_version.into(),
            extracted_data,
            confidence_score: None,
            extraction_metadata: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence_score = Some(confidence);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.extraction_metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_defaults_leave_optional_fields_empty() {
        let log = NewExtractionLog::new(
            EntityType::Speaker,
            42,
            "gemini-2.0-flash-v1",
            json!({"name": "山田太郎"}),
        );
        assert!(log.confidence_score.is_none());
        assert!(log.extraction_metadata.is_none());
    }

    #[test]
    fn confidence_is_not_clamped() {
        let log = NewExtractionLog::new(EntityType::Politician, 1, "v1", json!({}))
            .with_confidence(1.7);
        assert_eq!(log.confidence_score, Some(1.7));

        let log = NewExtractionLog::new(EntityType::Politician, 1, "v1", json!({}))
            .with_confidence(-0.25);
        assert_eq!(log.confidence_score, Some(-0.25));
    }
}
