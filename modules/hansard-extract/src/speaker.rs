use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use hansard_common::{EntityType, MatchResult, Speaker};
use hansard_store::SpeakerRepository;

use crate::adapter::EntityAdapter;

/// A speaker→politician linkage produced by the matching engine. The match
/// confidence and reason travel onto the audit row via the adapter's
/// confidence/metadata extractors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakerLinkExtraction {
    pub politician_id: Option<i64>,
    pub matched_name: Option<String>,
    pub confidence: Option<f64>,
    pub reason: Option<String>,
}

impl From<&MatchResult> for SpeakerLinkExtraction {
    fn from(result: &MatchResult) -> Self {
        Self {
            politician_id: result.entity_id,
            matched_name: result.entity_name.clone(),
            confidence: Some(result.confidence),
            reason: Some(result.reason.clone()),
        }
    }
}

pub struct SpeakerAdapter {
    repo: Arc<dyn SpeakerRepository>,
}

impl SpeakerAdapter {
    pub fn new(repo: Arc<dyn SpeakerRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl EntityAdapter for SpeakerAdapter {
    type Entity = Speaker;
    type Extraction = SpeakerLinkExtraction;

    fn entity_type(&self) -> EntityType {
        EntityType::Speaker
    }

    async fn fetch(&self, id: i64) -> Result<Option<Speaker>> {
        self.repo.get_by_id(id).await
    }

    async fn save(&self, entity: &Speaker) -> Result<()> {
        self.repo.update(entity).await
    }

    fn apply(&self, entity: &mut Speaker, extraction: &SpeakerLinkExtraction) {
        if let Some(politician_id) = extraction.politician_id {
            entity.politician_id = Some(politician_id);
        }
    }

    fn confidence(&self, extraction: &SpeakerLinkExtraction) -> Option<f64> {
        extraction.confidence
    }

    fn metadata(&self, extraction: &SpeakerLinkExtraction) -> Option<serde_json::Value> {
        Some(json!({
            "matched_name": extraction.matched_name,
            "reason": extraction.reason,
        }))
    }
}
