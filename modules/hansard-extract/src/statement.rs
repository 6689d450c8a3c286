use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use hansard_common::{EntityType, Statement};
use hansard_store::StatementRepository;

use crate::adapter::EntityAdapter;

/// Fields a minutes-parsing pipeline can produce for a statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementExtraction {
    pub speech: Option<String>,
    pub speaker_name: Option<String>,
    pub sequence_number: Option<i32>,
    pub speaker_id: Option<i64>,
    pub chapter_id: Option<i64>,
}

pub struct StatementAdapter {
    repo: Arc<dyn StatementRepository>,
}

impl StatementAdapter {
    pub fn new(repo: Arc<dyn StatementRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl EntityAdapter for StatementAdapter {
    type Entity = Statement;
    type Extraction = StatementExtraction;

    fn entity_type(&self) -> EntityType {
        EntityType::Statement
    }

    async fn fetch(&self, id: i64) -> Result<Option<Statement>> {
        self.repo.get_by_id(id).await
    }

    async fn save(&self, entity: &Statement) -> Result<()> {
        self.repo.update(entity).await
    }

    fn apply(&self, entity: &mut Statement, extraction: &StatementExtraction) {
        if let Some(ref speech) = extraction.speech {
            entity.speech = speech.clone();
        }
        if let Some(ref speaker_name) = extraction.speaker_name {
            entity.speaker_name = speaker_name.clone();
        }
        if let Some(sequence_number) = extraction.sequence_number {
            entity.sequence_number = Some(sequence_number);
        }
        if let Some(speaker_id) = extraction.speaker_id {
            entity.speaker_id = Some(speaker_id);
        }
        if let Some(chapter_id) = extraction.chapter_id {
            entity.chapter_id = Some(chapter_id);
        }
    }
}
