use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hansard_common::{EntityType, ParliamentaryGroupMembership};
use hansard_store::MembershipRepository;

use crate::adapter::EntityAdapter;

/// Fields a group-roster pipeline can produce for a membership record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipExtraction {
    pub role: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub confidence: Option<f64>,
}

pub struct MembershipAdapter {
    repo: Arc<dyn MembershipRepository>,
}

impl MembershipAdapter {
    pub fn new(repo: Arc<dyn MembershipRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl EntityAdapter for MembershipAdapter {
    type Entity = ParliamentaryGroupMembership;
    type Extraction = MembershipExtraction;

    fn entity_type(&self) -> EntityType {
        EntityType::ParliamentaryGroupMember
    }

    async fn fetch(&self, id: i64) -> Result<Option<ParliamentaryGroupMembership>> {
        self.repo.get_by_id(id).await
    }

    async fn save(&self, entity: &ParliamentaryGroupMembership) -> Result<()> {
        self.repo.update(entity).await
    }

    fn apply(
        &self,
        entity: &mut ParliamentaryGroupMembership,
        extraction: &MembershipExtraction,
    ) {
        if let Some(ref role) = extraction.role {
            entity.role = Some(role.clone());
        }
        if let Some(start_date) = extraction.start_date {
            entity.start_date = Some(start_date);
        }
        if let Some(end_date) = extraction.end_date {
            entity.end_date = Some(end_date);
        }
    }

    fn confidence(&self, extraction: &MembershipExtraction) -> Option<f64> {
        extraction.confidence
    }
}
