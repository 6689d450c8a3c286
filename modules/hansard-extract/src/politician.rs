use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use hansard_common::{EntityType, Politician};
use hansard_store::PoliticianRepository;

use crate::adapter::EntityAdapter;

/// Fields a profile-scrape pipeline can produce for a politician. All
/// optional — missing fields leave the entity untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoliticianExtraction {
    pub name: Option<String>,
    pub furigana: Option<String>,
    pub district: Option<String>,
    pub profile_page_url: Option<String>,
    pub party_id: Option<i64>,
}

pub struct PoliticianAdapter {
    repo: Arc<dyn PoliticianRepository>,
}

impl PoliticianAdapter {
    pub fn new(repo: Arc<dyn PoliticianRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl EntityAdapter for PoliticianAdapter {
    type Entity = Politician;
    type Extraction = PoliticianExtraction;

    fn entity_type(&self) -> EntityType {
        EntityType::Politician
    }

    async fn fetch(&self, id: i64) -> Result<Option<Politician>> {
        self.repo.get_by_id(id).await
    }

    async fn save(&self, entity: &Politician) -> Result<()> {
        self.repo.update(entity).await
    }

    fn apply(&self, entity: &mut Politician, extraction: &PoliticianExtraction) {
        if let Some(ref name) = extraction.name {
            entity.name = name.clone();
        }
        if let Some(ref furigana) = extraction.furigana {
            entity.furigana = Some(furigana.clone());
        }
        if let Some(ref district) = extraction.district {
            entity.district = Some(district.clone());
        }
        if let Some(ref url) = extraction.profile_page_url {
            entity.profile_page_url = Some(url.clone());
        }
        if let Some(party_id) = extraction.party_id {
            entity.party_id = Some(party_id);
        }
    }
}
