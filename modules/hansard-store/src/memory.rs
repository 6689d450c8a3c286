//! In-memory store implementations. Used by the workflow/engine tests and
//! handy for local development without Postgres.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use hansard_common::{
    EntityType, ExtractionLog, HansardError, NewExtractionLog, ParliamentaryGroupMembership,
    Politician, Speaker, Statement,
};

use crate::traits::{
    AccuracyStats, AuditLogStore, LogFilter, MembershipRepository, PoliticianRepository,
    SpeakerRepository, StatementRepository,
};

// ---------------------------------------------------------------------------
// MemoryAuditLogStore
// ---------------------------------------------------------------------------

/// Append-only log store over a Vec. Ids are assigned sequentially from 1.
#[derive(Default)]
pub struct MemoryAuditLogStore {
    logs: Mutex<Vec<ExtractionLog>>,
}

impl MemoryAuditLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored row, in insertion order.
    pub fn all(&self) -> Vec<ExtractionLog> {
        self.logs.lock().unwrap().clone()
    }
}

fn matches(log: &ExtractionLog, filter: &LogFilter) -> bool {
    if let Some(et) = filter.entity_type {
        if log.entity_type != et {
            return false;
        }
    }
    if let Some(id) = filter.entity_id {
        if log.entity_id != id {
            return false;
        }
    }
    if let Some(ref version) = filter.pipeline_version {
        if log.pipeline_version != *version {
            return false;
        }
    }
    true
}

#[async_trait]
impl AuditLogStore for MemoryAuditLogStore {
    async fn create(&self, log: NewExtractionLog) -> Result<ExtractionLog> {
        let mut logs = self.logs.lock().unwrap();
        let now = Utc::now();
        let stored = ExtractionLog {
            id: logs.len() as i64 + 1,
            entity_type: log.entity_type,
            entity_id: log.entity_id,
            pipeline_version: log.pipeline_version,
            extracted_data: log.extracted_data,
            confidence_score: log.confidence_score,
            extraction_metadata: log.extraction_metadata,
            created_at: now,
            updated_at: now,
        };
        logs.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: i64) -> Result<Option<ExtractionLog>> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn list(&self, filter: &LogFilter) -> Result<Vec<ExtractionLog>> {
        let logs = self.logs.lock().unwrap();
        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(logs
            .iter()
            .rev() // newest first
            .filter(|l| matches(l, filter))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &LogFilter) -> Result<i64> {
        let logs = self.logs.lock().unwrap();
        Ok(logs.iter().filter(|l| matches(l, filter)).count() as i64)
    }

    async fn latest_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: i64,
    ) -> Result<Option<ExtractionLog>> {
        let filter = LogFilter::for_entity(entity_type, entity_id);
        let logs = self.logs.lock().unwrap();
        Ok(logs.iter().rev().find(|l| matches(l, &filter)).cloned())
    }

    async fn accuracy_stats(&self, pipeline_version: Option<&str>) -> Result<Vec<AccuracyStats>> {
        let logs = self.logs.lock().unwrap();
        let mut groups: HashMap<(EntityType, String), Vec<Option<f64>>> = HashMap::new();
        for log in logs.iter() {
            if let Some(version) = pipeline_version {
                if log.pipeline_version != version {
                    continue;
                }
            }
            groups
                .entry((log.entity_type, log.pipeline_version.clone()))
                .or_default()
                .push(log.confidence_score);
        }

        let mut stats: Vec<AccuracyStats> = groups
            .into_iter()
            .map(|((entity_type, version), scores)| {
                let attempts = scores.len() as i64;
                let scored: Vec<f64> = scores.into_iter().flatten().collect();
                let scored_attempts = scored.len() as i64;
                let (avg, min, max) = if scored.is_empty() {
                    (None, None, None)
                } else {
                    let sum: f64 = scored.iter().sum();
                    (
                        Some(sum / scored.len() as f64),
                        scored.iter().cloned().fold(f64::INFINITY, f64::min).into(),
                        scored
                            .iter()
                            .cloned()
                            .fold(f64::NEG_INFINITY, f64::max)
                            .into(),
                    )
                };
                AccuracyStats {
                    entity_type,
                    pipeline_version: version,
                    attempts,
                    scored_attempts,
                    avg_confidence: avg,
                    min_confidence: min,
                    max_confidence: max,
                }
            })
            .collect();
        stats.sort_by(|a, b| {
            a.entity_type
                .to_string()
                .cmp(&b.entity_type.to_string())
                .then(a.pipeline_version.cmp(&b.pipeline_version))
        });
        Ok(stats)
    }

    async fn update(&self, log: &ExtractionLog) -> Result<()> {
        Err(HansardError::ImmutableLog(log.id).into())
    }
}

// ---------------------------------------------------------------------------
// Entity repositories
// ---------------------------------------------------------------------------

macro_rules! memory_repo {
    ($name:ident, $trait_name:ident, $entity:ty) => {
        #[derive(Default)]
        pub struct $name {
            entities: Mutex<HashMap<i64, $entity>>,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn with(entities: impl IntoIterator<Item = $entity>) -> Self {
                let repo = Self::new();
                {
                    let mut map = repo.entities.lock().unwrap();
                    for e in entities {
                        map.insert(e.id, e);
                    }
                }
                repo
            }
        }

        #[async_trait]
        impl $trait_name for $name {
            async fn get_by_id(&self, id: i64) -> Result<Option<$entity>> {
                Ok(self.entities.lock().unwrap().get(&id).cloned())
            }

            async fn update(&self, entity: &$entity) -> Result<()> {
                self.entities
                    .lock()
                    .unwrap()
                    .insert(entity.id, entity.clone());
                Ok(())
            }
        }
    };
}

memory_repo!(MemoryPoliticianRepo, PoliticianRepository, Politician);
memory_repo!(MemorySpeakerRepo, SpeakerRepository, Speaker);
memory_repo!(MemoryStatementRepo, StatementRepository, Statement);
memory_repo!(
    MemoryMembershipRepo,
    MembershipRepository,
    ParliamentaryGroupMembership
);
