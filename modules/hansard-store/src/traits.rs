// Trait seams for the persistence layer.
//
// AuditLogStore is the Bronze side: append-only, queryable for accuracy
// analysis. The entity repositories are the Gold side. Both are async traits
// so workflows can run against in-memory stores in tests: no database, no
// Docker.

use anyhow::Result;
use async_trait::async_trait;

use hansard_common::{
    EntityType, ExtractionLog, NewExtractionLog, ParliamentaryGroupMembership, Politician,
    Speaker, Statement,
};

// ---------------------------------------------------------------------------
// AuditLogStore
// ---------------------------------------------------------------------------

/// Filter for listing/counting extraction logs. All fields optional.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<i64>,
    pub pipeline_version: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl LogFilter {
    pub fn for_entity(entity_type: EntityType, entity_id: i64) -> Self {
        Self {
            entity_type: Some(entity_type),
            entity_id: Some(entity_id),
            ..Default::default()
        }
    }

    pub fn with_pipeline_version(mut self, version: impl Into<String>) -> Self {
        self.pipeline_version = Some(version.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Per (entity_type, pipeline_version) confidence aggregate over the Bronze
/// layer. Confidence values are whatever the pipelines emitted, unclamped.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyStats {
    pub entity_type: EntityType,
    pub pipeline_version: String,
    pub attempts: i64,
    pub scored_attempts: i64,
    pub avg_confidence: Option<f64>,
    pub min_confidence: Option<f64>,
    pub max_confidence: Option<f64>,
}

/// Append-only store of extraction attempts.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    /// Append a log row. The store assigns id and timestamps.
    async fn create(&self, log: NewExtractionLog) -> Result<ExtractionLog>;

    async fn get(&self, id: i64) -> Result<Option<ExtractionLog>>;

    /// List logs matching the filter, newest first.
    async fn list(&self, filter: &LogFilter) -> Result<Vec<ExtractionLog>>;

    async fn count(&self, filter: &LogFilter) -> Result<i64>;

    /// Most recent log for one entity, if any.
    async fn latest_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: i64,
    ) -> Result<Option<ExtractionLog>>;

    /// Confidence aggregates for accuracy analysis, optionally restricted to
    /// one pipeline version.
    async fn accuracy_stats(&self, pipeline_version: Option<&str>) -> Result<Vec<AccuracyStats>>;

    /// Logs are immutable. Every implementation must reject this with
    /// `HansardError::ImmutableLog` — create a new entry instead.
    async fn update(&self, log: &ExtractionLog) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Entity repositories
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PoliticianRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<Politician>>;
    async fn update(&self, entity: &Politician) -> Result<()>;
}

#[async_trait]
pub trait SpeakerRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<Speaker>>;
    async fn update(&self, entity: &Speaker) -> Result<()>;
}

#[async_trait]
pub trait StatementRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<Statement>>;
    async fn update(&self, entity: &Statement) -> Result<()>;
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<ParliamentaryGroupMembership>>;
    async fn update(&self, entity: &ParliamentaryGroupMembership) -> Result<()>;
}

// ---------------------------------------------------------------------------
// TransactionBoundary
// ---------------------------------------------------------------------------

/// Commit/rollback hooks around the entity-apply step of the update
/// workflow. The audit-log write always happens outside this boundary and is
/// never rolled back.
#[async_trait]
pub trait TransactionBoundary: Send + Sync {
    async fn commit(&self) -> Result<()>;
    async fn rollback(&self) -> Result<()>;
}

/// No-op boundary for repositories whose `update` is a single atomic
/// statement (the Postgres repositories here).
pub struct AutoCommit;

#[async_trait]
impl TransactionBoundary for AutoCommit {
    async fn commit(&self) -> Result<()> {
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        Ok(())
    }
}
