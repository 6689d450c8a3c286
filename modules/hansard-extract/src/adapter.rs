use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use hansard_common::{EntityType, VerifiableEntity};

/// Per-entity-kind plumbing for the generic update workflow: identity,
/// fetch/save, and how an extraction result maps onto entity fields.
///
/// `apply` must merge, not replace: fields the pipeline left as `None` never
/// overwrite existing entity values.
#[async_trait]
pub trait EntityAdapter: Send + Sync {
    type Entity: VerifiableEntity + Send + Sync;
    type Extraction: Serialize + Send + Sync;

    fn entity_type(&self) -> EntityType;

    async fn fetch(&self, id: i64) -> Result<Option<Self::Entity>>;

    async fn save(&self, entity: &Self::Entity) -> Result<()>;

    fn apply(&self, entity: &mut Self::Entity, extraction: &Self::Extraction);

    /// Confidence to record on the audit row, if this extraction carries one.
    fn confidence(&self, _extraction: &Self::Extraction) -> Option<f64> {
        None
    }

    /// Extra metadata to record on the audit row (match reasons, model info).
    fn metadata(&self, _extraction: &Self::Extraction) -> Option<serde_json::Value> {
        None
    }
}
