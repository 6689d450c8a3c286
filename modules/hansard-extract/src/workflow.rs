//! The guarded-update protocol: always log, conditionally apply.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use hansard_common::{NewExtractionLog, SkipReason, UpdateResult, VerifiableEntity};
use hansard_store::{AuditLogStore, TransactionBoundary};

use crate::adapter::EntityAdapter;

/// Generic update workflow over one entity kind.
///
/// `execute` runs a fixed sequence: write the audit log (unconditional),
/// fetch the entity, check the manually-verified guard, then apply and save
/// inside the transaction boundary. Entity-not-found and verified-skip are
/// reported as data; persistence errors during the apply step roll back and
/// propagate. The audit row written in step 1 is outside the boundary and
/// survives every outcome.
pub struct UpdateWorkflow<A: EntityAdapter> {
    adapter: A,
    logs: Arc<dyn AuditLogStore>,
    tx: Arc<dyn TransactionBoundary>,
}

impl<A: EntityAdapter> UpdateWorkflow<A> {
    pub fn new(adapter: A, logs: Arc<dyn AuditLogStore>, tx: Arc<dyn TransactionBoundary>) -> Self {
        Self { adapter, logs, tx }
    }

    pub async fn execute(
        &self,
        entity_id: i64,
        extraction: &A::Extraction,
        pipeline_version: &str,
    ) -> Result<UpdateResult> {
        let entity_type = self.adapter.entity_type();

        // Step 1: audit log, written no matter what happens next.
        let mut new_log = NewExtractionLog::new(
            entity_type,
            entity_id,
            pipeline_version,
            serde_json::to_value(extraction)?,
        );
        if let Some(confidence) = self.adapter.confidence(extraction) {
            new_log = new_log.with_confidence(confidence);
        }
        if let Some(metadata) = self.adapter.metadata(extraction) {
            new_log = new_log.with_metadata(metadata);
        }
        let log = self.logs.create(new_log).await?;
        debug!(%entity_type, entity_id, log_id = log.id, "Extraction attempt logged");

        // Step 2: fetch the target.
        let Some(mut entity) = self.adapter.fetch(entity_id).await? else {
            info!(
                %entity_type,
                entity_id,
                log_id = log.id,
                "Target entity not found; extraction logged only"
            );
            return Ok(UpdateResult::skipped(SkipReason::EntityNotFound, log.id));
        };

        // Step 3: the manually-verified guard. No transaction is begun for
        // a skipped entity.
        if !entity.can_be_updated_by_ai() {
            info!(
                %entity_type,
                entity_id,
                log_id = log.id,
                "Entity is manually verified; AI update skipped"
            );
            return Ok(UpdateResult::skipped(SkipReason::ManuallyVerified, log.id));
        }

        // Step 4: apply, attach provenance, save, commit. Any failure in
        // here rolls back before propagating, so the boundary is never left
        // open.
        self.adapter.apply(&mut entity, extraction);
        entity.update_from_extraction_log(log.id);
        let saved = match self.adapter.save(&entity).await {
            Ok(()) => self.tx.commit().await,
            Err(e) => Err(e),
        };
        match saved {
            Ok(()) => {
                info!(%entity_type, entity_id, log_id = log.id, "Entity updated from extraction");
                Ok(UpdateResult::applied(log.id))
            }
            Err(e) => {
                if let Err(rollback_err) = self.tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed after apply error");
                }
                Err(e)
            }
        }
    }
}
