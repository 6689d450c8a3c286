//! Integration tests for the Postgres stores.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

use serde_json::json;
use sqlx::PgPool;

use hansard_common::{EntityType, HansardError, NewExtractionLog, Speaker};
use hansard_store::{
    ensure_schema, AuditLogStore, LogFilter, PgAuditLogStore, PgSpeakerRepo, SpeakerRepository,
};

/// Get a test database pool, or skip if no test DB is available.
async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let pool = PgPool::connect(&url).await.ok()?;

    ensure_schema(&pool).await.ok()?;

    // Clean slate for each test
    sqlx::query("TRUNCATE extraction_logs RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .ok()?;
    sqlx::query("TRUNCATE speakers RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .ok()?;

    Some(pool)
}

#[tokio::test]
async fn create_returns_row_with_generated_id_and_timestamps() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgAuditLogStore::new(pool);

    let log = store
        .create(
            NewExtractionLog::new(
                EntityType::Speaker,
                42,
                "gemini-2.0-flash-v1",
                json!({"name": "山田太郎"}),
            )
            .with_confidence(0.95),
        )
        .await
        .unwrap();

    assert!(log.id > 0);
    assert_eq!(log.entity_id, 42);
    assert_eq!(log.confidence_score, Some(0.95));
    assert_eq!(log.created_at, log.updated_at);
}

#[tokio::test]
async fn update_is_rejected_as_immutable() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgAuditLogStore::new(pool);

    let log = store
        .create(NewExtractionLog::new(
            EntityType::Politician,
            1,
            "v1",
            json!({}),
        ))
        .await
        .unwrap();

    let err = store.update(&log).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HansardError>(),
        Some(HansardError::ImmutableLog(_))
    ));
}

#[tokio::test]
async fn out_of_range_confidence_survives_storage() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgAuditLogStore::new(pool);

    let log = store
        .create(
            NewExtractionLog::new(EntityType::Statement, 5, "v1", json!({}))
                .with_confidence(1.7),
        )
        .await
        .unwrap();

    let fetched = store.get(log.id).await.unwrap().unwrap();
    assert_eq!(fetched.confidence_score, Some(1.7));
}

#[tokio::test]
async fn list_and_count_respect_filters() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgAuditLogStore::new(pool);

    for (entity_id, version) in [(1, "v1"), (1, "v2"), (2, "v1")] {
        store
            .create(NewExtractionLog::new(
                EntityType::Speaker,
                entity_id,
                version,
                json!({}),
            ))
            .await
            .unwrap();
    }

    let filter = LogFilter::for_entity(EntityType::Speaker, 1);
    assert_eq!(store.count(&filter).await.unwrap(), 2);

    let logs = store.list(&filter).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].pipeline_version, "v2"); // newest first

    let latest = store
        .latest_for_entity(EntityType::Speaker, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.pipeline_version, "v2");
}

#[tokio::test]
async fn accuracy_stats_aggregate_per_pipeline() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PgAuditLogStore::new(pool);

    for confidence in [Some(0.9), Some(0.5), None] {
        let mut log = NewExtractionLog::new(EntityType::Speaker, 1, "v1", json!({}));
        if let Some(c) = confidence {
            log = log.with_confidence(c);
        }
        store.create(log).await.unwrap();
    }

    let stats = store.accuracy_stats(Some("v1")).await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].attempts, 3);
    assert_eq!(stats[0].scored_attempts, 2);
    assert!((stats[0].avg_confidence.unwrap() - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn speaker_repo_roundtrip() {
    let Some(pool) = test_pool().await else {
        return;
    };

    sqlx::query(
        "INSERT INTO speakers (name, is_manually_verified) VALUES ('山田太郎', FALSE)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let repo = PgSpeakerRepo::new(pool);
    let mut speaker: Speaker = repo.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(speaker.name, "山田太郎");
    assert!(speaker.politician_id.is_none());

    speaker.politician_id = Some(7);
    speaker.latest_extraction_log_id = Some(3);
    repo.update(&speaker).await.unwrap();

    let fetched = repo.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(fetched.politician_id, Some(7));
    assert_eq!(fetched.latest_extraction_log_id, Some(3));

    assert!(repo.get_by_id(999).await.unwrap().is_none());
}
