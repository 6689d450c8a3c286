//! Postgres implementations backed by sqlx.
//!
//! `PgAuditLogStore.create` is a single `INSERT … RETURNING` — the database
//! assigns id and timestamps. The `update` guard never reaches the database.
//! Entity repository `update`s are single statements, so they pair with the
//! `AutoCommit` transaction boundary.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hansard_common::{
    EntityType, ExtractionLog, HansardError, NewExtractionLog, ParliamentaryGroupMembership,
    Politician, Speaker, Statement,
};

use crate::traits::{
    AccuracyStats, AuditLogStore, LogFilter, MembershipRepository, PoliticianRepository,
    SpeakerRepository, StatementRepository,
};

// ---------------------------------------------------------------------------
// PgAuditLogStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgAuditLogStore {
    pool: PgPool,
}

impl PgAuditLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LogRow {
    id: i64,
    entity_type: String,
    entity_id: i64,
    pipeline_version: String,
    extracted_data: serde_json::Value,
    confidence_score: Option<f64>,
    extraction_metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LogRow> for ExtractionLog {
    type Error = anyhow::Error;

    fn try_from(row: LogRow) -> Result<Self> {
        let entity_type = EntityType::from_str_loose(&row.entity_type)
            .ok_or_else(|| anyhow!("unknown entity_type in extraction_logs: {}", row.entity_type))?;
        Ok(ExtractionLog {
            id: row.id,
            entity_type,
            entity_id: row.entity_id,
            pipeline_version: row.pipeline_version,
            extracted_data: row.extracted_data,
            confidence_score: row.confidence_score,
            extraction_metadata: row.extraction_metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const LOG_COLUMNS: &str = "id, entity_type, entity_id, pipeline_version, extracted_data, \
                           confidence_score, extraction_metadata, created_at, updated_at";

#[async_trait]
impl AuditLogStore for PgAuditLogStore {
    async fn create(&self, log: NewExtractionLog) -> Result<ExtractionLog> {
        let row = sqlx::query_as::<_, LogRow>(&format!(
            r#"
            INSERT INTO extraction_logs
                (entity_type, entity_id, pipeline_version, extracted_data,
                 confidence_score, extraction_metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {LOG_COLUMNS}
            "#
        ))
        .bind(log.entity_type.to_string())
        .bind(log.entity_id)
        .bind(&log.pipeline_version)
        .bind(&log.extracted_data)
        .bind(log.confidence_score)
        .bind(&log.extraction_metadata)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: i64) -> Result<Option<ExtractionLog>> {
        let row = sqlx::query_as::<_, LogRow>(&format!(
            "SELECT {LOG_COLUMNS} FROM extraction_logs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, filter: &LogFilter) -> Result<Vec<ExtractionLog>> {
        let rows = sqlx::query_as::<_, LogRow>(&format!(
            r#"
            SELECT {LOG_COLUMNS} FROM extraction_logs
            WHERE ($1::text   IS NULL OR entity_type = $1)
              AND ($2::bigint IS NULL OR entity_id = $2)
              AND ($3::text   IS NULL OR pipeline_version = $3)
            ORDER BY id DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.entity_type.map(|t| t.to_string()))
        .bind(filter.entity_id)
        .bind(&filter.pipeline_version)
        .bind(filter.limit.unwrap_or(i64::MAX))
        .bind(filter.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(&self, filter: &LogFilter) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT count(*) FROM extraction_logs
            WHERE ($1::text   IS NULL OR entity_type = $1)
              AND ($2::bigint IS NULL OR entity_id = $2)
              AND ($3::text   IS NULL OR pipeline_version = $3)
            "#,
        )
        .bind(filter.entity_type.map(|t| t.to_string()))
        .bind(filter.entity_id)
        .bind(&filter.pipeline_version)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn latest_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: i64,
    ) -> Result<Option<ExtractionLog>> {
        let row = sqlx::query_as::<_, LogRow>(&format!(
            r#"
            SELECT {LOG_COLUMNS} FROM extraction_logs
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY id DESC
            LIMIT 1
            "#
        ))
        .bind(entity_type.to_string())
        .bind(entity_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn accuracy_stats(&self, pipeline_version: Option<&str>) -> Result<Vec<AccuracyStats>> {
        let rows: Vec<(String, String, i64, i64, Option<f64>, Option<f64>, Option<f64>)> =
            sqlx::query_as(
                r#"
                SELECT entity_type, pipeline_version,
                       count(*),
                       count(confidence_score),
                       avg(confidence_score),
                       min(confidence_score),
                       max(confidence_score)
                FROM extraction_logs
                WHERE ($1::text IS NULL OR pipeline_version = $1)
                GROUP BY entity_type, pipeline_version
                ORDER BY entity_type, pipeline_version
                "#,
            )
            .bind(pipeline_version)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(et, version, attempts, scored, avg, min, max)| {
                let entity_type = EntityType::from_str_loose(&et)
                    .ok_or_else(|| anyhow!("unknown entity_type in extraction_logs: {et}"))?;
                Ok(AccuracyStats {
                    entity_type,
                    pipeline_version: version,
                    attempts,
                    scored_attempts: scored,
                    avg_confidence: avg,
                    min_confidence: min,
                    max_confidence: max,
                })
            })
            .collect()
    }

    async fn update(&self, log: &ExtractionLog) -> Result<()> {
        Err(HansardError::ImmutableLog(log.id).into())
    }
}

// ---------------------------------------------------------------------------
// Entity repositories
// ---------------------------------------------------------------------------

macro_rules! pg_repo {
    ($name:ident) => {
        #[derive(Clone)]
        pub struct $name {
            pool: PgPool,
        }

        impl $name {
            pub fn new(pool: PgPool) -> Self {
                Self { pool }
            }
        }
    };
}

pg_repo!(PgPoliticianRepo);
pg_repo!(PgSpeakerRepo);
pg_repo!(PgStatementRepo);
pg_repo!(PgMembershipRepo);

#[async_trait]
impl PoliticianRepository for PgPoliticianRepo {
    async fn get_by_id(&self, id: i64) -> Result<Option<Politician>> {
        let row: Option<(i64, String, Option<String>, Option<String>, Option<String>, Option<i64>, bool, Option<i64>)> =
            sqlx::query_as(
                r#"
                SELECT id, name, furigana, district, profile_page_url, party_id,
                       is_manually_verified, latest_extraction_log_id
                FROM politicians WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(
            |(id, name, furigana, district, profile_page_url, party_id, verified, log_id)| {
                Politician {
                    id,
                    name,
                    furigana,
                    district,
                    profile_page_url,
                    party_id,
                    is_manually_verified: verified,
                    latest_extraction_log_id: log_id,
                }
            },
        ))
    }

    async fn update(&self, entity: &Politician) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE politicians
            SET name = $2, furigana = $3, district = $4, profile_page_url = $5,
                party_id = $6, latest_extraction_log_id = $7
            WHERE id = $1
            "#,
        )
        .bind(entity.id)
        .bind(&entity.name)
        .bind(&entity.furigana)
        .bind(&entity.district)
        .bind(&entity.profile_page_url)
        .bind(entity.party_id)
        .bind(entity.latest_extraction_log_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SpeakerRepository for PgSpeakerRepo {
    async fn get_by_id(&self, id: i64) -> Result<Option<Speaker>> {
        let row: Option<(i64, String, Option<String>, Option<String>, Option<String>, Option<i64>, bool, Option<i64>)> =
            sqlx::query_as(
                r#"
                SELECT id, name, speaker_type, political_party_name, "position",
                       politician_id, is_manually_verified, latest_extraction_log_id
                FROM speakers WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(
            |(id, name, speaker_type, party_name, position, politician_id, verified, log_id)| {
                Speaker {
                    id,
                    name,
                    speaker_type,
                    political_party_name: party_name,
                    position,
                    politician_id,
                    is_manually_verified: verified,
                    latest_extraction_log_id: log_id,
                }
            },
        ))
    }

    async fn update(&self, entity: &Speaker) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE speakers
            SET name = $2, speaker_type = $3, political_party_name = $4,
                "position" = $5, politician_id = $6, latest_extraction_log_id = $7
            WHERE id = $1
            "#,
        )
        .bind(entity.id)
        .bind(&entity.name)
        .bind(&entity.speaker_type)
        .bind(&entity.political_party_name)
        .bind(&entity.position)
        .bind(entity.politician_id)
        .bind(entity.latest_extraction_log_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl StatementRepository for PgStatementRepo {
    async fn get_by_id(&self, id: i64) -> Result<Option<Statement>> {
        let row: Option<(i64, String, String, Option<i32>, Option<i64>, Option<i64>, bool, Option<i64>)> =
            sqlx::query_as(
                r#"
                SELECT id, speech, speaker_name, sequence_number, speaker_id,
                       chapter_id, is_manually_verified, latest_extraction_log_id
                FROM statements WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(
            |(id, speech, speaker_name, sequence_number, speaker_id, chapter_id, verified, log_id)| {
                Statement {
                    id,
                    speech,
                    speaker_name,
                    sequence_number,
                    speaker_id,
                    chapter_id,
                    is_manually_verified: verified,
                    latest_extraction_log_id: log_id,
                }
            },
        ))
    }

    async fn update(&self, entity: &Statement) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE statements
            SET speech = $2, speaker_name = $3, sequence_number = $4,
                speaker_id = $5, chapter_id = $6, latest_extraction_log_id = $7
            WHERE id = $1
            "#,
        )
        .bind(entity.id)
        .bind(&entity.speech)
        .bind(&entity.speaker_name)
        .bind(entity.sequence_number)
        .bind(entity.speaker_id)
        .bind(entity.chapter_id)
        .bind(entity.latest_extraction_log_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepo {
    async fn get_by_id(&self, id: i64) -> Result<Option<ParliamentaryGroupMembership>> {
        let row: Option<(i64, i64, i64, Option<String>, Option<chrono::NaiveDate>, Option<chrono::NaiveDate>, bool, Option<i64>)> =
            sqlx::query_as(
                r#"
                SELECT id, politician_id, group_id, role, start_date, end_date,
                       is_manually_verified, latest_extraction_log_id
                FROM parliamentary_group_memberships WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(
            |(id, politician_id, group_id, role, start_date, end_date, verified, log_id)| {
                ParliamentaryGroupMembership {
                    id,
                    politician_id,
                    group_id,
                    role,
                    start_date,
                    end_date,
                    is_manually_verified: verified,
                    latest_extraction_log_id: log_id,
                }
            },
        ))
    }

    async fn update(&self, entity: &ParliamentaryGroupMembership) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE parliamentary_group_memberships
            SET politician_id = $2, group_id = $3, role = $4, start_date = $5,
                end_date = $6, latest_extraction_log_id = $7
            WHERE id = $1
            "#,
        )
        .bind(entity.id)
        .bind(entity.politician_id)
        .bind(entity.group_id)
        .bind(&entity.role)
        .bind(entity.start_date)
        .bind(entity.end_date)
        .bind(entity.latest_extraction_log_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
