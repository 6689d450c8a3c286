//! Table bootstrap for the Postgres stores.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

const DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS extraction_logs (
        id                  BIGSERIAL    PRIMARY KEY,
        entity_type         TEXT         NOT NULL,
        entity_id           BIGINT       NOT NULL,
        pipeline_version    TEXT         NOT NULL,
        extracted_data      JSONB        NOT NULL,
        confidence_score    DOUBLE PRECISION,
        extraction_metadata JSONB,
        created_at          TIMESTAMPTZ  NOT NULL DEFAULT now(),
        updated_at          TIMESTAMPTZ  NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_extraction_logs_entity
        ON extraction_logs (entity_type, entity_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS politicians (
        id                       BIGSERIAL PRIMARY KEY,
        name                     TEXT      NOT NULL,
        furigana                 TEXT,
        district                 TEXT,
        profile_page_url         TEXT,
        party_id                 BIGINT,
        is_manually_verified     BOOLEAN   NOT NULL DEFAULT FALSE,
        latest_extraction_log_id BIGINT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS speakers (
        id                       BIGSERIAL PRIMARY KEY,
        name                     TEXT      NOT NULL,
        speaker_type             TEXT,
        political_party_name     TEXT,
        position                 TEXT,
        politician_id            BIGINT,
        is_manually_verified     BOOLEAN   NOT NULL DEFAULT FALSE,
        latest_extraction_log_id BIGINT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS statements (
        id                       BIGSERIAL PRIMARY KEY,
        speech                   TEXT      NOT NULL,
        speaker_name             TEXT      NOT NULL,
        sequence_number          INTEGER,
        speaker_id               BIGINT,
        chapter_id               BIGINT,
        is_manually_verified     BOOLEAN   NOT NULL DEFAULT FALSE,
        latest_extraction_log_id BIGINT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS parliamentary_group_memberships (
        id                       BIGSERIAL PRIMARY KEY,
        politician_id            BIGINT    NOT NULL,
        group_id                 BIGINT    NOT NULL,
        role                     TEXT,
        start_date               DATE,
        end_date                 DATE,
        is_manually_verified     BOOLEAN   NOT NULL DEFAULT FALSE,
        latest_extraction_log_id BIGINT
    )
    "#,
];

/// Create all tables if they do not exist. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for ddl in DDL {
        sqlx::query(ddl).execute(pool).await?;
    }
    info!("hansard schema ensured");
    Ok(())
}
