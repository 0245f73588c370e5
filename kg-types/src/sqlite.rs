//! SQLite-backed [`DocumentStore`] and friends, generalizing
//! `pipeline_core::runtimes::checkpointer_sqlite::SQLiteCheckpointer`'s
//! connect/migrate/query shape from the graph engine's own replay state to
//! the knowledge-extraction domain's entities: one logical table per entity
//! kind (modeled here as a single `entities` table tagged by `kind`, see
//! `migrations/0001_init.sql`), plus `activity_log`, `checkpoints` and
//! `ingestion_metadata` tables for the other three persistence contracts.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use tracing::instrument;

use crate::checkpoint::{Checkpoint, IterationCheckpointStore};
use crate::idempotency::{ActivityExecutionLog, IdempotencyLog};
use crate::ingestion_meta::{IngestionDedupStore, IngestionMetadata};
use crate::store::{DocumentStore, EntityKind, StoreError};

#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: Arc<SqlitePool>,
}

impl std::fmt::Debug for SqliteDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDocumentStore").finish()
    }
}

impl SqliteDocumentStore {
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Sqlite(format!("connect error: {e}")))?;

        #[cfg(feature = "sqlite-migrations")]
        {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| StoreError::Sqlite(format!("migration failure: {e}")))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    #[instrument(skip(self, payload), err)]
    async fn save_raw(
        &self,
        kind: EntityKind,
        entity_id: &str,
        knowledge_id: &str,
        job_id: &str,
        payload: Value,
    ) -> Result<(), StoreError> {
        let payload_json = serde_json::to_string(&payload)?;
        sqlx::query(
            r#"
            INSERT INTO entities (kind, entity_id, knowledge_id, job_id, payload, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(kind, entity_id) DO UPDATE SET
                knowledge_id = excluded.knowledge_id,
                job_id = excluded.job_id,
                payload = excluded.payload,
                created_at = excluded.created_at
            "#,
        )
        .bind(kind.table_name())
        .bind(entity_id)
        .bind(knowledge_id)
        .bind(job_id)
        .bind(payload_json)
        .bind(Utc::now().to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(|e| StoreError::Sqlite(format!("save_raw: {e}")))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get_raw(&self, kind: EntityKind, entity_id: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT payload FROM entities WHERE kind = ?1 AND entity_id = ?2")
            .bind(kind.table_name())
            .bind(entity_id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| StoreError::Sqlite(format!("get_raw: {e}")))?;
        match row {
            Some(row) => {
                let payload: String = row
                    .try_get("payload")
                    .map_err(|e| StoreError::Sqlite(format!("payload column: {e}")))?;
                Ok(Some(serde_json::from_str(&payload)?))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), err)]
    async fn query_raw(
        &self,
        kind: EntityKind,
        knowledge_id: &str,
        job_id: Option<&str>,
    ) -> Result<Vec<Value>, StoreError> {
        let job_id = match job_id {
            Some(j) => Some(j.to_string()),
            None => self.latest_job_id(knowledge_id).await?,
        };
        let Some(job_id) = job_id else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT payload FROM entities WHERE kind = ?1 AND knowledge_id = ?2 AND job_id = ?3",
        )
        .bind(kind.table_name())
        .bind(knowledge_id)
        .bind(&job_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| StoreError::Sqlite(format!("query_raw: {e}")))?;

        rows.into_iter()
            .map(|row| {
                let payload: String = row
                    .try_get("payload")
                    .map_err(|e| StoreError::Sqlite(format!("payload column: {e}")))?;
                Ok(serde_json::from_str(&payload)?)
            })
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn delete_by_knowledge(
        &self,
        kind: Option<EntityKind>,
        knowledge_id: &str,
        job_id: Option<&str>,
    ) -> Result<u64, StoreError> {
        let result = match (kind, job_id) {
            (Some(kind), Some(job_id)) => {
                sqlx::query("DELETE FROM entities WHERE kind = ?1 AND knowledge_id = ?2 AND job_id = ?3")
                    .bind(kind.table_name())
                    .bind(knowledge_id)
                    .bind(job_id)
                    .execute(&*self.pool)
                    .await
            }
            (Some(kind), None) => {
                sqlx::query("DELETE FROM entities WHERE kind = ?1 AND knowledge_id = ?2")
                    .bind(kind.table_name())
                    .bind(knowledge_id)
                    .execute(&*self.pool)
                    .await
            }
            (None, Some(job_id)) => {
                sqlx::query("DELETE FROM entities WHERE knowledge_id = ?1 AND job_id = ?2")
                    .bind(knowledge_id)
                    .bind(job_id)
                    .execute(&*self.pool)
                    .await
            }
            (None, None) => {
                sqlx::query("DELETE FROM entities WHERE knowledge_id = ?1")
                    .bind(knowledge_id)
                    .execute(&*self.pool)
                    .await
            }
        }
        .map_err(|e| StoreError::Sqlite(format!("delete_by_knowledge: {e}")))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn latest_job_id(&self, knowledge_id: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query(
            "SELECT job_id FROM entities WHERE knowledge_id = ?1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(knowledge_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| StoreError::Sqlite(format!("latest_job_id: {e}")))?;
        row.map(|r| r.try_get("job_id").map_err(|e| StoreError::Sqlite(format!("job_id column: {e}"))))
            .transpose()
    }
}

#[async_trait]
impl IdempotencyLog for SqliteDocumentStore {
    #[instrument(skip(self), err)]
    async fn lookup(
        &self,
        workflow_id: &str,
        activity_name: &str,
        input_hash: &str,
    ) -> Result<Option<ActivityExecutionLog>, StoreError> {
        let row = sqlx::query(
            "SELECT workflow_id, activity_name, input_hash, output, success, error, recorded_at
             FROM activity_log WHERE workflow_id = ?1 AND activity_name = ?2 AND input_hash = ?3",
        )
        .bind(workflow_id)
        .bind(activity_name)
        .bind(input_hash)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| StoreError::Sqlite(format!("idempotency lookup: {e}")))?;
        row.map(row_to_activity_log).transpose()
    }

    #[instrument(skip(self, entry), err)]
    async fn record(&self, entry: ActivityExecutionLog) -> Result<ActivityExecutionLog, StoreError> {
        if let Some(existing) = self
            .lookup(&entry.workflow_id, &entry.activity_name, &entry.input_hash)
            .await?
        {
            if existing.success {
                return Ok(existing);
            }
        }
        let output_json = serde_json::to_string(&entry.output)?;
        sqlx::query(
            r#"
            INSERT INTO activity_log (workflow_id, activity_name, input_hash, output, success, error, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(workflow_id, activity_name, input_hash) DO UPDATE SET
                output = excluded.output,
                success = excluded.success,
                error = excluded.error,
                recorded_at = excluded.recorded_at
            "#,
        )
        .bind(&entry.workflow_id)
        .bind(&entry.activity_name)
        .bind(&entry.input_hash)
        .bind(output_json)
        .bind(entry.success)
        .bind(&entry.error)
        .bind(entry.recorded_at.to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(|e| StoreError::Sqlite(format!("idempotency record: {e}")))?;
        Ok(entry)
    }
}

fn row_to_activity_log(row: sqlx::sqlite::SqliteRow) -> Result<ActivityExecutionLog, StoreError> {
    let output: String = row
        .try_get("output")
        .map_err(|e| StoreError::Sqlite(format!("output column: {e}")))?;
    let recorded_at: String = row
        .try_get("recorded_at")
        .map_err(|e| StoreError::Sqlite(format!("recorded_at column: {e}")))?;
    Ok(ActivityExecutionLog {
        workflow_id: row
            .try_get("workflow_id")
            .map_err(|e| StoreError::Sqlite(e.to_string()))?,
        activity_name: row
            .try_get("activity_name")
            .map_err(|e| StoreError::Sqlite(e.to_string()))?,
        input_hash: row
            .try_get("input_hash")
            .map_err(|e| StoreError::Sqlite(e.to_string()))?,
        output: serde_json::from_str(&output)?,
        success: row
            .try_get("success")
            .map_err(|e| StoreError::Sqlite(e.to_string()))?,
        error: row.try_get("error").map_err(|e| StoreError::Sqlite(e.to_string()))?,
        recorded_at: chrono::DateTime::parse_from_rfc3339(&recorded_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

#[async_trait]
impl IterationCheckpointStore for SqliteDocumentStore {
    #[instrument(skip(self, checkpoint), err)]
    async fn save(&self, checkpoint: Checkpoint) -> Result<(), StoreError> {
        let items_json = serde_json::to_string(&checkpoint.items_processed)?;
        sqlx::query(
            r#"
            INSERT INTO checkpoints (workflow_id, phase, items_processed, resume_token, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(workflow_id, phase) DO UPDATE SET
                items_processed = excluded.items_processed,
                resume_token = excluded.resume_token,
                created_at = excluded.created_at
            "#,
        )
        .bind(&checkpoint.workflow_id)
        .bind(&checkpoint.phase)
        .bind(items_json)
        .bind(&checkpoint.resume_token)
        .bind(checkpoint.created_at.to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(|e| StoreError::Sqlite(format!("checkpoint save: {e}")))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn latest(&self, workflow_id: &str, phase: &str) -> Result<Option<Checkpoint>, StoreError> {
        let row = sqlx::query(
            "SELECT workflow_id, phase, items_processed, resume_token, created_at
             FROM checkpoints WHERE workflow_id = ?1 AND phase = ?2",
        )
        .bind(workflow_id)
        .bind(phase)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| StoreError::Sqlite(format!("checkpoint latest: {e}")))?;
        let Some(row) = row else { return Ok(None) };
        let items_processed: String = row
            .try_get("items_processed")
            .map_err(|e| StoreError::Sqlite(e.to_string()))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::Sqlite(e.to_string()))?;
        Ok(Some(Checkpoint {
            workflow_id: row.try_get("workflow_id").map_err(|e| StoreError::Sqlite(e.to_string()))?,
            phase: row.try_get("phase").map_err(|e| StoreError::Sqlite(e.to_string()))?,
            items_processed: serde_json::from_str(&items_processed)?,
            resume_token: row.try_get("resume_token").map_err(|e| StoreError::Sqlite(e.to_string()))?,
            created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }))
    }
}

#[async_trait]
impl IngestionDedupStore for SqliteDocumentStore {
    #[instrument(skip(self), err)]
    async fn lookup(&self, content_hash: &str) -> Result<Option<IngestionMetadata>, StoreError> {
        let row = sqlx::query(
            "SELECT content_hash, source_url, ingestion_id, ingested_at
             FROM ingestion_metadata WHERE content_hash = ?1",
        )
        .bind(content_hash)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| StoreError::Sqlite(format!("ingestion dedup lookup: {e}")))?;
        let Some(row) = row else { return Ok(None) };
        let ingested_at: String = row
            .try_get("ingested_at")
            .map_err(|e| StoreError::Sqlite(e.to_string()))?;
        Ok(Some(IngestionMetadata {
            content_hash: row.try_get("content_hash").map_err(|e| StoreError::Sqlite(e.to_string()))?,
            source_url: row.try_get("source_url").map_err(|e| StoreError::Sqlite(e.to_string()))?,
            ingestion_id: row.try_get("ingestion_id").map_err(|e| StoreError::Sqlite(e.to_string()))?,
            ingested_at: chrono::DateTime::parse_from_rfc3339(&ingested_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }))
    }

    #[instrument(skip(self, metadata), err)]
    async fn record(&self, metadata: IngestionMetadata) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO ingestion_metadata (content_hash, source_url, ingestion_id, ingested_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(content_hash) DO UPDATE SET ingested_at = excluded.ingested_at
            "#,
        )
        .bind(&metadata.content_hash)
        .bind(&metadata.source_url)
        .bind(&metadata.ingestion_id)
        .bind(metadata.ingested_at.to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(|e| StoreError::Sqlite(format!("ingestion dedup record: {e}")))?;
        Ok(())
    }
}
