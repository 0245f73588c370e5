//! In-memory backend mirroring every persistence trait in this crate, the
//! same way `pipeline_core::runtimes::checkpointer::InMemoryCheckpointer`
//! mirrors its SQLite counterpart. Never chosen implicitly: a caller must
//! construct it explicitly (see [`crate::config::DocumentStoreConfig`]).

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::checkpoint::{Checkpoint, IterationCheckpointStore};
use crate::idempotency::{ActivityExecutionLog, IdempotencyLog};
use crate::ingestion_meta::{IngestionDedupStore, IngestionMetadata};
use crate::store::{DocumentStore, EntityKind, StoreError};

#[derive(Debug, Clone)]
struct StoredEntity {
    knowledge_id: String,
    job_id: String,
    created_at: chrono::DateTime<Utc>,
    payload: Value,
}

/// Single struct implementing [`DocumentStore`], [`IdempotencyLog`],
/// [`IterationCheckpointStore`] and [`IngestionDedupStore`] over plain
/// in-process hash maps, guarded by `RwLock`s the way `InMemoryCheckpointer`
/// guards its single map.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    entities: RwLock<FxHashMap<(EntityKind, String), StoredEntity>>,
    activity_log: RwLock<FxHashMap<(String, String, String), ActivityExecutionLog>>,
    checkpoints: RwLock<FxHashMap<(String, String), Checkpoint>>,
    ingestion_meta: RwLock<FxHashMap<String, IngestionMetadata>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned(what: &str) -> StoreError {
        StoreError::Sqlite(format!("in-memory store lock poisoned: {what}"))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save_raw(
        &self,
        kind: EntityKind,
        entity_id: &str,
        knowledge_id: &str,
        job_id: &str,
        payload: Value,
    ) -> Result<(), StoreError> {
        let mut map = self
            .entities
            .write()
            .map_err(|_| Self::poisoned("entities"))?;
        map.insert(
            (kind, entity_id.to_string()),
            StoredEntity {
                knowledge_id: knowledge_id.to_string(),
                job_id: job_id.to_string(),
                created_at: Utc::now(),
                payload,
            },
        );
        Ok(())
    }

    async fn get_raw(&self, kind: EntityKind, entity_id: &str) -> Result<Option<Value>, StoreError> {
        let map = self
            .entities
            .read()
            .map_err(|_| Self::poisoned("entities"))?;
        Ok(map.get(&(kind, entity_id.to_string())).map(|e| e.payload.clone()))
    }

    async fn query_raw(
        &self,
        kind: EntityKind,
        knowledge_id: &str,
        job_id: Option<&str>,
    ) -> Result<Vec<Value>, StoreError> {
        let map = self
            .entities
            .read()
            .map_err(|_| Self::poisoned("entities"))?;
        let job_id = match job_id {
            Some(j) => Some(j.to_string()),
            None => latest_job_id_locked(&map, knowledge_id),
        };
        let Some(job_id) = job_id else {
            return Ok(Vec::new());
        };
        Ok(map
            .iter()
            .filter(|((k, _), e)| *k == kind && e.knowledge_id == knowledge_id && e.job_id == job_id)
            .map(|(_, e)| e.payload.clone())
            .collect())
    }

    async fn delete_by_knowledge(
        &self,
        kind: Option<EntityKind>,
        knowledge_id: &str,
        job_id: Option<&str>,
    ) -> Result<u64, StoreError> {
        let mut map = self
            .entities
            .write()
            .map_err(|_| Self::poisoned("entities"))?;
        let before = map.len();
        map.retain(|(k, _), e| {
            let matches_kind = kind.map(|kk| kk == *k).unwrap_or(true);
            let matches_job = job_id.map(|j| e.job_id == j).unwrap_or(true);
            !(matches_kind && e.knowledge_id == knowledge_id && matches_job)
        });
        Ok((before - map.len()) as u64)
    }

    async fn latest_job_id(&self, knowledge_id: &str) -> Result<Option<String>, StoreError> {
        let map = self
            .entities
            .read()
            .map_err(|_| Self::poisoned("entities"))?;
        Ok(latest_job_id_locked(&map, knowledge_id))
    }
}

fn latest_job_id_locked(
    map: &FxHashMap<(EntityKind, String), StoredEntity>,
    knowledge_id: &str,
) -> Option<String> {
    map.values()
        .filter(|e| e.knowledge_id == knowledge_id)
        .max_by_key(|e| e.created_at)
        .map(|e| e.job_id.clone())
}

#[async_trait]
impl IdempotencyLog for InMemoryDocumentStore {
    async fn lookup(
        &self,
        workflow_id: &str,
        activity_name: &str,
        input_hash: &str,
    ) -> Result<Option<ActivityExecutionLog>, StoreError> {
        let map = self
            .activity_log
            .read()
            .map_err(|_| Self::poisoned("activity_log"))?;
        Ok(map
            .get(&(
                workflow_id.to_string(),
                activity_name.to_string(),
                input_hash.to_string(),
            ))
            .cloned())
    }

    async fn record(&self, entry: ActivityExecutionLog) -> Result<ActivityExecutionLog, StoreError> {
        let mut map = self
            .activity_log
            .write()
            .map_err(|_| Self::poisoned("activity_log"))?;
        let key = (
            entry.workflow_id.clone(),
            entry.activity_name.clone(),
            entry.input_hash.clone(),
        );
        if let Some(existing) = map.get(&key) {
            if existing.success {
                return Ok(existing.clone());
            }
        }
        map.insert(key, entry.clone());
        Ok(entry)
    }
}

#[async_trait]
impl IterationCheckpointStore for InMemoryDocumentStore {
    async fn save(&self, checkpoint: Checkpoint) -> Result<(), StoreError> {
        let mut map = self
            .checkpoints
            .write()
            .map_err(|_| Self::poisoned("checkpoints"))?;
        map.insert(
            (checkpoint.workflow_id.clone(), checkpoint.phase.clone()),
            checkpoint,
        );
        Ok(())
    }

    async fn latest(&self, workflow_id: &str, phase: &str) -> Result<Option<Checkpoint>, StoreError> {
        let map = self
            .checkpoints
            .read()
            .map_err(|_| Self::poisoned("checkpoints"))?;
        Ok(map.get(&(workflow_id.to_string(), phase.to_string())).cloned())
    }
}

#[async_trait]
impl IngestionDedupStore for InMemoryDocumentStore {
    async fn lookup(&self, content_hash: &str) -> Result<Option<IngestionMetadata>, StoreError> {
        let map = self
            .ingestion_meta
            .read()
            .map_err(|_| Self::poisoned("ingestion_meta"))?;
        Ok(map.get(content_hash).cloned())
    }

    async fn record(&self, metadata: IngestionMetadata) -> Result<(), StoreError> {
        let mut map = self
            .ingestion_meta
            .write()
            .map_err(|_| Self::poisoned("ingestion_meta"))?;
        map.entry(metadata.content_hash.clone())
            .and_modify(|existing| existing.ingested_at = metadata.ingested_at)
            .or_insert(metadata);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStoreExt;

    #[tokio::test]
    async fn save_and_query_by_knowledge_id_returns_latest_job() {
        let store = InMemoryDocumentStore::new();
        store
            .save_raw(EntityKind::Screen, "s1", "kn1", "job1", serde_json::json!({"v": 1}))
            .await
            .unwrap();
        store
            .save_raw(EntityKind::Screen, "s1", "kn1", "job2", serde_json::json!({"v": 2}))
            .await
            .unwrap();

        let latest = store.latest_job_id("kn1").await.unwrap();
        assert_eq!(latest.as_deref(), Some("job2"));

        let rows = store.query_raw(EntityKind::Screen, "kn1", None).await.unwrap();
        assert_eq!(rows, vec![serde_json::json!({"v": 2})]);
    }

    #[tokio::test]
    async fn delete_by_knowledge_scopes_to_job_id_when_given() {
        let store = InMemoryDocumentStore::new();
        store
            .save_raw(EntityKind::Task, "t1", "kn1", "job1", serde_json::json!({}))
            .await
            .unwrap();
        store
            .save_raw(EntityKind::Task, "t2", "kn1", "job2", serde_json::json!({}))
            .await
            .unwrap();

        let deleted = store
            .delete_by_knowledge(Some(EntityKind::Task), "kn1", Some("job1"))
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(store.get_entity::<Value>(EntityKind::Task, "t2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn idempotency_log_keeps_first_success() {
        let store = InMemoryDocumentStore::new();
        let first = ActivityExecutionLog {
            workflow_id: "wf1".into(),
            activity_name: "ingest".into(),
            input_hash: "h1".into(),
            output: serde_json::json!({"ok": true}),
            success: true,
            error: None,
            recorded_at: Utc::now(),
        };
        store.record(first.clone()).await.unwrap();

        let second = ActivityExecutionLog {
            output: serde_json::json!({"ok": "different"}),
            ..first.clone()
        };
        let recorded = store.record(second).await.unwrap();
        assert_eq!(recorded.output, first.output);
    }
}
