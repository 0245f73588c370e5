//! The document store: a generic, kind-tagged persistence surface every
//! domain entity shares, plus typed ergonomics layered on top so callers
//! rarely touch raw [`serde_json::Value`].
//!
//! Generalizes the pattern in `pipeline_core::runtimes::checkpointer_sqlite`
//! (one SQLite-backed store, serde-json payloads, explicit `Persisted*`
//! conversion structs) from the graph engine's own replay state to the
//! knowledge-extraction domain's entities. Kept as a single object-safe
//! trait — `Arc<dyn DocumentStore>` is what phase activities hold — with a
//! blanket extension trait for the generic typed helpers, since generic
//! trait methods would otherwise make the trait impossible to use as `dyn`.

use async_trait::async_trait;
use miette::Diagnostic;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::envelope::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    ContentChunk,
    IngestionResult,
    Screen,
    Task,
    Action,
    Transition,
    BusinessFunction,
    BusinessFeature,
    OperationalWorkflow,
    UserFlow,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        EntityKind::ContentChunk,
        EntityKind::IngestionResult,
        EntityKind::Screen,
        EntityKind::Task,
        EntityKind::Action,
        EntityKind::Transition,
        EntityKind::BusinessFunction,
        EntityKind::BusinessFeature,
        EntityKind::OperationalWorkflow,
        EntityKind::UserFlow,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::ContentChunk => "content_chunks",
            EntityKind::IngestionResult => "ingestion_results",
            EntityKind::Screen => "screens",
            EntityKind::Task => "tasks",
            EntityKind::Action => "actions",
            EntityKind::Transition => "transitions",
            EntityKind::BusinessFunction => "business_functions",
            EntityKind::BusinessFeature => "business_features",
            EntityKind::OperationalWorkflow => "operational_workflows",
            EntityKind::UserFlow => "user_flows",
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("entity serialization failed: {source}")]
    #[diagnostic(code(pipeline_types::store::serde))]
    Serde {
        #[source]
        source: serde_json::Error,
    },

    #[error("sqlite backend error: {0}")]
    #[diagnostic(
        code(pipeline_types::store::sqlite),
        help("Check the database file path and that migrations have run.")
    )]
    Sqlite(String),

    #[error("entity not found: kind={kind:?} entity_id={entity_id}")]
    #[diagnostic(code(pipeline_types::store::not_found))]
    NotFound { kind: EntityKind, entity_id: String },
}

impl From<serde_json::Error> for StoreError {
    fn from(source: serde_json::Error) -> Self {
        StoreError::Serde { source }
    }
}

/// Result of a bulk save: entities are saved in order and a single failure
/// does not abort the remaining entities, mirroring the ingestion router's
/// partial-success policy (spec §4.2 Failure policy).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSaveReport {
    pub saved: usize,
    pub failed: usize,
    pub total: usize,
}

/// Object-safe core: every method operates on `(kind, entity_id, ...)` and
/// raw JSON payloads. Implemented once per backend (sqlite, in-memory).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save_raw(
        &self,
        kind: EntityKind,
        entity_id: &str,
        knowledge_id: &str,
        job_id: &str,
        payload: Value,
    ) -> Result<(), StoreError>;

    async fn get_raw(&self, kind: EntityKind, entity_id: &str) -> Result<Option<Value>, StoreError>;

    /// Entities for `knowledge_id`. When `job_id` is `None`, returns entities
    /// belonging to the latest `job_id` for that `knowledge_id` (spec §3:
    /// "Queries by knowledge_id without job_id return the latest job's
    /// entities").
    async fn query_raw(
        &self,
        kind: EntityKind,
        knowledge_id: &str,
        job_id: Option<&str>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Deletes all entities of `kind` (or every kind, when `None`) for
    /// `knowledge_id`, optionally scoped to one `job_id`. Used by resync
    /// (delete prior job's entities before writing the new job's) and
    /// explicit admin delete (spec §3 Lifecycle).
    async fn delete_by_knowledge(
        &self,
        kind: Option<EntityKind>,
        knowledge_id: &str,
        job_id: Option<&str>,
    ) -> Result<u64, StoreError>;

    /// The most recently created `job_id` with any entity recorded for
    /// `knowledge_id`, or `None` if the knowledge_id has never been written.
    async fn latest_job_id(&self, knowledge_id: &str) -> Result<Option<String>, StoreError>;
}

/// Typed convenience layer over [`DocumentStore`]. Blanket-implemented for
/// every `DocumentStore`, including `dyn DocumentStore`, so
/// `Arc<dyn DocumentStore>` callers get `save_entity`/`query_entities` for
/// free without the core trait losing object safety.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    async fn save_entity<T>(&self, kind: EntityKind, entity: &T) -> Result<(), StoreError>
    where
        T: Entity + Serialize + Sync,
    {
        let payload = serde_json::to_value(entity)?;
        self.save_raw(
            kind,
            entity.entity_id(),
            entity.knowledge_id(),
            entity.job_id(),
            payload,
        )
        .await
    }

    /// Saves entities in order, tolerating individual failures (spec §4.2
    /// partial-success policy generalized to persistence).
    async fn save_entities<T>(&self, kind: EntityKind, entities: &[T]) -> BulkSaveReport
    where
        T: Entity + Serialize + Sync,
    {
        let mut report = BulkSaveReport {
            total: entities.len(),
            ..Default::default()
        };
        for entity in entities {
            match self.save_entity(kind, entity).await {
                Ok(()) => report.saved += 1,
                Err(err) => {
                    tracing::warn!(kind = ?kind, entity_id = entity.entity_id(), error = %err, "save_entity failed");
                    report.failed += 1;
                }
            }
        }
        report
    }

    async fn get_entity<T>(&self, kind: EntityKind, entity_id: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        match self.get_raw(kind, entity_id).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn query_entities<T>(
        &self,
        kind: EntityKind,
        knowledge_id: &str,
        job_id: Option<&str>,
    ) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let raw = self.query_raw(kind, knowledge_id, job_id).await?;
        raw.into_iter()
            .map(|v| serde_json::from_value(v).map_err(StoreError::from))
            .collect()
    }
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {}
