//! pipeline-types: the data model and persistence contracts for the
//! knowledge-extraction pipeline.
//!
//! This crate knows nothing about how entities are extracted or ingested —
//! it defines what an entity *is* (envelope, entity structs, invariants)
//! and how it is durably stored (`DocumentStore`, the idempotency log, the
//! iteration checkpoint store, the ingestion dedup store). Ingestion and
//! extraction crates depend on this one; it depends on nothing upstream of
//! it in this workspace.

pub mod action;
pub mod business;
pub mod checkpoint;
pub mod chunk;
pub mod config;
pub mod envelope;
pub mod idempotency;
pub mod ingestion_meta;
pub mod invariants;
pub mod memory;
pub mod screen;
pub mod sqlite;
pub mod store;
pub mod task;
pub mod transition;
pub mod user_flow;
pub mod workflow_entity;
pub mod workflow_state;

pub use action::Action;
pub use business::{BusinessFeature, BusinessFunction};
pub use checkpoint::Checkpoint;
pub use chunk::{ChunkKind, ChunkType, ContentChunk, IngestionResult};
pub use envelope::{Entity, Envelope};
pub use idempotency::ActivityExecutionLog;
pub use ingestion_meta::IngestionMetadata;
pub use memory::InMemoryDocumentStore;
pub use screen::{Screen, ScreenContentType, StateSignature};
pub use sqlite::SqliteDocumentStore;
pub use store::{DocumentStore, DocumentStoreExt, EntityKind, StoreError};
pub use task::{IoSpec, IteratorSpec, IteratorType, Task, TaskStep};
pub use transition::Transition;
pub use user_flow::UserFlow;
pub use workflow_entity::{OperationalWorkflow, WorkflowStep};
pub use workflow_state::{JobStatus, WorkflowState};
