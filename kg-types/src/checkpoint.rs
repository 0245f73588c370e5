//! Checkpoint store for activities that iterate over large sets (spec §4.9):
//! a `Checkpoint{resume_token}` is emitted after each batch; on replay the
//! activity skips items at or before `resume_token`.
//!
//! This is distinct from `pipeline_core::runtimes::checkpointer`'s
//! `Checkpoint`, which persists the graph engine's own replay state
//! (`PipelineState`, frontier, versions_seen). This one tracks a single
//! activity's progress through a batch of domain items.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub workflow_id: String,
    pub phase: String,
    pub items_processed: Vec<String>,
    pub resume_token: String,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(workflow_id: impl Into<String>, phase: impl Into<String>, resume_token: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            phase: phase.into(),
            items_processed: Vec::new(),
            resume_token: resume_token.into(),
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait IterationCheckpointStore: Send + Sync {
    async fn save(&self, checkpoint: Checkpoint) -> Result<(), StoreError>;

    /// Latest checkpoint for `(workflow_id, phase)`, if any, used to resume
    /// a batch at the item after `resume_token`.
    async fn latest(&self, workflow_id: &str, phase: &str) -> Result<Option<Checkpoint>, StoreError>;
}
