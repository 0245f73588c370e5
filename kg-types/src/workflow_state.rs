//! Persisted orchestration snapshot. Distinct from the [`Envelope`]-bearing
//! domain entities: one `WorkflowState` row exists per `job_id` and it is
//! mutated in place as the job progresses, whereas domain entities are
//! immutable after creation (spec §3 Lifecycle).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub workflow_id: String,
    pub job_id: String,
    pub knowledge_id: String,
    pub status: JobStatus,
    pub phase: String,
    pub current_activity: String,
    pub progress: Value,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub metadata: Value,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowState {
    pub fn new(workflow_id: impl Into<String>, job_id: impl Into<String>, knowledge_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            job_id: job_id.into(),
            knowledge_id: knowledge_id.into(),
            status: JobStatus::Running,
            phase: String::new(),
            current_activity: String::new(),
            progress: Value::Null,
            errors: Vec::new(),
            metadata: Value::Null,
            updated_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}
