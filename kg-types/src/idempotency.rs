//! Activity execution log used for idempotent replay (spec §3, §4.9): exactly
//! one success is recorded per `(workflow_id, activity_name, input_hash)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityExecutionLog {
    pub workflow_id: String,
    pub activity_name: String,
    pub input_hash: String,
    pub output: Value,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Hashes an activity's input the same way everywhere so two callers with
/// equal input always land on the same log row.
pub fn hash_activity_input(input: &Value) -> String {
    let canonical = serde_json::to_vec(input).unwrap_or_default();
    let digest = Sha256::digest(&canonical);
    hex::encode(digest)
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Idempotency log contract. An activity calls [`lookup`](IdempotencyLog::lookup)
/// before doing work; on a hit with `success = true` it replays `output`
/// without re-executing.
#[async_trait]
pub trait IdempotencyLog: Send + Sync {
    async fn lookup(
        &self,
        workflow_id: &str,
        activity_name: &str,
        input_hash: &str,
    ) -> Result<Option<ActivityExecutionLog>, StoreError>;

    /// Records the outcome. Implementations must reject a second `success =
    /// true` write for the same key (spec §3 invariant 5) by treating the
    /// first successful row as authoritative and returning it unchanged.
    async fn record(&self, entry: ActivityExecutionLog) -> Result<ActivityExecutionLog, StoreError>;
}
