//! Deterministic id derivation shared by the orchestrator and its resync
//! logic (spec §4.1, §6).

use sha2::{Digest, Sha256};

/// `sha256(workflow_id + ":" + source_url + ":" + job_id)[0..32]` — the same
/// ingestion run, re-submitted with the same job id, always produces the
/// same ingestion id (spec §4.1, §6).
pub fn derive_ingestion_id(workflow_id: &str, source_url: &str, job_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(workflow_id.as_bytes());
    hasher.update(b":");
    hasher.update(source_url.as_bytes());
    hasher.update(b":");
    hasher.update(job_id.as_bytes());
    let digest = hasher.finalize();
    let hex = format!("{digest:x}");
    hex[..32].to_string()
}
