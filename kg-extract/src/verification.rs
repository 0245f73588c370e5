//! Verification & Enrichment (spec §4.8).
//!
//! Verification re-queries each extracted screen and task by id and records
//! a discrepancy for each missing entity. Enrichment applies corrections
//! from the discrepancy list, degrading to a no-op when no discrepancy
//! store is configured (spec §7 error kind 4: dependency absent).

use async_trait::async_trait;
use pipeline_types::store::{DocumentStore, DocumentStoreExt, EntityKind, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("store error during verification: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub discrepancy_ids: Vec<String>,
}

/// Re-queries each id in `screen_ids`/`task_ids` and records a discrepancy
/// for every one not found under `knowledge_id` (spec §4.8 Verification).
pub async fn verify(
    store: &dyn DocumentStore,
    knowledge_id: &str,
    screen_ids: &[String],
    task_ids: &[String],
) -> Result<VerificationReport, VerificationError> {
    let mut discrepancy_ids = Vec::new();

    for screen_id in screen_ids {
        if store.get_raw(EntityKind::Screen, screen_id).await?.is_none() {
            discrepancy_ids.push(format!("screen:{screen_id}"));
        }
    }
    for task_id in task_ids {
        if store.get_raw(EntityKind::Task, task_id).await?.is_none() {
            discrepancy_ids.push(format!("task:{task_id}"));
        }
    }

    let _ = knowledge_id;
    Ok(VerificationReport { discrepancy_ids })
}

#[derive(Debug, Clone, Default)]
pub struct EnrichmentReport {
    pub applied: usize,
    pub updated_entity_ids: Vec<String>,
}

/// A correction a [`DiscrepancyStore`] can propose for a discrepancy
/// discovered during verification.
#[derive(Debug, Clone)]
pub struct Correction {
    pub entity_kind: EntityKind,
    pub entity_id: String,
    pub patch: serde_json::Value,
}

/// Abstracts the optional system that knows how to correct a discrepancy
/// (spec §4.8 Enrichment: "applies corrections (in this spec, a no-op when
/// the discrepancy store is absent)"). A real implementation might consult
/// an audit log or a human review queue; no in-memory double ships a
/// meaningful one because "absent" is itself a valid, tested configuration.
#[async_trait]
pub trait DiscrepancyStore: Send + Sync {
    async fn corrections_for(&self, discrepancy_ids: &[String]) -> Vec<Correction>;
}

/// Applies whatever corrections `discrepancy_store` proposes for
/// `report.discrepancy_ids`. Degrades gracefully to an all-zero report when
/// `discrepancy_store` is `None` (spec §4.8 Enrichment).
pub async fn enrich(
    store: &dyn DocumentStore,
    discrepancy_store: Option<&dyn DiscrepancyStore>,
    report: &VerificationReport,
    knowledge_id: &str,
    job_id: &str,
) -> EnrichmentReport {
    let Some(discrepancy_store) = discrepancy_store else {
        return EnrichmentReport::default();
    };
    if report.discrepancy_ids.is_empty() {
        return EnrichmentReport::default();
    }

    let corrections = discrepancy_store.corrections_for(&report.discrepancy_ids).await;
    let mut applied = 0;
    let mut updated_entity_ids = Vec::new();

    for correction in corrections {
        if store
            .save_raw(correction.entity_kind, &correction.entity_id, knowledge_id, job_id, correction.patch)
            .await
            .is_ok()
        {
            applied += 1;
            updated_entity_ids.push(correction.entity_id);
        }
    }

    EnrichmentReport { applied, updated_entity_ids }
}

pub mod doubles {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    /// Serves canned corrections keyed by discrepancy id.
    pub struct InMemoryDiscrepancyStore {
        corrections: RwLock<HashMap<String, Correction>>,
    }

    impl InMemoryDiscrepancyStore {
        pub fn new() -> Self {
            Self { corrections: RwLock::new(HashMap::new()) }
        }

        pub async fn seed(&self, discrepancy_id: impl Into<String>, correction: Correction) {
            self.corrections.write().await.insert(discrepancy_id.into(), correction);
        }
    }

    impl Default for InMemoryDiscrepancyStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl DiscrepancyStore for InMemoryDiscrepancyStore {
        async fn corrections_for(&self, discrepancy_ids: &[String]) -> Vec<Correction> {
            let corrections = self.corrections.read().await;
            discrepancy_ids.iter().filter_map(|id| corrections.get(id).cloned()).collect()
        }
    }
}

impl Clone for Correction {
    fn clone(&self) -> Self {
        Self { entity_kind: self.entity_kind, entity_id: self.entity_id.clone(), patch: self.patch.clone() }
    }
}
