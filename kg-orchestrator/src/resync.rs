//! Resync: deleting a `knowledge_id`'s prior entities before a new job
//! writes its own (spec §3 invariant 3, §7).

use pipeline_types::store::DocumentStore;

/// Deletes every entity recorded under `knowledge_id` for its prior
/// `job_id`, if one exists, before the new job writes anything. Logs
/// informationally when there was nothing to delete, and with the count
/// when there was (spec §7: "a resync that finds no existing knowledge logs
/// an informational message and proceeds; a resync that deletes existing
/// knowledge logs the count").
pub async fn resync_knowledge(
    store: &dyn DocumentStore,
    knowledge_id: &str,
    new_job_id: &str,
) -> Result<Option<u64>, pipeline_types::store::StoreError> {
    let Some(prior_job_id) = store.latest_job_id(knowledge_id).await? else {
        tracing::info!(knowledge_id, "resync: no existing knowledge found, proceeding");
        return Ok(None);
    };

    if prior_job_id == new_job_id {
        tracing::info!(knowledge_id, job_id = new_job_id, "resync: job id unchanged, skipping delete");
        return Ok(None);
    }

    let deleted = store.delete_by_knowledge(None, knowledge_id, Some(&prior_job_id)).await?;
    tracing::info!(knowledge_id, prior_job_id, deleted, "resync: deleted prior job's entities");
    Ok(Some(deleted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_types::envelope::Envelope;
    use pipeline_types::memory::InMemoryDocumentStore;
    use pipeline_types::screen::{Screen, ScreenContentType, StateSignature};
    use pipeline_types::store::{DocumentStoreExt, EntityKind};

    fn screen(id: &str, knowledge_id: &str, job_id: &str) -> Screen {
        Screen {
            envelope: Envelope::new(id, knowledge_id, job_id, "unknown"),
            name: format!("Screen {id}"),
            url_patterns: Vec::new(),
            state_signature: StateSignature::default(),
            ui_elements: Vec::new(),
            action_ids: Vec::new(),
            task_ids: Vec::new(),
            outgoing_transitions: Vec::new(),
            incoming_transitions: Vec::new(),
            business_function_ids: Vec::new(),
            user_flow_ids: Vec::new(),
            workflow_ids: Vec::new(),
            content_type: ScreenContentType::Documentation,
            is_actionable: false,
        }
    }

    #[tokio::test]
    async fn resync_on_empty_knowledge_deletes_nothing() {
        let store = InMemoryDocumentStore::new();
        let deleted = resync_knowledge(&store, "kg_1", "job_1").await.unwrap();
        assert_eq!(deleted, None);
    }

    #[tokio::test]
    async fn resync_deletes_prior_job_and_reports_count() {
        let store = InMemoryDocumentStore::new();
        store.save_entity(EntityKind::Screen, &screen("s1", "kg_1", "job_1")).await.unwrap();
        store.save_entity(EntityKind::Screen, &screen("s2", "kg_1", "job_1")).await.unwrap();

        let deleted = resync_knowledge(&store, "kg_1", "job_2").await.unwrap();
        assert_eq!(deleted, Some(2));

        let remaining = store.query_entities::<Screen>(EntityKind::Screen, "kg_1", Some("job_1")).await.unwrap();
        assert!(remaining.is_empty());
    }
}
