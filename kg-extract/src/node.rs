//! Wraps the extractor bank, linker, graph phase, and verification/
//! enrichment as the [`Node`]s the orchestrator's graph drives after
//! ingestion (spec §4.4–§4.8).

use std::sync::Arc;

use async_trait::async_trait;
use pipeline_core::node::{Node, NodeContext, NodeError, NodePartial};
use pipeline_core::progress::{Phase, ProgressEvent};
use pipeline_core::state::StateSnapshot;
use pipeline_core::utils::collections::new_extra_map;
use pipeline_types::action::Action;
use pipeline_types::business::BusinessFunction;
use pipeline_types::chunk::ContentChunk;
use pipeline_types::screen::Screen;
use pipeline_types::store::{DocumentStore, DocumentStoreExt, EntityKind};
use pipeline_types::task::Task;
use pipeline_types::transition::Transition;
use pipeline_types::user_flow::UserFlow;
use pipeline_types::workflow_entity::OperationalWorkflow;

use crate::common::{load_chunks, persist_entities, ExtractionScope};
use crate::graph::build_graph_report;
use crate::linker::{link, LinkSet};
use crate::llm::ChatClient;
use crate::verification::{enrich, verify, DiscrepancyStore};
use crate::{actions, business_functions, screens, tasks, transitions, user_flow, workflows};

fn extract_str(snapshot: &StateSnapshot, key: &'static str) -> Result<String, NodeError> {
    snapshot
        .extra
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or(NodeError::MissingInput { what: key })
}

fn scope_of(snapshot: &StateSnapshot) -> Result<ExtractionScope, NodeError> {
    Ok(ExtractionScope {
        website_id: snapshot.extra.get("website_id").and_then(|v| v.as_str()).unwrap_or("unknown").to_string(),
        knowledge_id: extract_str(snapshot, "knowledge_id")?,
        job_id: extract_str(snapshot, "job_id")?,
    })
}

/// Runs the six extractors against every chunk persisted for the job, then
/// the user-flow synthesizer, persisting everything it produces.
pub struct ExtractionNode {
    pub document_store: Arc<dyn DocumentStore>,
    pub llm: Arc<dyn ChatClient>,
}

#[async_trait]
impl Node for ExtractionNode {
    async fn run(&self, snapshot: StateSnapshot, ctx: NodeContext) -> Result<NodePartial, NodeError> {
        let scope = scope_of(&snapshot)?;
        ctx.emit_node("extraction", "loading chunks")?;

        let chunks: Vec<ContentChunk> = load_chunks(self.document_store.as_ref(), &scope.knowledge_id, &scope.job_id)
            .await
            .map_err(|err| NodeError::Provider { provider: "document_store", message: err.to_string() })?;

        let screens_outcome = screens::extract_screens(&chunks, &scope);
        let actions_outcome = actions::extract_actions(&chunks, &scope);
        let transitions_outcome = transitions::extract_transitions(&chunks, &screens_outcome.entities, &scope);

        // The three LLM-backed extractors are independent of each other and
        // of the rule-based ones above, so they run concurrently rather than
        // paying for three sequential round trips.
        let (tasks_outcome, business_functions_outcome, workflows_outcome) = futures_util::future::join3(
            tasks::extract_tasks(&chunks, &scope, self.llm.as_ref()),
            business_functions::extract_business_functions(&chunks, &scope, self.llm.as_ref()),
            workflows::extract_workflows(&chunks, &scope, self.llm.as_ref()),
        )
        .await;

        let user_flows = user_flow::synthesize_user_flows(
            &screens_outcome.entities,
            &transitions_outcome.entities,
            &workflows_outcome.entities,
            &scope,
        );

        let mut errors = Vec::new();
        errors.extend(screens_outcome.errors.iter().cloned());
        errors.extend(actions_outcome.errors.iter().cloned());
        errors.extend(transitions_outcome.errors.iter().cloned());
        errors.extend(tasks_outcome.errors.iter().cloned());
        errors.extend(business_functions_outcome.errors.iter().cloned());
        errors.extend(workflows_outcome.errors.iter().cloned());

        // Spec §7 error kind 5: zero screens from a non-video source is a
        // fatal workflow error, not a warning.
        if !chunks.is_empty() && screens_outcome.entities.is_empty() {
            return Err(NodeError::ValidationFailed(
                "zero screens extracted from a non-empty chunk set (spec §7 silent-success rule)".to_string(),
            ));
        }

        persist_entities(self.document_store.as_ref(), EntityKind::Screen, &screens_outcome.entities).await;
        persist_entities(self.document_store.as_ref(), EntityKind::Action, &actions_outcome.entities).await;
        persist_entities(self.document_store.as_ref(), EntityKind::Transition, &transitions_outcome.entities).await;
        persist_entities(self.document_store.as_ref(), EntityKind::Task, &tasks_outcome.entities).await;
        persist_entities(self.document_store.as_ref(), EntityKind::BusinessFunction, &business_functions_outcome.entities).await;
        persist_entities(self.document_store.as_ref(), EntityKind::OperationalWorkflow, &workflows_outcome.entities).await;
        persist_entities(self.document_store.as_ref(), EntityKind::UserFlow, &user_flows).await;

        let mut extra = new_extra_map();
        extra.insert("extraction_errors".to_string(), serde_json::json!(errors));

        let progress = ProgressEvent::new(Phase::Extraction, "extractor_bank")
            .with_counts(0, screens_outcome.entities.len() as u64, tasks_outcome.entities.len() as u64);

        Ok(NodePartial::new().with_progress(vec![progress]).with_extra(extra))
    }
}

async fn load_all(store: &dyn DocumentStore, knowledge_id: &str, job_id: &str) -> LinkSet {
    let job_id = Some(job_id);
    LinkSet {
        screens: store.query_entities::<Screen>(EntityKind::Screen, knowledge_id, job_id).await.unwrap_or_default(),
        tasks: store.query_entities::<Task>(EntityKind::Task, knowledge_id, job_id).await.unwrap_or_default(),
        actions: store.query_entities::<Action>(EntityKind::Action, knowledge_id, job_id).await.unwrap_or_default(),
        transitions: store.query_entities::<Transition>(EntityKind::Transition, knowledge_id, job_id).await.unwrap_or_default(),
        business_functions: store
            .query_entities::<BusinessFunction>(EntityKind::BusinessFunction, knowledge_id, job_id)
            .await
            .unwrap_or_default(),
        workflows: store
            .query_entities::<OperationalWorkflow>(EntityKind::OperationalWorkflow, knowledge_id, job_id)
            .await
            .unwrap_or_default(),
    }
}

/// The Post-Extraction Linker as a phase node (spec §4.5): loads every
/// entity for the job once, links, and re-saves everything the passes
/// touched.
pub struct LinkerNode {
    pub document_store: Arc<dyn DocumentStore>,
}

#[async_trait]
impl Node for LinkerNode {
    async fn run(&self, snapshot: StateSnapshot, ctx: NodeContext) -> Result<NodePartial, NodeError> {
        let scope = scope_of(&snapshot)?;
        ctx.emit_node("post_extraction_linking", "loading entities")?;

        let mut set = load_all(self.document_store.as_ref(), &scope.knowledge_id, &scope.job_id).await;
        link(&mut set);

        persist_entities(self.document_store.as_ref(), EntityKind::Screen, &set.screens).await;
        persist_entities(self.document_store.as_ref(), EntityKind::Task, &set.tasks).await;
        persist_entities(self.document_store.as_ref(), EntityKind::Action, &set.actions).await;
        persist_entities(self.document_store.as_ref(), EntityKind::Transition, &set.transitions).await;
        persist_entities(self.document_store.as_ref(), EntityKind::BusinessFunction, &set.business_functions).await;
        persist_entities(self.document_store.as_ref(), EntityKind::OperationalWorkflow, &set.workflows).await;

        let progress = ProgressEvent::new(Phase::PostExtractionLinking, "link_passes");
        Ok(NodePartial::new().with_progress(vec![progress]))
    }
}

/// The Graph Phase (spec §4.6): counts and referential-integrity check,
/// non-fatal.
pub struct GraphPhaseNode {
    pub document_store: Arc<dyn DocumentStore>,
}

#[async_trait]
impl Node for GraphPhaseNode {
    async fn run(&self, snapshot: StateSnapshot, ctx: NodeContext) -> Result<NodePartial, NodeError> {
        let scope = scope_of(&snapshot)?;
        ctx.emit_node("graph_phase", "counting entities")?;

        let set = load_all(self.document_store.as_ref(), &scope.knowledge_id, &scope.job_id).await;
        let user_flows = self
            .document_store
            .query_entities::<UserFlow>(EntityKind::UserFlow, &scope.knowledge_id, Some(&scope.job_id))
            .await
            .unwrap_or_default();

        let report = build_graph_report(
            &set.screens,
            &set.tasks,
            &set.actions,
            &set.transitions,
            &set.business_functions,
            &set.workflows,
            &user_flows,
        );

        let mut extra = new_extra_map();
        extra.insert("graph_discrepancies".to_string(), serde_json::json!(report.discrepancies));
        extra.insert("graph_node_count".to_string(), serde_json::json!(report.counts.node_count()));
        extra.insert("graph_edge_count".to_string(), serde_json::json!(report.counts.edge_count()));

        let progress = ProgressEvent::new(Phase::GraphPhase, "graph_validation")
            .with_counts(0, report.counts.screens as u64, report.counts.tasks as u64);

        Ok(NodePartial::new().with_progress(vec![progress]).with_extra(extra))
    }
}

/// Verification & Enrichment (spec §4.8). There is no distinct `Enrichment`
/// [`Phase`] variant — both steps run under `Phase::Verification`, recorded
/// in `DESIGN.md`.
pub struct VerificationNode {
    pub document_store: Arc<dyn DocumentStore>,
    pub discrepancy_store: Option<Arc<dyn DiscrepancyStore>>,
}

#[async_trait]
impl Node for VerificationNode {
    async fn run(&self, snapshot: StateSnapshot, ctx: NodeContext) -> Result<NodePartial, NodeError> {
        let scope = scope_of(&snapshot)?;
        ctx.emit_node("verification", "re-querying extracted entities")?;

        let set = load_all(self.document_store.as_ref(), &scope.knowledge_id, &scope.job_id).await;
        let screen_ids: Vec<String> = set.screens.iter().map(|s| s.screen_id().to_string()).collect();
        let task_ids: Vec<String> = set.tasks.iter().map(|t| t.task_id().to_string()).collect();

        let report = verify(self.document_store.as_ref(), &scope.knowledge_id, &screen_ids, &task_ids)
            .await
            .map_err(|err| NodeError::Provider { provider: "document_store", message: err.to_string() })?;

        let enrichment = enrich(
            self.document_store.as_ref(),
            self.discrepancy_store.as_deref(),
            &report,
            &scope.knowledge_id,
            &scope.job_id,
        )
        .await;

        let mut extra = new_extra_map();
        extra.insert("discrepancy_ids".to_string(), serde_json::json!(report.discrepancy_ids));
        extra.insert("enrichments_applied".to_string(), serde_json::json!(enrichment.applied));
        extra.insert("enriched_entity_ids".to_string(), serde_json::json!(enrichment.updated_entity_ids));

        let progress = ProgressEvent::new(Phase::Verification, "verify_and_enrich");
        Ok(NodePartial::new().with_progress(vec![progress]).with_extra(extra))
    }
}
