//! The workflow orchestrator driver (spec §4.1): validates input, seeds a
//! session, and steps the compiled graph to completion while honoring
//! pause/resume/cancel at each phase boundary.

use std::sync::Arc;

use pipeline_core::channels::Channel;
use pipeline_core::control::WorkflowControl;
use pipeline_core::runtimes::{AppRunner, CheckpointerType, SessionInit, StepOptions, StepResult};
use pipeline_core::state::PipelineState;
use pipeline_types::store::DocumentStore;
use serde_json::json;

use crate::determinism::derive_ingestion_id;
use crate::error::OrchestratorError;
use crate::graph::build_pipeline_app;
use crate::input::{derive_website_id, WorkflowInput};
use crate::progress::WorkflowProgress;
use crate::resync::resync_knowledge;

/// One knowledge job's collaborators, wired into a fresh [`AppRunner`] per
/// workflow run. Building the [`pipeline_core::app::App`] requires owning the
/// six `Node` impls, so the orchestrator takes them rather than the
/// already-compiled app: a new job gets a fresh session on a new runner,
/// consistent with one `App`/`AppRunner` pair per execution the graph module
/// documents.
pub struct Orchestrator {
    document_store: Arc<dyn DocumentStore>,
    control: WorkflowControl,
    checkpointer_type: CheckpointerType,
}

/// Number of progress events a session accumulates before the orchestrator
/// compacts its history — a bounded-growth stand-in for a durable
/// substrate's continue-as-new (spec §4.1, §5). `pipeline-core` has no
/// external event history to restart against; this crate's sessions run
/// in-process, so unbounded history only matters as memory growth, not the
/// replay-cost problem continue-as-new solves upstream. Decision recorded in
/// `DESIGN.md`.
pub const PROGRESS_HISTORY_LIMIT: usize = 500;

impl Orchestrator {
    #[must_use]
    pub fn new(document_store: Arc<dyn DocumentStore>, checkpointer_type: CheckpointerType) -> Self {
        Self { document_store, control: WorkflowControl::new(), checkpointer_type }
    }

    /// The shared pause/resume/cancel handle an external caller (an admin
    /// endpoint, a signal handler) uses to steer a running workflow.
    #[must_use]
    pub fn control(&self) -> WorkflowControl {
        self.control.clone()
    }

    /// Runs one knowledge job end to end: validate input, resync prior
    /// entities for the same `knowledge_id`, seed the session, then step the
    /// compiled graph to completion, checking pause/cancel between every
    /// phase (spec §4.1 algorithm).
    pub async fn run(
        &self,
        input: WorkflowInput,
        ingestion: pipeline_ingestion::node::IngestionNode,
        extraction: pipeline_extract::ExtractionNode,
        linker: pipeline_extract::LinkerNode,
        graph_phase: pipeline_extract::GraphPhaseNode,
        url_exploration: pipeline_ingestion::UrlExplorationNode,
        verification: pipeline_extract::VerificationNode,
    ) -> Result<WorkflowProgress, OrchestratorError> {
        let sources = input.validate()?;
        let website_id = derive_website_id(&sources);

        resync_knowledge(self.document_store.as_ref(), &input.knowledge_id, &input.job_id).await?;

        let ingestion_ids: Vec<String> = sources
            .iter()
            .map(|s| derive_ingestion_id(&input.job_id, &s.url_or_path, &input.job_id))
            .collect();

        let sources_json: Vec<_> = sources
            .iter()
            .zip(&ingestion_ids)
            .map(|(s, ingestion_id)| {
                json!({
                    "url_or_path": s.url_or_path,
                    "name": s.name,
                    "source_type": s.source_type,
                    "ingestion_id": ingestion_id,
                })
            })
            .collect();

        let initial_state = PipelineState::builder()
            .with_extra("knowledge_id", json!(input.knowledge_id))
            .with_extra("job_id", json!(input.job_id))
            .with_extra("website_id", json!(website_id))
            .with_extra("sources", json!(sources_json))
            .with_extra("options", json!(input.options))
            .build();

        let app = build_pipeline_app(ingestion, extraction, linker, graph_phase, url_exploration, verification);
        let mut runner = AppRunner::new(app, self.checkpointer_type.clone()).await;

        let session_id = format!("{}:{}", input.knowledge_id, input.job_id);
        let init = runner.create_session(session_id.clone(), initial_state).await?;
        if matches!(init, SessionInit::Resumed { .. }) {
            tracing::info!(session_id = %session_id, "resumed session from checkpoint");
        }

        loop {
            self.control.check_pause_or_cancel().await?;

            let result = runner.run_step(&session_id, StepOptions::default()).await?;
            let completed = match result {
                StepResult::Completed(report) => report.completed,
                StepResult::Paused(_) => {
                    // No interrupt_before/after is ever set, so this is
                    // unreachable in practice; treat it like "not done yet".
                    false
                }
            };

            self.compact_progress_history(&mut runner, &session_id);

            if completed {
                break;
            }
        }

        let snapshot = runner
            .get_session(&session_id)
            .map(|session| session.state.snapshot())
            .ok_or_else(|| OrchestratorError::JobNotFound { job_id: input.job_id.clone() })?;

        Ok(WorkflowProgress::from_snapshot(&snapshot))
    }

    /// Truncates a session's accumulated progress events once they exceed
    /// [`PROGRESS_HISTORY_LIMIT`], keeping only the most recent ones —
    /// bounds this orchestrator's in-process memory growth on very long
    /// jobs (see the `continue-as-new` note on this type).
    fn compact_progress_history(&self, runner: &mut AppRunner, session_id: &str) {
        let Some(session) = runner.get_session_mut(session_id) else { return };
        let progress = session.state.progress.get_mut();
        if progress.len() <= PROGRESS_HISTORY_LIMIT {
            return;
        }
        let dropped = progress.len() - PROGRESS_HISTORY_LIMIT;
        *progress = progress.split_off(dropped);
        tracing::info!(session_id = %session_id, dropped, "compacted progress history");
    }
}
