//! Superstep scheduling: version-gated node skipping with bounded concurrency.

use std::sync::Arc;

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::instrument;

use crate::event_bus::EventEmitter;
use crate::node::{Node, NodeContext, NodeError, NodePartial};
use crate::state::StateSnapshot;
use crate::types::PhaseKind;

/// Channel versions a node observed the last time it ran, keyed by the
/// node's encoded identity, then by channel name (`"progress"`, `"extra"`).
/// Used to decide whether a node is due to run again in a later superstep.
#[derive(Clone, Debug, Default)]
pub struct SchedulerState {
    pub versions_seen: FxHashMap<String, FxHashMap<String, u64>>,
}

/// Outcome of running one superstep over a frontier of nodes.
#[derive(Debug, Clone)]
pub struct StepRunResult {
    /// Nodes that executed this superstep, in frontier order.
    pub ran_nodes: Vec<PhaseKind>,
    /// Nodes skipped because nothing relevant changed, or because they were
    /// the virtual `End` node.
    pub skipped_nodes: Vec<PhaseKind>,
    /// Partial updates produced by the nodes that ran. Order is not
    /// guaranteed to match `ran_nodes` since nodes execute concurrently.
    pub outputs: Vec<(PhaseKind, NodePartial)>,
}

#[derive(Debug, Error, Diagnostic)]
pub enum SchedulerError {
    #[error("node {kind:?} failed at step {step}: {source}")]
    #[diagnostic(code(pipeline_core::scheduler::node_run))]
    NodeRun {
        kind: PhaseKind,
        step: u64,
        #[source]
        source: NodeError,
    },

    #[error("node task join error: {0}")]
    #[diagnostic(code(pipeline_core::scheduler::join))]
    Join(#[from] JoinError),
}

/// Runs the frontier of a single superstep with bounded concurrency,
/// skipping nodes whose observed channels haven't advanced since their last
/// run.
#[derive(Clone, Debug)]
pub struct Scheduler {
    pub(crate) concurrency_limit: usize,
}

impl Scheduler {
    /// Create a scheduler that runs at most `concurrency_limit` nodes at
    /// once within a superstep.
    #[must_use]
    pub fn new(concurrency_limit: usize) -> Self {
        Self {
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    /// Whether a node with the given identity should run given the current
    /// snapshot, based on what it last observed in `state`.
    #[must_use]
    pub fn should_run(&self, state: &SchedulerState, id: &str, snapshot: &StateSnapshot) -> bool {
        match state.versions_seen.get(id) {
            None => true,
            Some(seen) => {
                let progress_seen = seen.get("progress").copied().unwrap_or(0);
                let extra_seen = seen.get("extra").copied().unwrap_or(0);
                u64::from(snapshot.progress_version) != progress_seen
                    || u64::from(snapshot.extra_version) != extra_seen
            }
        }
    }

    /// Record the channel versions a node observed for this run.
    pub fn record_seen(&self, state: &mut SchedulerState, id: &str, snapshot: &StateSnapshot) {
        let mut seen = FxHashMap::default();
        seen.insert("progress".to_string(), u64::from(snapshot.progress_version));
        seen.insert("extra".to_string(), u64::from(snapshot.extra_version));
        state.versions_seen.insert(id.to_string(), seen);
    }

    /// Run every node in `frontier` that is due to run, bounded by this
    /// scheduler's concurrency limit, and collect their partial updates.
    ///
    /// `PhaseKind::End` is always skipped since it has no associated node.
    #[instrument(skip(self, state, nodes, snapshot, emitter), fields(step, frontier_len = frontier.len()))]
    pub async fn superstep(
        &self,
        state: &mut SchedulerState,
        nodes: &FxHashMap<PhaseKind, Arc<dyn Node>>,
        frontier: Vec<PhaseKind>,
        snapshot: StateSnapshot,
        step: u64,
        emitter: Arc<dyn EventEmitter>,
    ) -> Result<StepRunResult, SchedulerError> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let mut ran_nodes = Vec::new();
        let mut skipped_nodes = Vec::new();
        let mut handles = Vec::new();

        for kind in &frontier {
            if kind.is_end() {
                skipped_nodes.push(kind.clone());
                continue;
            }

            let id = kind.encode();
            if !self.should_run(state, &id, &snapshot) {
                skipped_nodes.push(kind.clone());
                continue;
            }

            let Some(node) = nodes.get(kind).cloned() else {
                skipped_nodes.push(kind.clone());
                continue;
            };

            self.record_seen(state, &id, &snapshot);
            ran_nodes.push(kind.clone());

            let permit = semaphore.clone();
            let snapshot = snapshot.clone();
            let emitter = emitter.clone();
            let kind = kind.clone();
            let node_id = id.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit.acquire_owned().await.expect("semaphore not closed");
                let ctx = NodeContext {
                    node_id,
                    step,
                    event_emitter: emitter,
                };
                let result = node.run(snapshot, ctx).await;
                (kind, result)
            });
            handles.push(handle);
        }

        let mut outputs = Vec::with_capacity(handles.len());
        for handle in handles {
            let (kind, result) = handle.await?;
            match result {
                Ok(partial) => outputs.push((kind, partial)),
                Err(source) => {
                    return Err(SchedulerError::NodeRun { kind, step, source });
                }
            }
        }

        Ok(StepRunResult {
            ran_nodes,
            skipped_nodes,
            outputs,
        })
    }
}
