//! Folds a job's accumulated [`ProgressEvent`]s into the `get_progress`
//! query response (spec §6).

use pipeline_core::channels::errors::ErrorEvent;
use pipeline_core::progress::{Phase, ProgressEvent};
use pipeline_core::state::PipelineSnapshot;
use serde::{Deserialize, Serialize};

/// Response shape for `get_progress` (spec §6): the latest phase/activity
/// plus running totals accumulated across every phase so far.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowProgress {
    pub phase: Option<Phase>,
    pub current_activity: String,
    pub items_processed: u64,
    pub total_items: Option<u64>,
    pub sources_ingested: u64,
    pub screens_extracted: u64,
    pub tasks_extracted: u64,
    pub errors: Vec<ErrorEvent>,
    pub elapsed_time_ms: u64,
}

impl WorkflowProgress {
    /// Folds every [`ProgressEvent`] recorded on the snapshot's progress
    /// channel. Phase/activity/elapsed come from the most recent event.
    /// Counters are taken as the maximum seen rather than summed: each node
    /// reports the running total observed in the store at the time it ran
    /// (e.g. the Graph Phase re-counts every screen persisted, not just the
    /// ones it added), so summing across phases would double-count.
    #[must_use]
    pub fn from_snapshot(snapshot: &PipelineSnapshot) -> Self {
        let mut progress = WorkflowProgress {
            phase: None,
            current_activity: String::new(),
            items_processed: 0,
            total_items: None,
            sources_ingested: 0,
            screens_extracted: 0,
            tasks_extracted: 0,
            errors: snapshot.errors.clone(),
            elapsed_time_ms: 0,
        };

        for event in &snapshot.progress {
            progress.phase = Some(event.phase);
            progress.current_activity.clone_from(&event.current_activity);
            progress.items_processed = event.items_processed;
            progress.total_items = event.total_items.or(progress.total_items);
            progress.sources_ingested = progress.sources_ingested.max(event.sources_ingested);
            progress.screens_extracted = progress.screens_extracted.max(event.screens_extracted);
            progress.tasks_extracted = progress.tasks_extracted.max(event.tasks_extracted);
            progress.elapsed_time_ms = event.elapsed_time_ms;
        }

        progress
    }
}
