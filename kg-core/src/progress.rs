//! The `ProgressEvent` type carried on the progress channel.
//!
//! A durable orchestrator exposes a `get_progress` query so a caller can poll
//! a running job without waiting on its result. This module defines the
//! shape of that query response and the way phase activities append to it as
//! the workflow advances.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::channels::errors::ErrorEvent;

/// Identifies which of the six pipeline phases an activity belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Ingestion,
    Extraction,
    PostExtractionLinking,
    GraphPhase,
    UrlExploration,
    Verification,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Ingestion => "ingestion",
            Phase::Extraction => "extraction",
            Phase::PostExtractionLinking => "post_extraction_linking",
            Phase::GraphPhase => "graph_phase",
            Phase::UrlExploration => "url_exploration",
            Phase::Verification => "verification",
        };
        write!(f, "{s}")
    }
}

/// A single advancement of the orchestrator's progress counters, appended to
/// the progress channel by a phase activity. The runner folds a sequence of
/// these into the snapshot a `get_progress` query returns.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub current_activity: String,
    #[serde(default)]
    pub items_processed: u64,
    #[serde(default)]
    pub total_items: Option<u64>,
    #[serde(default)]
    pub sources_ingested: u64,
    #[serde(default)]
    pub screens_extracted: u64,
    #[serde(default)]
    pub tasks_extracted: u64,
    #[serde(default)]
    pub errors: Vec<ErrorEvent>,
    #[serde(default)]
    pub elapsed_time_ms: u64,
}

impl ProgressEvent {
    #[must_use]
    pub fn new(phase: Phase, current_activity: impl Into<String>) -> Self {
        Self {
            phase,
            current_activity: current_activity.into(),
            items_processed: 0,
            total_items: None,
            sources_ingested: 0,
            screens_extracted: 0,
            tasks_extracted: 0,
            errors: Vec::new(),
            elapsed_time_ms: 0,
        }
    }

    #[must_use]
    pub fn with_items(mut self, processed: u64, total: Option<u64>) -> Self {
        self.items_processed = processed;
        self.total_items = total;
        self
    }

    #[must_use]
    pub fn with_counts(mut self, sources: u64, screens: u64, tasks: u64) -> Self {
        self.sources_ingested = sources;
        self.screens_extracted = screens;
        self.tasks_extracted = tasks;
        self
    }

    #[must_use]
    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_time_ms = elapsed_ms;
        self
    }
}
