use std::fmt;
use thiserror::Error;

use super::event::Event;

/// Handle a pipeline phase node's [`NodeContext`](crate::node::NodeContext)
/// clones to report progress, diagnostics, and LLM-streaming events while
/// `Orchestrator::run` steps it. Every ingestion/extraction/linking/graph/
/// URL-exploration/verification node emits through this trait, not a
/// concrete sink, so tests can swap in a recording double without touching
/// node code.
pub trait EventEmitter: Send + Sync + fmt::Debug {
    /// Emit an event in a synchronous, non-blocking manner.
    fn emit(&self, event: Event) -> Result<(), EmitterError>;
}

/// Errors that can occur when a phase node emits an event.
#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("event hub closed")]
    Closed,
    #[error("event lag exceeded buffer; dropped {0} messages")]
    Lagged(usize),
    #[error("event emission failed: {0}")]
    Other(String),
}

impl EmitterError {
    pub fn other(error: impl Into<String>) -> Self {
        Self::Other(error.into())
    }
}
