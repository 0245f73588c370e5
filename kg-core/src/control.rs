//! Control-flow primitives: frontier routing and the pause/resume/cancel
//! signal handshake the durable orchestrator exposes to its callers.
//!
//! Frontier commands are kept separate from state updates so nodes can
//! express routing intent without mutating application state directly. The
//! barrier aggregates these directives in a deterministic order and the
//! runner reconciles them with unconditional / conditional edges.
//!
//! `WorkflowControl` generalizes the pause/resume/cancel handshake a durable
//! workflow substrate exposes as signals: `pause()`/`resume()`/`cancel()` are
//! called from outside (a signal handler), `check_pause_or_cancel` is called
//! from inside the orchestrator loop at phase boundaries and between
//! iterated items.

use crate::types::PhaseKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Notify;

/// Route identifier used by frontier commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeRoute {
    /// Route to another node in the graph.
    Node(PhaseKind),
}

impl NodeRoute {
    /// Return the concrete `PhaseKind` for this route.
    #[must_use]
    pub fn kind(&self) -> &PhaseKind {
        match self {
            NodeRoute::Node(kind) => kind,
        }
    }

    /// Clone the underlying `PhaseKind`.
    #[must_use]
    pub fn to_node_kind(&self) -> PhaseKind {
        self.kind().clone()
    }
}

impl From<PhaseKind> for NodeRoute {
    fn from(kind: PhaseKind) -> Self {
        NodeRoute::Node(kind)
    }
}

/// Command emitted by a node to manipulate the next frontier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrontierCommand {
    /// Append additional routes to the existing frontier calculation.
    Append(Vec<NodeRoute>),
    /// Replace the default routes emitted for the node.
    Replace(Vec<NodeRoute>),
}

/// Raised by [`WorkflowControl::check_pause_or_cancel`] when a `cancel`
/// signal has fired. The orchestrator treats this as a terminal error that
/// moves the workflow to `status=cancelled`, not `status=failed`.
#[derive(Debug, Error)]
#[error("workflow cancelled")]
pub struct CancelledError;

/// Shared pause/resume/cancel flag set, cloned into both the signal-handling
/// side (an external caller) and the orchestrator loop.
///
/// Mirrors the `WorkflowControl` class of a Temporal-style workflow: a pause
/// flag gates progress at checkpoints, a cancel flag is checked first and
/// wins over pause.
#[derive(Clone, Debug)]
pub struct WorkflowControl {
    paused: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Default for WorkflowControl {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowControl {
    #[must_use]
    pub fn new() -> Self {
        Self {
            paused: Arc::new(AtomicBool::new(false)),
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Suspend on pause until `resume`/`cancel`; raise immediately on
    /// `cancel`. Intended to be called at phase boundaries and between
    /// iterated items, per the orchestrator's determinism rules.
    pub async fn check_pause_or_cancel(&self) -> Result<(), CancelledError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(CancelledError);
        }
        while self.paused.load(Ordering::SeqCst) {
            self.notify.notified().await;
            if self.cancelled.load(Ordering::SeqCst) {
                return Err(CancelledError);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_wins_even_while_paused() {
        let control = WorkflowControl::new();
        control.pause();
        control.cancel();
        assert!(control.check_pause_or_cancel().await.is_err());
    }

    #[tokio::test]
    async fn resume_unblocks_pending_check() {
        let control = WorkflowControl::new();
        control.pause();
        let waiter = control.clone();
        let handle = tokio::spawn(async move { waiter.check_pause_or_cancel().await });
        tokio::task::yield_now().await;
        control.resume();
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn not_paused_or_cancelled_returns_immediately() {
        let control = WorkflowControl::new();
        assert!(control.check_pause_or_cancel().await.is_ok());
    }
}
