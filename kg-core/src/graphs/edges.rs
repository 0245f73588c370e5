//! Edge types and routing predicates for conditional graph flow.
//!
//! This module contains the types and predicates used for dynamic routing
//! in workflow graphs, including conditional edges that can route based
//! on runtime state evaluation.

use crate::types::PhaseKind;
use std::sync::Arc;

/// Predicate function for conditional edge routing.
///
/// Takes a [`StateSnapshot`](crate::state::StateSnapshot) and returns target
/// phase names to determine which phase activities should run next.
/// Predicates are used with [`GraphBuilder::add_conditional_edge`](super::GraphBuilder::add_conditional_edge)
/// to create dynamic routing based on the current state.
///
/// # Examples
///
/// ```
/// use pipeline_core::graphs::EdgePredicate;
/// use std::sync::Arc;
///
/// // Route based on progress event count
/// let route_by_progress: EdgePredicate = Arc::new(|snapshot| {
///     if snapshot.progress.len() > 5 {
///         vec!["many_events".to_string()]
///     } else {
///         vec!["few_events".to_string()]
///     }
/// });
///
/// // Route based on extra data - fan out to multiple nodes
/// let route_by_error: EdgePredicate = Arc::new(|snapshot| {
///     if snapshot.extra.get("error").is_some() {
///         vec!["error_handler".to_string(), "logger".to_string()]
///     } else {
///         vec!["normal_flow".to_string()]
///     }
/// });
/// ```
pub type EdgePredicate =
    Arc<dyn Fn(crate::state::StateSnapshot) -> Vec<String> + Send + Sync + 'static>;

/// A conditional edge that routes based on a predicate function.
///
/// Conditional edges allow dynamic routing in workflows based on the current
/// state. When the scheduler encounters a conditional edge, it evaluates the
/// predicate function and routes to the returned target phases.
///
/// # Examples
///
/// ```
/// use pipeline_core::graphs::{ConditionalEdge, EdgePredicate};
/// use pipeline_core::types::PhaseKind;
/// use std::sync::Arc;
///
/// let predicate: EdgePredicate = Arc::new(|snapshot| {
///     if snapshot.progress.len() > 5 {
///         vec!["many_events".to_string()]
///     } else {
///         vec!["few_events".to_string()]
///     }
/// });
/// let edge = ConditionalEdge {
///     from: PhaseKind::Start,
///     predicate,
/// };
/// ```
#[derive(Clone)]
pub struct ConditionalEdge {
    /// The source phase for this conditional edge.
    pub from: PhaseKind,
    /// The predicate function that determines target phase(s).
    pub predicate: EdgePredicate,
}
