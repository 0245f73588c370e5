//! Cross-entity invariant checks from spec §3. These are pure functions over
//! already-loaded entities — callers (the Graph Phase, tests) decide what to
//! do with a violation; this module only detects them.

use crate::screen::Screen;
use crate::task::Task;
use crate::transition::Transition;
use crate::user_flow::UserFlow;

/// Invariant 1: every transition's `from_screen_id`/`to_screen_id` must name
/// a screen present in `screens` (callers pass screens already filtered to
/// one `knowledge_id`, so "present" implies "same knowledge_id").
pub fn dangling_transitions<'a>(transitions: &'a [Transition], screens: &[Screen]) -> Vec<&'a Transition> {
    let known: std::collections::HashSet<&str> = screens.iter().map(|s| s.screen_id()).collect();
    transitions
        .iter()
        .filter(|t| !known.contains(t.from_screen_id.as_str()) || !known.contains(t.to_screen_id.as_str()))
        .collect()
}

/// Invariant 7: task steps form a DAG (no backward references).
pub fn tasks_violating_dag<'a>(tasks: &'a [Task]) -> Vec<&'a Task> {
    tasks.iter().filter(|t| !t.steps_form_dag()).collect()
}

/// Invariant 8: a user flow's `screen_sequence.order` is gap-free, starting at 1.
pub fn flows_with_bad_sequence<'a>(flows: &'a [UserFlow]) -> Vec<&'a UserFlow> {
    flows.iter().filter(|f| !f.sequence_well_ordered()).collect()
}
