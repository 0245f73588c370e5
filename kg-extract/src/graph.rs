//! The Graph Phase (spec §4.6): does not build an in-memory graph. Counts
//! nodes and edges under `knowledge_id`, validates that every transition
//! references screens in the set, and reports discrepancies as errors
//! without failing the workflow on them.

use std::collections::HashSet;

use pipeline_types::action::Action;
use pipeline_types::business::BusinessFunction;
use pipeline_types::screen::Screen;
use pipeline_types::task::Task;
use pipeline_types::transition::Transition;
use pipeline_types::user_flow::UserFlow;
use pipeline_types::workflow_entity::OperationalWorkflow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphCounts {
    pub screens: usize,
    pub tasks: usize,
    pub actions: usize,
    pub transitions: usize,
    pub business_functions: usize,
    pub workflows: usize,
    pub user_flows: usize,
}

impl GraphCounts {
    pub fn node_count(&self) -> usize {
        self.screens + self.tasks + self.actions + self.business_functions + self.workflows + self.user_flows
    }

    pub fn edge_count(&self) -> usize {
        self.transitions
    }
}

/// Counts every entity kind plus validates referential integrity of
/// transitions against the screen set (spec §4.6). Discrepancies are
/// returned as strings, never as an `Err` — this phase never fails the
/// workflow (spec §7 propagation policy).
pub struct GraphReport {
    pub counts: GraphCounts,
    pub discrepancies: Vec<String>,
}

pub fn build_graph_report(
    screens: &[Screen],
    tasks: &[Task],
    actions: &[Action],
    transitions: &[Transition],
    business_functions: &[BusinessFunction],
    workflows: &[OperationalWorkflow],
    user_flows: &[UserFlow],
) -> GraphReport {
    let screen_ids: HashSet<&str> = screens.iter().map(|s| s.screen_id()).collect();
    let mut discrepancies = Vec::new();

    for transition in transitions {
        if !screen_ids.contains(transition.from_screen_id.as_str()) {
            discrepancies.push(format!(
                "transition '{}' references unknown from_screen_id '{}'",
                transition.transition_id(),
                transition.from_screen_id
            ));
        }
        if !screen_ids.contains(transition.to_screen_id.as_str()) {
            discrepancies.push(format!(
                "transition '{}' references unknown to_screen_id '{}'",
                transition.transition_id(),
                transition.to_screen_id
            ));
        }
    }

    let counts = GraphCounts {
        screens: screens.len(),
        tasks: tasks.len(),
        actions: actions.len(),
        transitions: transitions.len(),
        business_functions: business_functions.len(),
        workflows: workflows.len(),
        user_flows: user_flows.len(),
    };

    GraphReport { counts, discrepancies }
}
