//! The user-flow synthesizer (spec §4.4, run after the six extractors):
//! reads all screens, transitions, workflows, and business functions for a
//! `knowledge_id` and emits [`UserFlow`] objects whose `screen_sequence` is
//! derived from workflow step chains and reachable-transition subgraphs.

use std::collections::{HashMap, HashSet};

use pipeline_types::screen::Screen;
use pipeline_types::transition::Transition;
use pipeline_types::user_flow::{ScreenSequenceEntry, UserFlow};
use pipeline_types::workflow_entity::OperationalWorkflow;

use crate::common::ExtractionScope;
use crate::fuzzy::fuzzy_matches;

fn resolve_screen<'a>(name: &str, screens: &'a [Screen]) -> Option<&'a Screen> {
    screens.iter().find(|s| fuzzy_matches(name.trim(), &s.name))
}

fn sequence(screen_ids: &[String]) -> Vec<ScreenSequenceEntry> {
    screen_ids
        .iter()
        .enumerate()
        .map(|(i, id)| ScreenSequenceEntry { order: (i as u32) + 1, screen_id: id.clone(), transition_id: None })
        .collect()
}

fn flow_from_workflow(workflow: &OperationalWorkflow, screens: &[Screen], scope: &ExtractionScope) -> Option<UserFlow> {
    let mut screen_ids = Vec::new();
    let mut steps = Vec::new();
    let mut ordered_steps = workflow.steps.clone();
    ordered_steps.sort_by_key(|s| s.order);

    for step in &ordered_steps {
        steps.push(step.description.clone());
        if let Some(name) = &step.screen_id {
            if let Some(screen) = resolve_screen(name, screens) {
                if screen_ids.last() != Some(&screen.screen_id().to_string()) {
                    screen_ids.push(screen.screen_id().to_string());
                }
            }
        }
    }

    if screen_ids.len() < 2 {
        return None;
    }

    let entity_id = format!("userflow-workflow-{}", workflow.workflow_id());
    Some(UserFlow {
        envelope: scope.envelope(entity_id),
        name: workflow.name.clone(),
        entry_screen: screen_ids.first().cloned().unwrap_or_default(),
        exit_screen: screen_ids.last().cloned().unwrap_or_default(),
        screen_sequence: sequence(&screen_ids),
        steps,
        total_steps: screen_ids.len() as u32,
        estimated_duration: "unknown".to_string(),
        complexity: "medium".to_string(),
        mermaid_diagram: None,
    })
}

/// Builds an adjacency list from the transition set and returns the longest
/// simple path through it starting at `start` (depth-first, revisits
/// forbidden — bounds work on reasonably sized extracted graphs).
fn longest_path_from(start: &str, adjacency: &HashMap<&str, Vec<&str>>) -> Vec<String> {
    fn dfs<'a>(node: &'a str, adjacency: &HashMap<&'a str, Vec<&'a str>>, visited: &mut HashSet<&'a str>) -> Vec<String> {
        let mut best: Vec<String> = vec![node.to_string()];
        if let Some(neighbors) = adjacency.get(node) {
            for &next in neighbors {
                if visited.contains(next) {
                    continue;
                }
                visited.insert(next);
                let mut candidate = vec![node.to_string()];
                candidate.extend(dfs(next, adjacency, visited));
                visited.remove(next);
                if candidate.len() > best.len() {
                    best = candidate;
                }
            }
        }
        best
    }
    let mut visited = HashSet::new();
    visited.insert(start);
    dfs(start, adjacency, &mut visited)
}

/// Synthesizes additional flows from the reachable-transition subgraph for
/// screens no workflow-derived flow already covers as an entry point (spec
/// §4.4: "reachable-transition subgraphs").
fn flows_from_transitions(screens: &[Screen], transitions: &[Transition], scope: &ExtractionScope, covered_entries: &HashSet<String>) -> Vec<UserFlow> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut has_incoming: HashSet<&str> = HashSet::new();
    for t in transitions {
        adjacency.entry(t.from_screen_id.as_str()).or_default().push(t.to_screen_id.as_str());
        has_incoming.insert(t.to_screen_id.as_str());
    }

    let mut flows = Vec::new();
    for screen in screens {
        let id = screen.screen_id();
        if has_incoming.contains(id) || covered_entries.contains(id) || !adjacency.contains_key(id) {
            continue;
        }
        let path = longest_path_from(id, &adjacency);
        if path.len() < 2 {
            continue;
        }
        let entity_id = format!("userflow-graph-{}", id);
        flows.push(UserFlow {
            envelope: scope.envelope(entity_id),
            name: format!("Flow from {}", screen.name),
            entry_screen: path.first().cloned().unwrap_or_default(),
            exit_screen: path.last().cloned().unwrap_or_default(),
            screen_sequence: sequence(&path),
            steps: Vec::new(),
            total_steps: path.len() as u32,
            estimated_duration: "unknown".to_string(),
            complexity: "medium".to_string(),
            mermaid_diagram: None,
        });
    }
    flows
}

pub fn synthesize_user_flows(
    screens: &[Screen],
    transitions: &[Transition],
    workflows: &[OperationalWorkflow],
    scope: &ExtractionScope,
) -> Vec<UserFlow> {
    let mut flows: Vec<UserFlow> = workflows.iter().filter_map(|w| flow_from_workflow(w, screens, scope)).collect();

    let covered_entries: HashSet<String> = flows.iter().map(|f| f.entry_screen.clone()).collect();
    flows.extend(flows_from_transitions(screens, transitions, scope, &covered_entries));
    flows
}
