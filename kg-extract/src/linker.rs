//! The Post-Extraction Linker (spec §4.5): a single pass, run after
//! extraction, that reads all entities for `(knowledge_id, job_id)` once and
//! performs five bidirectional linking passes. All updates use
//! `$addToSet`-style semantics — duplicates are impossible, so running the
//! linker twice is idempotent.

use std::collections::HashSet;

use regex::Regex;

use pipeline_types::action::Action;
use pipeline_types::business::BusinessFunction;
use pipeline_types::screen::Screen;
use pipeline_types::task::Task;
use pipeline_types::transition::Transition;
use pipeline_types::workflow_entity::OperationalWorkflow;

use crate::fuzzy::fuzzy_matches;

/// All entities for one `(knowledge_id, job_id)` the linker mutates in
/// place. Loaded once by the caller (spec §4.5: "Reads all entities for
/// (knowledge_id, job_id) once").
pub struct LinkSet {
    pub screens: Vec<Screen>,
    pub tasks: Vec<Task>,
    pub actions: Vec<Action>,
    pub transitions: Vec<Transition>,
    pub business_functions: Vec<BusinessFunction>,
    pub workflows: Vec<OperationalWorkflow>,
}

fn add_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Pass 1: Tasks ↔ Screens. `task.metadata.page_url` (read from
/// `envelope.metadata`) matches any `screen.url_patterns` via regex
/// `search`; fallback: `screen_context` fuzzy-matches screen name.
fn link_tasks_screens(screens: &mut [Screen], tasks: &mut [Task]) {
    for task_index in 0..tasks.len() {
        let page_url = tasks[task_index].envelope.metadata.get("page_url").and_then(|v| v.as_str()).map(str::to_string);
        let screen_context =
            tasks[task_index].envelope.metadata.get("screen_context").and_then(|v| v.as_str()).map(str::to_string);

        for screen in screens.iter_mut() {
            let url_match = page_url.as_deref().is_some_and(|url| {
                screen.url_patterns.iter().any(|pattern| Regex::new(pattern).map(|re| re.is_match(url)).unwrap_or(false))
            });
            let context_match = screen_context.as_deref().is_some_and(|ctx| fuzzy_matches(ctx, &screen.name));

            if url_match || context_match {
                add_unique(&mut tasks[task_index].screen_ids, screen.screen_id());
                add_unique(&mut screen.task_ids, tasks[task_index].task_id());
            }
        }
    }
}

/// Pass 2: Actions ↔ Screens. A video-sourced action's `screen_name`
/// (`envelope.metadata`) fuzzy-matches; navigate actions match target URL to
/// `url_patterns`; else action name contains screen name.
fn link_actions_screens(screens: &mut [Screen], actions: &mut [Action]) {
    for action_index in 0..actions.len() {
        let screen_name = actions[action_index].envelope.metadata.get("screen_name").and_then(|v| v.as_str()).map(str::to_string);
        let is_navigate = actions[action_index].action_type == "navigate";
        let target =
            actions[action_index].parameters.get("target_url").and_then(|v| v.as_str()).map(str::to_string);
        let action_name = actions[action_index].name.clone();

        for screen in screens.iter_mut() {
            let matched = screen_name.as_deref().is_some_and(|name| fuzzy_matches(name, &screen.name))
                || (is_navigate
                    && target.as_deref().is_some_and(|url| {
                        screen.url_patterns.iter().any(|pattern| Regex::new(pattern).map(|re| re.is_match(url)).unwrap_or(false))
                    }))
                || action_name.to_lowercase().contains(&screen.name.to_lowercase());

            if matched {
                add_unique(&mut actions[action_index].screen_ids, screen.screen_id());
                add_unique(&mut screen.action_ids, actions[action_index].action_id());
            }
        }
    }
}

/// Pass 3: BusinessFunctions ↔ Screens. Every name in `screens_mentioned`
/// fuzzy-matches.
fn link_business_functions_screens(screens: &mut [Screen], functions: &mut [BusinessFunction]) {
    for function_index in 0..functions.len() {
        let mentioned = functions[function_index].screens_mentioned.clone();
        for name in &mentioned {
            for screen in screens.iter_mut() {
                if fuzzy_matches(name, &screen.name) {
                    add_unique(&mut functions[function_index].related.screens, screen.screen_id());
                    add_unique(&mut screen.business_function_ids, functions[function_index].business_function_id());
                }
            }
        }
    }
}

/// Pass 4: Workflows → Entities. Parses each step's `{screen, action, task}`
/// fields; fuzzy-matches by name.
fn link_workflows_entities(screens: &[Screen], actions: &[Action], tasks: &[Task], workflows: &mut [OperationalWorkflow]) {
    for workflow in workflows.iter_mut() {
        for step in &workflow.steps {
            if let Some(screen_name) = &step.screen_id {
                if let Some(screen) = screens.iter().find(|s| fuzzy_matches(screen_name, &s.name)) {
                    add_unique(&mut workflow.screen_ids, screen.screen_id());
                }
            }
            if let Some(action_name) = &step.action_id {
                if let Some(action) = actions.iter().find(|a| fuzzy_matches(action_name, &a.name)) {
                    add_unique(&mut workflow.action_ids, action.action_id());
                }
            }
            for task in tasks {
                if fuzzy_matches(&step.description, &task.name) {
                    add_unique(&mut workflow.task_ids, task.task_id());
                }
            }
        }
    }
}

/// Pass 5: Transitions ↔ Entities. The transition's own `from_screen_id`/
/// `to_screen_id` mirrored into screens' `outgoing`/`incoming`; if
/// `triggered_by.element_id` resolves to an action, add to
/// `transition.action_id` and `action.transition_ids`.
fn link_transitions_entities(screens: &mut [Screen], actions: &mut [Action], transitions: &mut [Transition]) {
    let screen_ids: HashSet<String> = screens.iter().map(|s| s.screen_id().to_string()).collect();

    for transition in transitions.iter_mut() {
        if screen_ids.contains(&transition.from_screen_id) {
            if let Some(screen) = screens.iter_mut().find(|s| s.screen_id() == transition.from_screen_id) {
                add_unique(&mut screen.outgoing_transitions, transition.transition_id());
            }
        }
        if screen_ids.contains(&transition.to_screen_id) {
            if let Some(screen) = screens.iter_mut().find(|s| s.screen_id() == transition.to_screen_id) {
                add_unique(&mut screen.incoming_transitions, transition.transition_id());
            }
        }

        if let Some(element_id) = &transition.triggered_by.element_id {
            if let Some(action) = actions.iter_mut().find(|a| a.action_id() == element_id) {
                transition.action_id = Some(action.action_id().to_string());
                add_unique(&mut action.transition_ids, transition.transition_id());
            }
        }
    }
}

/// Runs all five passes over `set` in place (spec §4.5). Idempotent: a
/// second call on the same `set` is a no-op since every mutation is
/// `$addToSet`-style.
pub fn link(set: &mut LinkSet) {
    link_tasks_screens(&mut set.screens, &mut set.tasks);
    link_actions_screens(&mut set.screens, &mut set.actions);
    link_business_functions_screens(&mut set.screens, &mut set.business_functions);
    link_workflows_entities(&set.screens, &set.actions, &set.tasks, &mut set.workflows);
    link_transitions_entities(&mut set.screens, &mut set.actions, &mut set.transitions);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_types::envelope::Envelope;
    use pipeline_types::screen::{ScreenContentType, StateSignature};
    use pipeline_types::task::{IoSpec, IteratorSpec};
    use pipeline_types::transition::{TransitionCost, TriggeredBy};

    fn screen(id: &str, name: &str, url_patterns: Vec<&str>) -> Screen {
        Screen {
            envelope: Envelope::new(id, "k1", "j1", "w1"),
            name: name.to_string(),
            url_patterns: url_patterns.into_iter().map(str::to_string).collect(),
            state_signature: StateSignature::default(),
            ui_elements: Vec::new(),
            action_ids: Vec::new(),
            task_ids: Vec::new(),
            outgoing_transitions: Vec::new(),
            incoming_transitions: Vec::new(),
            business_function_ids: Vec::new(),
            user_flow_ids: Vec::new(),
            workflow_ids: Vec::new(),
            content_type: ScreenContentType::WebUi,
            is_actionable: true,
        }
    }

    fn task(id: &str, metadata: serde_json::Value) -> Task {
        Task {
            envelope: Envelope::new(id, "k1", "j1", "w1").with_metadata(metadata),
            name: "Log in".to_string(),
            description: String::new(),
            category: "general".to_string(),
            complexity: "low".to_string(),
            steps: Vec::new(),
            io_spec: IoSpec::default(),
            iterator_spec: IteratorSpec::default(),
            screen_ids: Vec::new(),
            action_ids: Vec::new(),
        }
    }

    #[test]
    fn links_task_to_screen_by_page_url_regex_match() {
        let mut screens = vec![screen("login", "Login", vec!["^/login$"])];
        let mut tasks = vec![task("t1", serde_json::json!({"page_url": "/login"}))];
        link_tasks_screens(&mut screens, &mut tasks);
        assert_eq!(tasks[0].screen_ids, vec!["login".to_string()]);
        assert_eq!(screens[0].task_ids, vec!["t1".to_string()]);
    }

    #[test]
    fn second_link_pass_does_not_duplicate_ids() {
        let mut screens = vec![screen("login", "Login", vec!["^/login$"])];
        let mut tasks = vec![task("t1", serde_json::json!({"page_url": "/login"}))];
        link_tasks_screens(&mut screens, &mut tasks);
        link_tasks_screens(&mut screens, &mut tasks);
        assert_eq!(tasks[0].screen_ids.len(), 1);
        assert_eq!(screens[0].task_ids.len(), 1);
    }

    #[test]
    fn transition_endpoints_mirror_into_screen_arrays() {
        let mut screens = vec![screen("a", "A", vec![]), screen("b", "B", vec![])];
        let mut actions: Vec<Action> = Vec::new();
        let mut transitions = vec![Transition {
            envelope: Envelope::new("t1", "k1", "j1", "w1"),
            from_screen_id: "a".to_string(),
            to_screen_id: "b".to_string(),
            triggered_by: TriggeredBy::default(),
            conditions: Vec::new(),
            cost: TransitionCost::default(),
            reliability_score: 0.5,
            action_id: None,
        }];
        link_transitions_entities(&mut screens, &mut actions, &mut transitions);
        assert_eq!(screens[0].outgoing_transitions, vec!["t1".to_string()]);
        assert_eq!(screens[1].incoming_transitions, vec!["t1".to_string()]);
    }
}
