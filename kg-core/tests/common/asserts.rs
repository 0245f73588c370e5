use pipeline_core::app::App;
use pipeline_core::channels::Channel;
use pipeline_core::state::PipelineState;
use pipeline_core::types::PhaseKind;

#[allow(dead_code)]
pub fn assert_edge(app: &App, from: PhaseKind, to: PhaseKind) {
    let edges = app.edges();
    let outs = edges.get(&from).expect("source node has edges");
    assert!(outs.contains(&to), "expected edge {from:?} -> {to:?}");
}

#[allow(dead_code)]
pub fn assert_progress_contains(state: &PipelineState, needle: &str) {
    let events = state.progress.snapshot();
    let found = events.iter().any(|e| e.current_activity.contains(needle));
    assert!(
        found,
        "expected at least one progress event containing '{needle}', got: {:?}",
        events
    );
}

#[allow(dead_code)]
pub fn assert_extra_has(state: &PipelineState, key: &str) {
    let extra = state.extra.snapshot();
    assert!(
        extra.contains_key(key),
        "expected extra to have key '{key}', got keys: {:?}",
        extra.keys().collect::<Vec<_>>()
    );
}
