use serde_json::Value;
use pipeline_core::channels::Channel;
use pipeline_core::progress::{Phase, ProgressEvent};
use pipeline_core::state::{PipelineSnapshot, PipelineState};

pub fn empty_snapshot() -> PipelineSnapshot {
    PipelineState::builder().build().snapshot()
}

pub fn empty_state() -> PipelineState {
    PipelineState::builder().build()
}

/// Seeds the progress channel with a single ingestion-phase activity, the
/// cheapest way to get a non-empty `PipelineState` for fixture purposes.
pub fn state_with_user(activity: &str) -> PipelineState {
    PipelineState::builder()
        .with_progress_event(ProgressEvent::new(Phase::Ingestion, activity))
        .build()
}

pub fn state_with_extra(pairs: &[(&str, Value)]) -> PipelineState {
    let mut st = empty_state();
    for (k, v) in pairs {
        st.extra.get_mut().insert((*k).into(), v.clone());
    }
    st
}
