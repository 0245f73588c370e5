use super::Reducer;
use crate::{channels::Channel, node::NodePartial, state::PipelineState};

/// Appends the progress events from a `NodePartial` to the progress channel.
#[derive(Debug, PartialEq, Clone, Hash, Eq)]
pub struct AddProgress;

impl Reducer for AddProgress {
    fn apply(&self, state: &mut PipelineState, update: &NodePartial) {
        if let Some(events) = &update.progress
            && !events.is_empty()
        {
            state.progress.get_mut().extend(events.iter().cloned());
        }
    }
}
