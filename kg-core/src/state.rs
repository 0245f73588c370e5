//! State management for the pipeline's graph engine.
//!
//! This module provides versioned state management with multiple channels
//! for different types of workflow data. State is managed through versioned
//! channels that support snapshotting, deep cloning, and persistence.
//!
//! # Channels
//!
//! - **progress**: `ProgressEvent`s describing phase/activity advancement
//! - **extra**: custom metadata and intermediate results passed between phases
//! - **errors**: error events and diagnostic information
//!
//! # Examples
//!
//! ```rust
//! use pipeline_core::state::PipelineState;
//! use pipeline_core::channels::Channel;
//! use serde_json::json;
//!
//! let mut state = PipelineState::new();
//! state.extra.get_mut().insert("knowledge_id".to_string(), json!("kg_123"));
//!
//! let snapshot = state.snapshot();
//! assert_eq!(snapshot.extra.get("knowledge_id"), Some(&json!("kg_123")));
//! ```

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::{
    channels::{Channel, ErrorsChannel, ExtrasChannel, ProgressChannel},
    progress::ProgressEvent,
};

/// The main state container for a pipeline job's workflow execution.
///
/// `PipelineState` manages three independent channels of versioned data:
/// progress events, custom extras, and error events. Each channel maintains
/// its own version number for optimistic concurrency control and change
/// detection.
#[derive(Clone, Debug, Default)]
pub struct PipelineState {
    /// Progress channel recording phase/activity advancement.
    pub progress: ProgressChannel,
    /// Extra channel for custom metadata and intermediate results, such as
    /// ids handed from one phase to the next.
    pub extra: ExtrasChannel,
    /// Error channel for diagnostic information.
    pub errors: ErrorsChannel,
}

/// Immutable snapshot of workflow state at a specific point in time.
///
/// `PipelineSnapshot` provides a read-only view of the state that nodes can
/// safely access during execution without affecting the underlying state.
#[derive(Clone, Debug)]
pub struct PipelineSnapshot {
    /// Progress events at the time of snapshot.
    pub progress: Vec<ProgressEvent>,
    /// Version of the progress channel when the snapshot was taken.
    pub progress_version: u32,
    /// Extra data at the time of snapshot.
    pub extra: FxHashMap<String, Value>,
    /// Version of the extra channel when the snapshot was taken.
    pub extra_version: u32,
    /// Error events at the time of snapshot.
    pub errors: Vec<crate::channels::errors::ErrorEvent>,
    /// Version of the errors channel when the snapshot was taken.
    pub errors_version: u32,
}

/// Alias kept for call sites that refer to the snapshot generically as the
/// state a node observes.
pub type StateSnapshot = PipelineSnapshot;

impl PipelineState {
    /// Creates an empty pipeline state with all channels at version 0.
    ///
    /// This is the primary constructor: a freshly created knowledge job has
    /// no progress, no extras, and no errors until its first superstep runs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for constructing `PipelineState` with a fluent API,
    /// useful for restoring state from a checkpoint or seeding test fixtures.
    #[must_use]
    pub fn builder() -> PipelineStateBuilder {
        PipelineStateBuilder::new()
    }

    /// Appends a progress event. The version is not automatically
    /// incremented; that is the barrier's responsibility.
    #[must_use = "consider using the returned self for method chaining"]
    pub fn add_progress(&mut self, event: ProgressEvent) -> &mut Self {
        self.progress.get_mut().push(event);
        self
    }

    /// Inserts a key-value pair into the extra channel.
    #[must_use = "consider using the returned self for method chaining"]
    pub fn add_extra(&mut self, key: &str, value: Value) -> &mut Self {
        self.extra.get_mut().insert(key.to_string(), value);
        self
    }

    /// Creates an immutable snapshot of the current state.
    ///
    /// Clones the current channel data and version numbers, creating a
    /// point-in-time view safe to hand to a node while the original state
    /// may be concurrently modified between supersteps.
    #[must_use]
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            progress: self.progress.snapshot(),
            progress_version: self.progress.version(),
            extra: self.extra.snapshot(),
            extra_version: self.extra.version(),
            errors: self.errors.snapshot(),
            errors_version: self.errors.version(),
        }
    }
}

/// Builder for constructing `PipelineState` with a fluent API.
///
/// Particularly useful when restoring state from a checkpoint: the
/// checkpointer replays a job's accumulated progress/extra/error history
/// through this builder rather than constructing the channels by hand.
#[derive(Debug, Default)]
pub struct PipelineStateBuilder {
    progress: Vec<ProgressEvent>,
    extra: FxHashMap<String, Value>,
    errors: Vec<crate::channels::errors::ErrorEvent>,
}

impl PipelineStateBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Seeds the extra channel with the job's routing keys
    /// (`knowledge_id`/`job_id`) and any other metadata.
    #[must_use]
    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Seeds the progress channel with a prior progress event, e.g. when
    /// resuming a job from a checkpoint.
    #[must_use]
    pub fn with_progress_event(mut self, event: ProgressEvent) -> Self {
        self.progress.push(event);
        self
    }

    /// Seeds the errors channel with a prior error event.
    #[must_use]
    pub fn with_error_event(mut self, event: crate::channels::errors::ErrorEvent) -> Self {
        self.errors.push(event);
        self
    }

    /// Builds the final `PipelineState`. All channels are initialized at
    /// version 1 if they carry seeded data, matching a freshly-restored
    /// checkpoint's expectations.
    #[must_use]
    pub fn build(self) -> PipelineState {
        PipelineState {
            progress: ProgressChannel::new(self.progress, 1),
            extra: ExtrasChannel::new(self.extra, 1),
            errors: ErrorsChannel::new(self.errors, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_independent_of_later_mutation() {
        let mut state = PipelineState::new();
        state.add_extra("knowledge_id", Value::from("kg_1"));
        let snapshot = state.snapshot();

        state.extra.get_mut().insert("knowledge_id".into(), Value::from("kg_2"));

        assert_eq!(snapshot.extra.get("knowledge_id"), Some(&Value::from("kg_1")));
        assert_eq!(
            state.extra.snapshot().get("knowledge_id"),
            Some(&Value::from("kg_2"))
        );
    }

    #[test]
    fn builder_seeds_all_channels_at_version_one() {
        let state = PipelineStateBuilder::new()
            .with_extra("job_id", Value::from("job_1"))
            .with_progress_event(ProgressEvent::new(crate::progress::Phase::Ingestion, "fetch"))
            .build();

        assert_eq!(state.progress.version(), 1);
        assert_eq!(state.extra.version(), 1);
        assert_eq!(state.errors.version(), 1);
        assert_eq!(state.progress.get().len(), 1);
    }
}
