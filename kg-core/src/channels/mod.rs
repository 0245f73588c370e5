//! Versioned state channels.
//!
//! Each channel wraps a piece of workflow state plus a monotonic version
//! counter. The barrier in [`crate::app`] bumps a channel's version only when
//! a superstep actually changes its contents, so callers polling
//! `get_progress` can cheaply detect "nothing new happened" without a
//! snapshot diff.

pub mod errors;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::channels::errors::ErrorEvent;
use crate::progress::ProgressEvent;

/// Common shape for a versioned state channel.
pub trait Channel<T> {
    fn new(data: T, version: u32) -> Self;
    fn get(&self) -> &T;
    fn get_mut(&mut self) -> &mut T;
    fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.get().clone()
    }
    fn version(&self) -> u32;
    fn set_version(&mut self, version: u32);
}

#[derive(Clone, Debug, Default)]
pub struct ProgressChannel {
    data: Vec<ProgressEvent>,
    version: u32,
}

impl Channel<Vec<ProgressEvent>> for ProgressChannel {
    fn new(data: Vec<ProgressEvent>, version: u32) -> Self {
        Self { data, version }
    }

    fn get(&self) -> &Vec<ProgressEvent> {
        &self.data
    }

    fn get_mut(&mut self) -> &mut Vec<ProgressEvent> {
        &mut self.data
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn set_version(&mut self, version: u32) {
        self.version = version;
    }
}

#[derive(Clone, Debug, Default)]
pub struct ExtrasChannel {
    data: FxHashMap<String, Value>,
    version: u32,
}

impl Channel<FxHashMap<String, Value>> for ExtrasChannel {
    fn new(data: FxHashMap<String, Value>, version: u32) -> Self {
        Self { data, version }
    }

    fn get(&self) -> &FxHashMap<String, Value> {
        &self.data
    }

    fn get_mut(&mut self) -> &mut FxHashMap<String, Value> {
        &mut self.data
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn set_version(&mut self, version: u32) {
        self.version = version;
    }
}

#[derive(Clone, Debug, Default)]
pub struct ErrorsChannel {
    data: Vec<ErrorEvent>,
    version: u32,
}

impl Channel<Vec<ErrorEvent>> for ErrorsChannel {
    fn new(data: Vec<ErrorEvent>, version: u32) -> Self {
        Self { data, version }
    }

    fn get(&self) -> &Vec<ErrorEvent> {
        &self.data
    }

    fn get_mut(&mut self) -> &mut Vec<ErrorEvent> {
        &mut self.data
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn set_version(&mut self, version: u32) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_channel_round_trips() {
        let mut channel = ProgressChannel::new(Vec::new(), 0);
        channel
            .get_mut()
            .push(ProgressEvent::new(crate::progress::Phase::Ingestion, "fetch"));
        assert_eq!(channel.get().len(), 1);
        channel.set_version(1);
        assert_eq!(channel.version(), 1);
    }

    #[test]
    fn extras_channel_snapshot_is_independent() {
        let mut channel = ExtrasChannel::new(FxHashMap::default(), 0);
        channel.get_mut().insert("k".into(), Value::from(1));
        let snap = channel.snapshot();
        channel.get_mut().insert("k2".into(), Value::from(2));
        assert_eq!(snap.len(), 1);
        assert_eq!(channel.get().len(), 2);
    }
}
