//! Concurrent superstep execution and dependency-gated scheduling.
//!
//! A [`scheduler::Scheduler`] runs the frontier of a single superstep:
//! skipping nodes whose relevant channels haven't changed since they last
//! ran, bounding concurrency, and collecting node outputs for the barrier.

pub mod scheduler;

pub use scheduler::{Scheduler, SchedulerError, SchedulerState, StepRunResult};
