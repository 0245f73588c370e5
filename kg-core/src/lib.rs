//! # pipeline-core: graph-driven durable workflow engine
//!
//! `pipeline-core` is the generic graph-execution substrate underneath the
//! knowledge-extraction pipeline: a concurrent, stateful workflow engine
//! using graph-based execution with versioned state channels and
//! deterministic barrier merges. It knows nothing about screens, tasks, or
//! chunks — those domain entities live in `pipeline-ingestion` and
//! `pipeline-extract`. This crate only knows phases, channels, and
//! checkpoints.
//!
//! ## Core Concepts
//!
//! - **Nodes**: async units of work (a phase activity) that process a state
//!   snapshot and return a partial update
//! - **Progress**: append-only progress events a `get_progress` query reads
//! - **State**: versioned, channel-based state management
//! - **Graph**: declarative workflow definition with conditional edges
//! - **Scheduler**: concurrent execution with dependency tracking
//! - **Control**: pause/resume/cancel signal handshake
//!
//! ## Quick Start
//!
//! ### Building a Simple Workflow
//!
//! ```
//! use pipeline_core::{
//!     node::{Node, NodeContext, NodePartial, NodeError},
//!     progress::{Phase, ProgressEvent},
//!     state::StateSnapshot,
//! };
//! use async_trait::async_trait;
//!
//! struct IngestionNode;
//!
//! #[async_trait]
//! impl Node for IngestionNode {
//!     async fn run(
//!         &self,
//!         _snapshot: StateSnapshot,
//!         _ctx: NodeContext,
//!     ) -> Result<NodePartial, NodeError> {
//!         let progress = ProgressEvent::new(Phase::Ingestion, "fetch_sources");
//!         Ok(NodePartial::new().with_progress(vec![progress]))
//!     }
//! }
//! ```
//!
//! ### State Management
//!
//! ```
//! use pipeline_core::state::PipelineState;
//! use serde_json::json;
//!
//! let state = PipelineState::builder()
//!     .with_extra("knowledge_id", json!("kg_123"))
//!     .with_extra("job_id", json!("job_456"))
//!     .build();
//! ```
//!
//! ### Error Handling
//!
//! ```
//! use pipeline_core::node::{NodeError, NodeContext};
//!
//! fn example_error_handling(ctx: &NodeContext) -> Result<(), NodeError> {
//!     ctx.emit("validation", "checking input parameters")?;
//!
//!     Err(NodeError::MissingInput {
//!         what: "knowledge_id",
//!     })
//! }
//! ```
//!
//! ## Module Guide
//!
//! - [`progress`] - `ProgressEvent` type carried on the progress channel
//! - [`state`] - Versioned state management and snapshots
//! - [`node`] - Node trait and execution primitives
//! - [`graphs`] - Workflow graph definition and compilation
//! - [`schedulers`] - Concurrent execution and dependency resolution
//! - [`runtimes`] - High-level execution runtime and checkpointing
//! - [`channels`] - Channel-based state storage and versioning
//! - [`reducers`] - State merge strategies and conflict resolution
//! - [`control`] - Frontier routing and pause/resume/cancel signals

pub mod app;
pub mod channels;
pub mod control;
pub mod event_bus;
pub mod graphs;
pub mod node;
pub mod progress;
pub mod reducers;
pub mod runtimes;
pub mod schedulers;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod utils;
