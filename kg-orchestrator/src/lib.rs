//! The durable, resumable workflow orchestrator: wires ingestion,
//! extraction, linking, graph, URL exploration, and verification into one
//! job, driven through pause/resume/cancel checkpoints (spec §4.1).

pub mod determinism;
pub mod error;
pub mod graph;
pub mod input;
pub mod orchestrator;
pub mod progress;
pub mod resync;

pub use determinism::derive_ingestion_id;
pub use error::OrchestratorError;
pub use graph::build_pipeline_app;
pub use input::{derive_website_id, Credentials, InputError, SourceTuple, WorkflowInput, WorkflowOptions};
pub use orchestrator::{Orchestrator, PROGRESS_HISTORY_LIMIT};
pub use progress::WorkflowProgress;
pub use resync::resync_knowledge;
