//! Extractor bank, post-extraction linker, graph phase, and verification/
//! enrichment for the knowledge-extraction pipeline (spec §4.4–§4.8).

pub mod actions;
pub mod business_functions;
pub mod common;
pub mod fuzzy;
pub mod graph;
pub mod linker;
pub mod llm;
pub mod node;
pub mod screens;
pub mod tasks;
pub mod transitions;
pub mod user_flow;
pub mod verification;
pub mod workflows;

pub use common::{ExtractionOutcome, ExtractionScope};
pub use graph::{build_graph_report, GraphCounts, GraphReport};
pub use linker::{link, LinkSet};
pub use llm::{ChatClient, ChatRequest, ChatResponse, FallbackChatClient, LlmError};
pub use node::{ExtractionNode, GraphPhaseNode, LinkerNode, VerificationNode};
pub use verification::{enrich, verify, Correction, DiscrepancyStore, EnrichmentReport, VerificationReport};
