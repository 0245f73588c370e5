//! Wires the six phase nodes into the sequential graph the spec's data flow
//! describes (spec §4.1: ingestion → extraction → linking → graph phase →
//! URL exploration → verification). URL exploration is optional in the
//! sense that it no-ops when no source carries a live URL
//! ([`pipeline_ingestion::url_exploration`]), but it is still a graph node
//! like every other phase rather than an orchestrator-level special case.

use pipeline_core::app::App;
use pipeline_core::graphs::GraphBuilder;
use pipeline_core::types::PhaseKind;
use pipeline_extract::{ExtractionNode, GraphPhaseNode, LinkerNode, VerificationNode};
use pipeline_ingestion::node::IngestionNode;
use pipeline_ingestion::UrlExplorationNode;

pub const INGESTION: &str = "ingestion";
pub const EXTRACTION: &str = "extraction";
pub const LINKING: &str = "post_extraction_linking";
pub const GRAPH_PHASE: &str = "graph_phase";
pub const URL_EXPLORATION: &str = "url_exploration";
pub const VERIFICATION: &str = "verification";

/// Builds the compiled [`App`] driving a knowledge job end to end: a single
/// linear chain from `Start` through the six phase nodes to `End`.
pub fn build_pipeline_app(
    ingestion: IngestionNode,
    extraction: ExtractionNode,
    linker: LinkerNode,
    graph_phase: GraphPhaseNode,
    url_exploration: UrlExplorationNode,
    verification: VerificationNode,
) -> App {
    let ingestion_id = PhaseKind::Custom(INGESTION.to_string());
    let extraction_id = PhaseKind::Custom(EXTRACTION.to_string());
    let linking_id = PhaseKind::Custom(LINKING.to_string());
    let graph_phase_id = PhaseKind::Custom(GRAPH_PHASE.to_string());
    let url_exploration_id = PhaseKind::Custom(URL_EXPLORATION.to_string());
    let verification_id = PhaseKind::Custom(VERIFICATION.to_string());

    GraphBuilder::new()
        .add_node(ingestion_id.clone(), ingestion)
        .add_node(extraction_id.clone(), extraction)
        .add_node(linking_id.clone(), linker)
        .add_node(graph_phase_id.clone(), graph_phase)
        .add_node(url_exploration_id.clone(), url_exploration)
        .add_node(verification_id.clone(), verification)
        .add_edge(PhaseKind::Start, ingestion_id.clone())
        .add_edge(ingestion_id, extraction_id.clone())
        .add_edge(extraction_id, linking_id.clone())
        .add_edge(linking_id, graph_phase_id.clone())
        .add_edge(graph_phase_id, url_exploration_id.clone())
        .add_edge(url_exploration_id, verification_id.clone())
        .add_edge(verification_id, PhaseKind::End)
        .compile()
}
