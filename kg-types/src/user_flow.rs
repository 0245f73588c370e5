use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::impl_entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenSequenceEntry {
    pub order: u32,
    pub screen_id: String,
    #[serde(default)]
    pub transition_id: Option<String>,
}

/// A synthesized screen-by-screen navigation path, identified by
/// `envelope.entity_id` (the spec's `user_flow_id`). Built by the
/// user-flow synthesizer from workflow step chains and reachable-transition
/// subgraphs, not extracted directly from a single chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFlow {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub name: String,
    pub entry_screen: String,
    pub exit_screen: String,
    pub screen_sequence: Vec<ScreenSequenceEntry>,
    #[serde(default)]
    pub steps: Vec<String>,
    pub total_steps: u32,
    pub estimated_duration: String,
    pub complexity: String,
    #[serde(default)]
    pub mermaid_diagram: Option<String>,
}

impl_entity!(UserFlow);

impl UserFlow {
    pub fn user_flow_id(&self) -> &str {
        self.envelope.entity_id.as_str()
    }

    /// `screen_sequence.order` must be strictly ordered, gap-free, starting
    /// at 1 (spec §3 invariant 8).
    pub fn sequence_well_ordered(&self) -> bool {
        self.screen_sequence
            .iter()
            .enumerate()
            .all(|(i, entry)| entry.order == (i as u32) + 1)
    }
}
