use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::impl_entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub step_id: String,
    pub order: u32,
    pub description: String,
    #[serde(default)]
    pub screen_id: Option<String>,
    #[serde(default)]
    pub action_id: Option<String>,
}

/// A named sequence of workflow steps, identified by `envelope.entity_id`
/// (the spec's `workflow_id`). Not to be confused with the orchestrator's
/// own `PhaseKind`/workflow-of-code concept in `pipeline-core` — this is a
/// business-domain entity extracted from source material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationalWorkflow {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub name: String,
    pub business_function: String,
    #[serde(default)]
    pub business_function_id: Option<String>,
    pub steps: Vec<WorkflowStep>,
    #[serde(default)]
    pub screen_ids: Vec<String>,
    #[serde(default)]
    pub task_ids: Vec<String>,
    #[serde(default)]
    pub action_ids: Vec<String>,
    #[serde(default)]
    pub transition_ids: Vec<String>,
}

impl_entity!(OperationalWorkflow);

impl OperationalWorkflow {
    pub fn workflow_id(&self) -> &str {
        self.envelope.entity_id.as_str()
    }

    /// `steps` sorted by `order`, gap-free, starting at 1 (mirrors the user
    /// flow's `screen_sequence` ordering invariant).
    pub fn steps_well_ordered(&self) -> bool {
        let mut orders: Vec<u32> = self.steps.iter().map(|s| s.order).collect();
        orders.sort_unstable();
        orders
            .iter()
            .enumerate()
            .all(|(i, &order)| order == (i as u32) + 1)
    }
}
