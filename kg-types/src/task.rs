use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::Envelope;
use crate::impl_entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IteratorType {
    None,
    ForEach,
    While,
    Until,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IteratorSpec {
    #[serde(rename = "type")]
    pub iterator_type: IteratorType,
    #[serde(default)]
    pub collection_selector: Option<String>,
    #[serde(default)]
    pub termination_condition: Option<String>,
}

impl Default for IteratorType {
    fn default() -> Self {
        IteratorType::None
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IoSpec {
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// One step of a [`Task`]. `step_id`s form a DAG within the task: no step may
/// reference a `step_id` that appears later in `order` (checked at
/// extraction time, see the Task extractor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStep {
    pub step_id: String,
    pub order: u32,
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(default)]
    pub action: Value,
    #[serde(default)]
    pub preconditions: Vec<String>,
    #[serde(default)]
    pub postconditions: Vec<String>,
    pub required: bool,
    pub can_skip: bool,
}

/// A multi-step procedure, identified by `envelope.entity_id` (the spec's
/// `task_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub name: String,
    pub description: String,
    pub category: String,
    pub complexity: String,
    pub steps: Vec<TaskStep>,
    pub io_spec: IoSpec,
    pub iterator_spec: IteratorSpec,
    #[serde(default)]
    pub screen_ids: Vec<String>,
    #[serde(default)]
    pub action_ids: Vec<String>,
}

impl_entity!(Task);

impl Task {
    pub fn task_id(&self) -> &str {
        self.envelope.entity_id.as_str()
    }

    /// Validates the DAG invariant: a step's `order` must be monotonic and no
    /// step may be its own or a later step's precondition by `step_id`.
    pub fn steps_form_dag(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        for step in &self.steps {
            for pre in &step.preconditions {
                if !seen.contains(pre.as_str()) && pre != &step.step_id {
                    // A precondition referencing a step not yet seen by
                    // order means it comes later (or doesn't exist): a
                    // backward reference violation.
                    if self.steps.iter().any(|s| &s.step_id == pre) {
                        return false;
                    }
                }
            }
            seen.insert(step.step_id.as_str());
        }
        true
    }
}
