use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::impl_entity;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggeredBy {
    pub action_type: String,
    #[serde(default)]
    pub element_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionCost {
    pub estimated_ms: u64,
}

/// A directed edge between two screens, identified by `envelope.entity_id`
/// (the spec's `transition_id`). `reliability_score` lies in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub from_screen_id: String,
    pub to_screen_id: String,
    pub triggered_by: TriggeredBy,
    #[serde(default)]
    pub conditions: Vec<String>,
    pub cost: TransitionCost,
    pub reliability_score: f64,
    #[serde(default)]
    pub action_id: Option<String>,
}

impl_entity!(Transition);

impl Transition {
    pub fn transition_id(&self) -> &str {
        self.envelope.entity_id.as_str()
    }

    pub fn reliability_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.reliability_score)
    }
}
