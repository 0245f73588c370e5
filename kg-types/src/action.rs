use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::Envelope;
use crate::impl_entity;

/// An atomic UI operation, identified by `envelope.entity_id` (the spec's
/// `action_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub name: String,
    /// Open set: `click`, `type`, `select_option`, `navigate`, `send_keys`,
    /// and anything else the extractor recognizes in source text.
    pub action_type: String,
    pub category: String,
    pub target_selector: String,
    #[serde(default)]
    pub parameters: Value,
    #[serde(default)]
    pub preconditions: Vec<String>,
    #[serde(default)]
    pub postconditions: Vec<String>,
    pub idempotent: bool,
    #[serde(default)]
    pub reversible_by: Option<String>,
    #[serde(default)]
    pub screen_ids: Vec<String>,
    /// Transitions whose `triggered_by.element_id` resolved to this action
    /// (spec §4.5 Transitions ↔ Entities linking pass).
    #[serde(default)]
    pub transition_ids: Vec<String>,
    /// Set when the action was derived from the URL Exploration phase's
    /// browser-driver form discovery rather than extracted from text.
    #[serde(default)]
    pub browser_use_action: Option<Value>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

impl_entity!(Action);

impl Action {
    pub fn action_id(&self) -> &str {
        self.envelope.entity_id.as_str()
    }
}
