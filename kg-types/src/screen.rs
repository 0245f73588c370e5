use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::impl_entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenContentType {
    WebUi,
    Documentation,
}

/// The indicator set the verifier and the exploration crawler use to decide
/// whether a live page matches this screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSignature {
    pub required_indicators: Vec<String>,
    pub negative_indicators: Vec<String>,
}

/// A recognizable UI state, identified by `envelope.entity_id` (the spec's
/// `screen_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub name: String,
    /// Regex patterns matched against observed URLs.
    pub url_patterns: Vec<String>,
    pub state_signature: StateSignature,
    pub ui_elements: Vec<String>,
    #[serde(default)]
    pub action_ids: Vec<String>,
    #[serde(default)]
    pub task_ids: Vec<String>,
    #[serde(default)]
    pub outgoing_transitions: Vec<String>,
    #[serde(default)]
    pub incoming_transitions: Vec<String>,
    #[serde(default)]
    pub business_function_ids: Vec<String>,
    #[serde(default)]
    pub user_flow_ids: Vec<String>,
    #[serde(default)]
    pub workflow_ids: Vec<String>,
    pub content_type: ScreenContentType,
    pub is_actionable: bool,
}

impl_entity!(Screen);

impl Screen {
    pub fn screen_id(&self) -> &str {
        self.envelope.entity_id.as_str()
    }
}
