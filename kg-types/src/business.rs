use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::impl_entity;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelatedIds {
    #[serde(default)]
    pub screens: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub workflows: Vec<String>,
    #[serde(default)]
    pub user_flows: Vec<String>,
}

/// A user-visible capability, identified by `envelope.entity_id` (the spec's
/// `business_function_id`). `screens_mentioned` (inside `metadata`) drives
/// the Post-Extraction Linker's fuzzy-matching pass against `Screen::name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessFunction {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub name: String,
    pub category: String,
    pub description: String,
    pub business_reasoning: String,
    pub business_impact: String,
    #[serde(default)]
    pub business_requirements: Vec<String>,
    #[serde(default)]
    pub operational_aspects: Vec<String>,
    #[serde(default)]
    pub workflow_steps: Vec<String>,
    #[serde(default)]
    pub screens_mentioned: Vec<String>,
    #[serde(default)]
    pub related: RelatedIds,
}

impl_entity!(BusinessFunction);

impl BusinessFunction {
    pub fn business_function_id(&self) -> &str {
        self.envelope.entity_id.as_str()
    }
}

/// A capability narrower than a [`BusinessFunction`]; sibling entity with the
/// same shape minus the DAG-scale fields (`workflow_steps`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessFeature {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub name: String,
    pub category: String,
    pub description: String,
    pub business_reasoning: String,
    pub business_impact: String,
    #[serde(default)]
    pub business_requirements: Vec<String>,
    #[serde(default)]
    pub screens_mentioned: Vec<String>,
    #[serde(default)]
    pub related: RelatedIds,
    #[serde(default)]
    pub parent_business_function_id: Option<String>,
}

impl_entity!(BusinessFeature);

impl BusinessFeature {
    pub fn business_feature_id(&self) -> &str {
        self.envelope.entity_id.as_str()
    }
}
