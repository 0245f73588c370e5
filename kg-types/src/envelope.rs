//! Identity and provenance fields shared by every persisted entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields every entity in the pipeline carries, flattened into the entity's
/// own JSON representation rather than nested under an `envelope` key.
///
/// `entity_id` is the entity's own natural key (a screen name's slug, a
/// content hash, a generated uuid, ...); it is unique within `kind` but not
/// globally. `(knowledge_id, job_id)` is the compound key every query and
/// delete-by-knowledge operation filters on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub entity_id: String,
    pub knowledge_id: String,
    pub job_id: String,
    /// Derived per §7 of the pipeline design: a specific site hostname, a
    /// generated id for mixed asset batches ("mixed-assets"), or "unknown"
    /// when no website-scoped source contributed to this entity.
    pub website_id: String,
    #[serde(default)]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Envelope {
    pub fn new(
        entity_id: impl Into<String>,
        knowledge_id: impl Into<String>,
        job_id: impl Into<String>,
        website_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            entity_id: entity_id.into(),
            knowledge_id: knowledge_id.into(),
            job_id: job_id.into(),
            website_id: website_id.into(),
            metadata: Value::Null,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Implemented by every persisted entity type so the document store can
/// operate on the shared identity fields without knowing the rest of the
/// shape.
pub trait Entity {
    fn envelope(&self) -> &Envelope;
    fn envelope_mut(&mut self) -> &mut Envelope;

    fn entity_id(&self) -> &str {
        &self.envelope().entity_id
    }

    fn knowledge_id(&self) -> &str {
        &self.envelope().knowledge_id
    }

    fn job_id(&self) -> &str {
        &self.envelope().job_id
    }
}

/// Convenience macro: implements [`Entity`] for a struct with a
/// `#[serde(flatten)] pub envelope: Envelope` field.
#[macro_export]
macro_rules! impl_entity {
    ($ty:ty) => {
        impl $crate::envelope::Entity for $ty {
            fn envelope(&self) -> &$crate::envelope::Envelope {
                &self.envelope
            }
            fn envelope_mut(&mut self) -> &mut $crate::envelope::Envelope {
                &mut self.envelope
            }
        }
    };
}
