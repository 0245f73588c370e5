//! Core identifiers for the pipeline's graph engine.
//!
//! These describe the *shape* of a workflow graph — which phase activities
//! exist and which channel a state update belongs to — independent of the
//! pipeline's own domain entities (screens, tasks, actions, ...), which live
//! in `pipeline-extract` and `pipeline-ingestion`.
//!
//! Session IDs and step numbers are plain `String`/`u64` throughout the
//! runtime layer (see [`crate::runtimes`]) — there is no typed wrapper for
//! them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a node (phase activity) within a workflow graph.
///
/// Two variants are virtual (`Start`, `End`, no incoming/outgoing edges
/// respectively); everything else is a `Custom` activity name such as
/// `"ingestion"`, `"extract_screens"`, or `"post_extraction_linker"`.
///
/// # Examples
///
/// ```rust
/// use pipeline_core::types::PhaseKind;
///
/// let custom = PhaseKind::Custom("ingestion".to_string());
/// let encoded = custom.encode();
/// assert_eq!(encoded, "Custom:ingestion");
/// assert_eq!(PhaseKind::decode(&encoded), custom);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    /// Entry point; has no incoming edges and seeds the initial frontier.
    Start,
    /// Terminal point; has no outgoing edges.
    End,
    /// A concrete phase activity, identified by name.
    Custom(String),
}

impl PhaseKind {
    /// Encode into a persisted string form: `"Start"`, `"End"`, `"Custom:<name>"`.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            PhaseKind::Start => "Start".to_string(),
            PhaseKind::End => "End".to_string(),
            PhaseKind::Custom(s) => format!("Custom:{s}"),
        }
    }

    /// Decode a persisted string form back into a `PhaseKind`.
    ///
    /// Unknown formats fall back to `Custom(s)` for forward compatibility.
    #[must_use]
    pub fn decode(s: &str) -> Self {
        if s == "Start" {
            PhaseKind::Start
        } else if s == "End" {
            PhaseKind::End
        } else if let Some(rest) = s.strip_prefix("Custom:") {
            PhaseKind::Custom(rest.to_string())
        } else {
            PhaseKind::Custom(s.to_string())
        }
    }

    #[must_use]
    pub fn is_start(&self) -> bool {
        matches!(self, Self::Start)
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::End => write!(f, "End"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

impl From<&str> for PhaseKind {
    fn from(s: &str) -> Self {
        match s {
            "Start" => PhaseKind::Start,
            "End" => PhaseKind::End,
            other => PhaseKind::Custom(other.to_string()),
        }
    }
}

/// Identifies a versioned state channel.
///
/// The chat-oriented `messages`/`extra`/`errors` split becomes the
/// pipeline's own channels: progress events, a generic scratch map used to
/// pass ids and counts between phases, and error events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelType {
    /// Channel for `ProgressEvent`s describing phase/activity advancement.
    Progress,
    /// Channel for error events surfaced by activities.
    Error,
    /// Generic key-value scratch space nodes use to pass data forward.
    Extra,
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Progress => write!(f, "progress"),
            Self::Error => write!(f, "error"),
            Self::Extra => write!(f, "extra"),
        }
    }
}
